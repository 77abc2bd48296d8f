use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ingredients::dto::IngredientResponse;
use crate::ingredients::repo::Ingredient;
use crate::recipes::repo::{Recipe, RecipeInput};
use crate::tags::dto::TagResponse;
use crate::tags::repo::Tag;

/// Abbreviated row returned by the listing endpoint.
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientResponse>,
}

/// Full representation returned by every non-list action.
#[derive(Debug, Serialize)]
pub struct RecipeDetails {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: String,
    pub image: Option<String>,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientResponse>,
}

impl RecipeSummary {
    pub fn project(recipe: &Recipe, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.clone(),
            tags: tags.into_iter().map(TagResponse::from).collect(),
            ingredients: ingredients
                .into_iter()
                .map(IngredientResponse::from)
                .collect(),
        }
    }
}

impl RecipeDetails {
    pub fn project(
        recipe: &Recipe,
        tags: Vec<Tag>,
        ingredients: Vec<Ingredient>,
        image: Option<String>,
    ) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            description: recipe.description.clone(),
            link: recipe.link.clone(),
            image,
            tags: tags.into_iter().map(TagResponse::from).collect(),
            ingredients: ingredients
                .into_iter()
                .map(IngredientResponse::from)
                .collect(),
        }
    }
}

/// Body for `POST /recipes` and `PUT /recipes/{id}`. There is no owner
/// field; the owner is always the authenticated caller. Omitted
/// `tags`/`ingredients` leave the association sets untouched.
#[derive(Debug, Deserialize)]
pub struct RecipeWriteRequest {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

impl From<RecipeWriteRequest> for RecipeInput {
    fn from(req: RecipeWriteRequest) -> Self {
        Self {
            title: req.title,
            time_minutes: req.time_minutes,
            price: req.price,
            description: req.description,
            link: req.link,
            tags: req.tags,
            ingredients: req.ingredients,
        }
    }
}

/// Body for `PATCH /recipes/{id}`; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct PatchRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn sample_recipe() -> Recipe {
        Recipe {
            id: 7,
            user_id: Uuid::new_v4(),
            title: "Chili".into(),
            time_minutes: 30,
            price: "5.50".parse().unwrap(),
            description: "Smoky and hot".into(),
            link: "https://example.com/chili".into(),
            image_key: Some("recipes/u/7-img.png".into()),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn summary_projection_omits_description_and_image() {
        let summary = RecipeSummary::project(&sample_recipe(), vec![], vec![]);
        let json = serde_json::to_value(&summary).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert!(keys.contains(&"title"));
        assert!(keys.contains(&"link"));
        assert!(!keys.contains(&"description"));
        assert!(!keys.contains(&"image"));
    }

    #[test]
    fn detail_projection_carries_description_and_image_url() {
        let details = RecipeDetails::project(
            &sample_recipe(),
            vec![],
            vec![],
            Some("https://media.example.com/recipes/u/7-img.png".into()),
        );
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["description"], "Smoky and hot");
        assert_eq!(
            json["image"],
            "https://media.example.com/recipes/u/7-img.png"
        );
    }

    #[test]
    fn write_request_accepts_decimal_price_as_string() {
        let req: RecipeWriteRequest =
            serde_json::from_str(r#"{"title": "Chili", "time_minutes": 30, "price": "5.50"}"#)
                .unwrap();
        assert_eq!(req.price, "5.50".parse::<Decimal>().unwrap());
        assert_eq!(req.description, "");
        assert!(req.tags.is_none());
    }

    #[test]
    fn write_request_ignores_unknown_owner_field() {
        // a client-supplied owner must never reach the database
        let req: RecipeWriteRequest = serde_json::from_str(
            r#"{"title": "Chili", "time_minutes": 30, "price": "5.50", "user": "someone-else"}"#,
        )
        .unwrap();
        assert_eq!(req.title, "Chili");
    }
}
