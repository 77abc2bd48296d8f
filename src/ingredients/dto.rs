use serde::{Deserialize, Serialize};

use crate::ingredients::repo::Ingredient;

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RenameIngredientRequest {
    pub name: String,
}

/// `assigned_only=1` narrows the list to ingredients linked to at least
/// one of the caller's recipes.
#[derive(Debug, Deserialize)]
pub struct IngredientListParams {
    #[serde(default)]
    pub assigned_only: Option<i32>,
}
