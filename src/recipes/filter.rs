use crate::error::ApiError;

/// Parsed `tags`/`ingredients` query parameters for the recipe listing.
/// `None` means the parameter was absent (or blank) and does not narrow
/// the result.
#[derive(Debug, Default, PartialEq)]
pub struct RecipeFilters {
    pub tag_ids: Option<Vec<i64>>,
    pub ingredient_ids: Option<Vec<i64>>,
}

impl RecipeFilters {
    pub fn from_query(tags: Option<&str>, ingredients: Option<&str>) -> Result<Self, ApiError> {
        Ok(Self {
            tag_ids: parse_param(tags)?,
            ingredient_ids: parse_param(ingredients)?,
        })
    }
}

fn parse_param(raw: Option<&str>) -> Result<Option<Vec<i64>>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => parse_id_csv(s).map(Some),
    }
}

/// Split a comma-separated list of identifiers, e.g. `"1,2,3"`.
fn parse_id_csv(raw: &str) -> Result<Vec<i64>, ApiError> {
    raw.split(',')
        .map(|part| {
            part.trim().parse::<i64>().map_err(|_| {
                ApiError::Validation(format!("invalid id `{}` in filter", part.trim()))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn parses_comma_separated_ids() {
        assert_eq!(parse_id_csv("1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_csv("42").unwrap(), vec![42]);
    }

    #[test]
    fn tolerates_whitespace_around_ids() {
        assert_eq!(parse_id_csv(" 1 , 2 ").unwrap(), vec![1, 2]);
    }

    #[test]
    fn rejects_non_numeric_segments_as_client_error() {
        let err = parse_id_csv("abc").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = parse_id_csv("1,abc,3").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(parse_id_csv("1,,2").is_err());
        assert!(parse_id_csv("1,").is_err());
    }

    #[test]
    fn absent_or_blank_params_do_not_filter() {
        let filters = RecipeFilters::from_query(None, None).unwrap();
        assert_eq!(filters, RecipeFilters::default());

        let filters = RecipeFilters::from_query(Some(""), Some("")).unwrap();
        assert_eq!(filters, RecipeFilters::default());
    }

    #[test]
    fn both_params_parse_independently() {
        let filters = RecipeFilters::from_query(Some("1,2"), Some("5")).unwrap();
        assert_eq!(filters.tag_ids, Some(vec![1, 2]));
        assert_eq!(filters.ingredient_ids, Some(vec![5]));

        let err = RecipeFilters::from_query(Some("1"), Some("x")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
