use serde::{Deserialize, Serialize};

use crate::tags::repo::Tag;

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RenameTagRequest {
    pub name: String,
}

/// `assigned_only=1` narrows the list to tags linked to at least one of
/// the caller's recipes.
#[derive(Debug, Deserialize)]
pub struct TagListParams {
    #[serde(default)]
    pub assigned_only: Option<i32>,
}
