use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use rand::{distributions::Alphanumeric, Rng};
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo;

pub const TOKEN_KEY_LEN: usize = 40;

/// Mint an opaque key for the `Authorization: Token <key>` scheme.
pub fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_KEY_LEN)
        .map(char::from)
        .collect()
}

/// Resolves the calling user from the presented token key.
///
/// The key is looked up on every request; there is no caching. An unknown
/// key, a missing header, or a non-`Token` scheme all reject with 401.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".into()))?;

        let key = header
            .strip_prefix("Token ")
            .ok_or_else(|| ApiError::Unauthorized("invalid Authorization header".into()))?;

        let user_id = repo::find_user_id_by_key(&state.db, key)
            .await?
            .ok_or_else(|| {
                warn!("unknown token key");
                ApiError::Unauthorized("invalid token".into())
            })?;

        Ok(AuthUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_has_expected_shape() {
        let key = generate_key();
        assert_eq!(key.len(), TOKEN_KEY_LEN);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(generate_key(), generate_key());
    }
}
