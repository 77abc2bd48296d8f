use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Request body for token retrieval.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Profile of the calling user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Registration response: the profile plus the freshly issued token.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub token: String,
}

/// Full replace of the caller's profile.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct PatchUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_user_includes_token() {
        let body = RegisteredUser {
            id: Uuid::new_v4(),
            email: "user@example.com".into(),
            name: "User".into(),
            token: "abc123".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["email"], "user@example.com");
        assert_eq!(json["token"], "abc123");
    }

    #[test]
    fn patch_request_fields_are_optional() {
        let patch: PatchUserRequest = serde_json::from_str(r#"{"name": "New Name"}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some("New Name"));
        assert!(patch.email.is_none());
        assert!(patch.password.is_none());
    }
}
