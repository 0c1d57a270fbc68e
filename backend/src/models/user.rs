//! Models that represent users and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::types::UserId;

/// Database representation of a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Name shown to other users.
    pub display_name: String,
    /// Login identifier, unique across the system.
    pub email: String,
    /// Optional avatar URL.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating an account with email and password.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50))]
    pub display_name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Credentials submitted by a user attempting to authenticate.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Emails are matched case-insensitively.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

impl LoginRequest {
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_requires_six_character_password() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "displayName": "Ada",
            "email": "a@b.com",
            "password": "short"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn register_request_accepts_valid_payload() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "displayName": "Ada",
            "email": " A@B.com ",
            "password": "secret1"
        }))
        .unwrap();
        assert!(request.validate().is_err(), "surrounding spaces are not a valid email");

        let request = RegisterRequest {
            email: "A@B.com".into(),
            ..request
        };
        assert!(request.validate().is_ok());
        assert_eq!(request.normalized_email(), "a@b.com");
    }

    #[test]
    fn user_serializes_with_camel_case_and_string_id() {
        let now = Utc::now();
        let user = User {
            id: UserId::from_i64(77),
            display_name: "Ada".into(),
            email: "a@b.com".into(),
            image: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], "77");
        assert_eq!(json["displayName"], "Ada");
    }
}
