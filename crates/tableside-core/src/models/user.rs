use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A user profile as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
}

impl User {
    /// Short display label for UI surfaces (falls back to the email).
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

/// Body for `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub password: String,
}

/// Body for `POST /api/auth/login/json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for `PUT /api/auth/me`. Absent fields are left untouched by the
/// backend, so they are omitted from the serialized body entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Bearer credential returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_response() {
        // Shape returned by the backend's /me endpoint (naive timestamp,
        // no timezone offset)
        let json = r#"{
            "id": 7,
            "email": "guest@example.com",
            "full_name": "Guest Diner",
            "phone": "555-0100",
            "is_active": true,
            "is_admin": false,
            "created_at": "2024-05-04T18:32:10.123456"
        }"#;

        let user: User = serde_json::from_str(json).expect("Failed to parse profile JSON");
        assert_eq!(user.id, 7);
        assert_eq!(user.email, "guest@example.com");
        assert_eq!(user.display_name(), "Guest Diner");
        assert_eq!(user.phone.as_deref(), Some("555-0100"));
        assert!(user.is_active);
        assert!(!user.is_admin);
    }

    #[test]
    fn test_parse_token_response() {
        let token: Token = serde_json::from_str(r#"{"access_token": "t1", "token_type": "bearer"}"#)
            .expect("Failed to parse token JSON");
        assert_eq!(token.access_token, "t1");
        assert_eq!(token.token_type, "bearer");

        // token_type is optional on the wire
        let minimal: Token = serde_json::from_str(r#"{"access_token": "t2"}"#)
            .expect("Failed to parse minimal token JSON");
        assert_eq!(minimal.token_type, "bearer");
    }

    #[test]
    fn test_profile_update_omits_absent_fields() {
        let update = ProfileUpdate {
            full_name: Some("New Name".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["full_name"], "New Name");
        assert!(body.get("phone").is_none());
        assert!(body.get("password").is_none());
    }
}
