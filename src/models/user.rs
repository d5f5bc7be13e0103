use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct UserResponse {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Trims the display name and email so validation sees what will be stored.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_validation() {
        let request = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(request.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..request
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn blank_name_is_rejected_once_trimmed() {
        let request = RegisterRequest {
            name: "   ".to_string(),
            email: " ada@example.com ".to_string(),
            password: "secret1".to_string(),
        }
        .normalized();
        assert_eq!(request.email, "ada@example.com");
        let errors = request.validate().expect_err("blank name");
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn padded_name_is_stored_trimmed() {
        let request = RegisterRequest {
            name: "  Ada  ".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        }
        .normalized();
        assert_eq!(request.name, "Ada");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn short_password_is_rejected() {
        let request = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "abc".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
