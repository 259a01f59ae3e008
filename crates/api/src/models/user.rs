//! User profile documents and auth payloads.
//!
//! The `users` collection is keyed by the identity provider's uid, so the
//! document id doubles as the auth subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trego_core::{Email, Role, UserId};

use crate::error::FieldError;

const MIN_PASSWORD_LEN: usize = 6;

/// A user profile document in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity provider uid; also the document id.
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Payload for `POST /api/auth/register`.
///
/// `role` is carried as a raw string so an unknown value surfaces as a
/// field error rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
}

/// A validated `NewUser`. Holds the plaintext password only long enough
/// to hand it to the identity provider.
pub struct ValidatedUser {
    pub email: Email,
    pub password: String,
    pub display_name: String,
    pub role: Role,
    pub phone: Option<String>,
}

impl std::fmt::Debug for ValidatedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedUser")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .field("phone", &self.phone)
            .finish()
    }
}

impl NewUser {
    /// Validate the payload, collecting every field failure.
    ///
    /// # Errors
    ///
    /// Returns the full list of field errors.
    pub fn validate(self) -> Result<ValidatedUser, Vec<FieldError>> {
        let mut errors = Vec::new();

        let email = match self.email.as_deref().map(Email::parse) {
            Some(Ok(email)) => Some(email),
            _ => {
                errors.push(FieldError::new("email", "Valid email is required"));
                None
            }
        };

        let password = match self.password {
            Some(password) if password.len() >= MIN_PASSWORD_LEN => Some(password),
            _ => {
                errors.push(FieldError::new(
                    "password",
                    "Password must be at least 6 characters",
                ));
                None
            }
        };

        let display_name = match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_owned()),
            _ => {
                errors.push(FieldError::new("displayName", "Display name is required"));
                None
            }
        };

        // Roles are never defaulted; every account states its access level
        // up front.
        let role = match self.role.as_deref().map(str::parse::<Role>) {
            Some(Ok(role)) => Some(role),
            _ => {
                errors.push(FieldError::new("role", "Valid role is required"));
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        match (email, password, display_name, role) {
            (Some(email), Some(password), Some(display_name), Some(role)) => Ok(ValidatedUser {
                email,
                password,
                display_name,
                role,
                phone: self.phone,
            }),
            _ => Err(vec![FieldError::new("body", "Invalid request body")]),
        }
    }
}

/// Payload for `PUT /api/auth/me`. Only `displayName` and `phone`
/// may be changed; role and activation are admin concerns.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ok() {
        let valid = NewUser {
            email: Some("mika@example.com".to_owned()),
            password: Some("hunter22".to_owned()),
            display_name: Some("Mika Laine".to_owned()),
            role: Some("deliverer".to_owned()),
            phone: None,
        }
        .validate()
        .expect("valid payload");

        assert_eq!(valid.role, Role::Deliverer);
        assert_eq!(valid.email.as_str(), "mika@example.com");
    }

    #[test]
    fn test_validate_rejects_short_password() {
        let errors = NewUser {
            email: Some("mika@example.com".to_owned()),
            password: Some("short".to_owned()),
            display_name: Some("Mika".to_owned()),
            role: Some("deliverer".to_owned()),
            phone: None,
        }
        .validate()
        .expect_err("short password");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password");
    }

    #[test]
    fn test_validate_requires_role() {
        let base = || NewUser {
            email: Some("mika@example.com".to_owned()),
            password: Some("hunter22".to_owned()),
            display_name: Some("Mika".to_owned()),
            role: None,
            phone: None,
        };

        let errors = base().validate().expect_err("missing role");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "role");
        assert_eq!(errors[0].message, "Valid role is required");

        let errors = NewUser {
            role: Some("superuser".to_owned()),
            ..base()
        }
        .validate()
        .expect_err("unknown role");
        assert_eq!(errors[0].field, "role");
    }

    #[test]
    fn test_validate_empty_collects_all_required() {
        let errors = NewUser::default().validate().expect_err("empty payload");
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["email", "password", "displayName", "role"]);
    }

    #[test]
    fn test_validated_user_debug_redacts_password() {
        let valid = NewUser {
            email: Some("mika@example.com".to_owned()),
            password: Some("hunter22".to_owned()),
            display_name: Some("Mika".to_owned()),
            role: Some("deliverer".to_owned()),
            phone: None,
        }
        .validate()
        .expect("valid payload");

        let debug = format!("{valid:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter22"));
    }
}
