//! Client documents and payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trego_core::{ClientId, Email, Money};

use crate::error::FieldError;

/// A client document in the `clients` collection.
///
/// `total_deliveries` and `total_spent` are derived views over the
/// `deliveries` collection, maintained by the aggregate updater. They must
/// never be written by request handlers directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub is_active: bool,
    /// Derived: sum of `numberOfItems` over this client's deliveries.
    pub total_deliveries: i64,
    /// Derived: sum of goods price + fees over this client's deliveries.
    pub total_spent: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /api/clients`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// A validated `NewClient`.
#[derive(Debug, Clone)]
pub struct ValidatedClient {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: Option<String>,
}

impl NewClient {
    /// Validate the payload, collecting every field failure.
    ///
    /// # Errors
    ///
    /// Returns the full list of field errors so the dashboard can highlight
    /// all invalid inputs at once.
    pub fn validate(self) -> Result<ValidatedClient, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_owned()),
            _ => {
                errors.push(FieldError::new("name", "Client name is required"));
                None
            }
        };

        let email = match self.email.as_deref().map(Email::parse) {
            Some(Ok(email)) => Some(email),
            _ => {
                errors.push(FieldError::new("email", "Valid email is required"));
                None
            }
        };

        let phone = match self.phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => Some(phone.to_owned()),
            _ => {
                errors.push(FieldError::new("phone", "Phone number is required"));
                None
            }
        };

        match (name, email, phone) {
            (Some(name), Some(email), Some(phone)) if errors.is_empty() => Ok(ValidatedClient {
                name,
                email,
                phone,
                address: self.address,
            }),
            _ => Err(errors),
        }
    }
}

/// Payload for `PUT /api/clients/:id`. All fields optional; only provided
/// fields are merged. Derived counters are deliberately not updatable here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ok() {
        let payload = NewClient {
            name: Some("Acme Imports".to_owned()),
            email: Some("billing@acme.test".to_owned()),
            phone: Some("+1-555-0100".to_owned()),
            address: None,
        };

        let valid = payload.validate().expect("valid payload");
        assert_eq!(valid.name, "Acme Imports");
        assert_eq!(valid.email.as_str(), "billing@acme.test");
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let errors = NewClient::default().validate().expect_err("empty payload");
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["name", "email", "phone"]);
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let payload = NewClient {
            name: Some("Acme".to_owned()),
            email: Some("not-an-email".to_owned()),
            phone: Some("555".to_owned()),
            address: None,
        };

        let errors = payload.validate().expect_err("bad email");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().map(|e| e.field.as_str()), Some("email"));
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let update = UpdateClient {
            phone: Some("+1-555-0199".to_owned()),
            ..UpdateClient::default()
        };

        let value = serde_json::to_value(&update).expect("serialize");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("phone"));
    }
}
