//! Deliverer documents and payloads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use trego_core::{DelivererId, DelivererStatus, Email};

use crate::error::FieldError;

/// A deliverer document in the `deliverers` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deliverer {
    pub id: DelivererId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    pub status: DelivererStatus,
    pub rating: Decimal,
    /// Derived: count of deliveries referencing this deliverer.
    pub total_deliveries: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /api/deliverers`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeliverer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub vehicle_type: Option<String>,
}

/// A validated `NewDeliverer`.
#[derive(Debug, Clone)]
pub struct ValidatedDeliverer {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub vehicle_type: Option<String>,
}

impl NewDeliverer {
    /// Validate the payload, collecting every field failure.
    ///
    /// # Errors
    ///
    /// Returns the full list of field errors.
    pub fn validate(self) -> Result<ValidatedDeliverer, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_owned()),
            _ => {
                errors.push(FieldError::new("name", "Deliverer name is required"));
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
            (Some(name), Some(email), Some(phone)) if errors.is_empty() => {
                Ok(ValidatedDeliverer {
                    name,
                    email,
                    phone,
                    vehicle_type: self.vehicle_type,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Payload for `PUT /api/deliverers/:id`. Only provided fields are merged;
/// the derived delivery counter is not updatable here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeliverer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ok() {
        let payload = NewDeliverer {
            name: Some("Mika Laine".to_owned()),
            email: Some("mika@trego.app".to_owned()),
            phone: Some("+358-555-0101".to_owned()),
            vehicle_type: Some("van".to_owned()),
        };

        let valid = payload.validate().expect("valid payload");
        assert_eq!(valid.vehicle_type.as_deref(), Some("van"));
    }

    #[test]
    fn test_validate_requires_contact_fields() {
        let errors = NewDeliverer::default()
            .validate()
            .expect_err("empty payload");
        assert_eq!(errors.len(), 3);
    }
}
