//! Delivery documents and payloads.
//!
//! Deliveries are the authoritative entity; the counters on clients and
//! deliverers are derived from them. `client_name` and `deliverer_name`
//! are denormalized copies taken at creation time so the dashboard's list
//! views need no join; they go stale if the party is later renamed (no
//! cascade exists, matching the product's accepted behavior).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trego_core::{ClientId, DelivererId, DeliveryId, DeliveryStatus, Money, PaymentStatus, UserId};

use crate::error::FieldError;

/// A delivery document in the `deliveries` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: DeliveryId,
    pub client_id: ClientId,
    /// Denormalized copy of the client's name at creation time.
    pub client_name: String,
    pub deliverer_id: DelivererId,
    /// Denormalized copy of the deliverer's name at creation time.
    pub deliverer_name: String,
    pub destination: String,
    pub total_goods_price: Money,
    pub delivery_fees: Money,
    pub number_of_items: i64,
    pub status: DeliveryStatus,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the status transitions to `delivered`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
}

/// Payload for `POST /api/deliveries`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDelivery {
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub deliverer_id: Option<String>,
    pub deliverer_name: Option<String>,
    pub destination: Option<String>,
    pub total_goods_price: Option<Money>,
    pub delivery_fees: Option<Money>,
    pub number_of_items: Option<i64>,
    pub notes: Option<String>,
}

/// A validated `NewDelivery`.
#[derive(Debug, Clone)]
pub struct ValidatedDelivery {
    pub client_id: ClientId,
    pub client_name: String,
    pub deliverer_id: DelivererId,
    pub deliverer_name: String,
    pub destination: String,
    pub total_goods_price: Money,
    pub delivery_fees: Money,
    pub number_of_items: i64,
    pub notes: Option<String>,
}

impl NewDelivery {
    /// Validate the payload, collecting every field failure.
    ///
    /// # Errors
    ///
    /// Returns the full list of field errors; nothing touches the store
    /// until validation passes.
    #[allow(clippy::too_many_lines)]
    pub fn validate(self) -> Result<ValidatedDelivery, Vec<FieldError>> {
        let mut errors = Vec::new();

        let client_id = match self.client_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Some(ClientId::new(id)),
            _ => {
                errors.push(FieldError::new("clientId", "Client ID is required"));
                None
            }
        };

        let client_name = match self.client_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_owned()),
            _ => {
                errors.push(FieldError::new("clientName", "Client name is required"));
                None
            }
        };

        let deliverer_id = match self.deliverer_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Some(DelivererId::new(id)),
            _ => {
                errors.push(FieldError::new("delivererId", "Deliverer ID is required"));
                None
            }
        };

        let deliverer_name = match self.deliverer_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_owned()),
            _ => {
                errors.push(FieldError::new(
                    "delivererName",
                    "Deliverer name is required",
                ));
                None
            }
        };

        let destination = match self.destination.as_deref().map(str::trim) {
            Some(destination) if !destination.is_empty() => Some(destination.to_owned()),
            _ => {
                errors.push(FieldError::new("destination", "Destination is required"));
                None
            }
        };

        let total_goods_price = match self.total_goods_price {
            Some(price) => Some(price),
            None => {
                errors.push(FieldError::new(
                    "totalGoodsPrice",
                    "Total goods price must be a number",
                ));
                None
            }
        };

        let delivery_fees = match self.delivery_fees {
            Some(fees) => Some(fees),
            None => {
                errors.push(FieldError::new(
                    "deliveryFees",
                    "Delivery fees must be a number",
                ));
                None
            }
        };

        let number_of_items = match self.number_of_items {
            Some(n) if n >= 1 => Some(n),
            _ => {
                errors.push(FieldError::new(
                    "numberOfItems",
                    "Number of items must be a positive integer",
                ));
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        match (
            client_id,
            client_name,
            deliverer_id,
            deliverer_name,
            destination,
            total_goods_price,
            delivery_fees,
            number_of_items,
        ) {
            (
                Some(client_id),
                Some(client_name),
                Some(deliverer_id),
                Some(deliverer_name),
                Some(destination),
                Some(total_goods_price),
                Some(delivery_fees),
                Some(number_of_items),
            ) => Ok(ValidatedDelivery {
                client_id,
                client_name,
                deliverer_id,
                deliverer_name,
                destination,
                total_goods_price,
                delivery_fees,
                number_of_items,
                notes: self.notes,
            }),
            _ => Err(vec![FieldError::new("body", "Invalid request body")]),
        }
    }
}

/// Payload for `PUT /api/deliveries/:id`. Only provided fields are merged.
///
/// Changing `totalGoodsPrice` or `deliveryFees` here does NOT refresh the
/// client's `totalSpent`; aggregates only refresh on delivery create and
/// delete. Known product behavior - do not "fix" without a decision.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDelivery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliverer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_goods_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fees: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_items: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
