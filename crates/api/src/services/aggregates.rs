//! Denormalized counter maintenance.
//!
//! Clients carry `totalDeliveries` (sum of item counts) and `totalSpent`
//! (sum of goods price plus fees); deliverers carry `totalDeliveries`
//! (count of assigned deliveries). Those counters are derived state, and
//! this module is the only writer of them.
//!
//! The recompute is a full rescan of the party's deliveries rather than an
//! increment. Rescans are idempotent and self-healing: a missed refresh is
//! corrected by the next one, and there is no drift to accumulate. The
//! store offers no cross-document transactions, so a reader can observe a
//! delivery that the counters don't reflect yet; the next refresh converges.
//!
//! Refreshes run after delivery create and delete only. Editing a
//! delivery's amounts does not trigger one.

use serde_json::{Map, Value};
use tracing::warn;

use trego_core::{ClientId, DelivererId, Money};

use crate::store::{Document, Query, Store, StoreError, collections};

/// Recomputes and writes the derived counters on clients and deliverers.
#[derive(Clone)]
pub struct AggregateUpdater {
    store: Store,
}

impl AggregateUpdater {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Refresh both parties' counters after a delivery was created or
    /// deleted.
    ///
    /// Best-effort: failures are logged and swallowed so the delivery
    /// write that triggered the refresh still succeeds. A failed refresh
    /// leaves stale counters until the next delivery mutation.
    pub async fn refresh_for(&self, client_id: &ClientId, deliverer_id: &DelivererId) {
        if let Err(error) = self.recompute_client(client_id).await {
            warn!(client_id = %client_id, %error, "failed to refresh client aggregates");
        }
        if let Err(error) = self.recompute_deliverer(deliverer_id).await {
            warn!(deliverer_id = %deliverer_id, %error, "failed to refresh deliverer aggregates");
        }
    }

    /// Rescan the client's deliveries and write `totalDeliveries` and
    /// `totalSpent`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the client document is gone, or
    /// any store failure from the rescan.
    pub async fn recompute_client(&self, client_id: &ClientId) -> Result<(), StoreError> {
        let deliveries = self
            .store
            .query(&Query::collection(collections::DELIVERIES).filter("clientId", client_id.as_str()))
            .await?;

        let mut total_deliveries = 0_i64;
        let mut total_spent = Money::ZERO;
        for delivery in &deliveries {
            total_deliveries += int_field(delivery, "numberOfItems");
            total_spent = total_spent
                + money_field(delivery, "totalGoodsPrice")
                + money_field(delivery, "deliveryFees");
        }

        let mut fields = Map::new();
        fields.insert("totalDeliveries".to_owned(), Value::from(total_deliveries));
        fields.insert(
            "totalSpent".to_owned(),
            serde_json::to_value(total_spent).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        );
        fields.insert(
            "updatedAt".to_owned(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );

        self.store
            .update(collections::CLIENTS, client_id.as_str(), fields)
            .await
    }

    /// Rescan the deliverer's deliveries and write `totalDeliveries`
    /// (a plain count, unlike the client's item sum).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the deliverer document is gone,
    /// or any store failure from the rescan.
    pub async fn recompute_deliverer(&self, deliverer_id: &DelivererId) -> Result<(), StoreError> {
        let count = self
            .store
            .count(
                &Query::collection(collections::DELIVERIES)
                    .filter("delivererId", deliverer_id.as_str()),
            )
            .await?;

        let mut fields = Map::new();
        fields.insert(
            "totalDeliveries".to_owned(),
            Value::from(i64::try_from(count).unwrap_or(i64::MAX)),
        );
        fields.insert(
            "updatedAt".to_owned(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );

        self.store
            .update(collections::DELIVERERS, deliverer_id.as_str(), fields)
            .await
    }
}

/// Read an integer field, treating anything missing or malformed as zero.
/// Historical documents can lack fields; a rescan must not fail on them.
fn int_field(fields: &Document, name: &str) -> i64 {
    fields.get(name).and_then(Value::as_i64).unwrap_or(0)
}

/// Read a monetary field, treating anything missing or malformed as zero.
fn money_field(fields: &Document, name: &str) -> Money {
    fields
        .get(name)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or(Money::ZERO)
}
