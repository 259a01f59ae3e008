//! Sample data for demos and manual testing.
//!
//! Inserts a handful of clients, deliverers, and deliveries directly into
//! the record store, then runs the aggregate recompute so the derived
//! counters match from the start.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use trego_api::config::ApiConfig;
use trego_api::services::AggregateUpdater;
use trego_api::store::{Document, Store, collections};
use trego_core::{ClientId, DelivererId, Money};

use super::{CliError, connect};

/// Seed the record store with sample data.
///
/// # Errors
///
/// Returns `CliError` on configuration or store failure.
pub async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    let (store, _identity) = connect(&config)?;

    let clients = [
        ("Acme Imports", "billing@acme.test", "+1-555-0100"),
        ("Blue Harbor Foods", "orders@blueharbor.test", "+1-555-0101"),
        ("Cedar Workshop", "hello@cedar.test", "+1-555-0102"),
    ];
    let deliverers = [
        ("Mika Laine", "mika@trego.app", "+358-555-0101", "van"),
        ("Sam Ortega", "sam@trego.app", "+1-555-0202", "motorbike"),
    ];

    let mut seeded_clients = Vec::new();
    for (name, email, phone) in clients {
        let id = store
            .insert(collections::CLIENTS, client_fields(name, email, phone))
            .await?;
        info!("Seeded client {name} ({id})");
        seeded_clients.push((ClientId::new(id), name));
    }

    let mut seeded_deliverers = Vec::new();
    for (name, email, phone, vehicle) in deliverers {
        let id = store
            .insert(
                collections::DELIVERERS,
                deliverer_fields(name, email, phone, vehicle),
            )
            .await?;
        info!("Seeded deliverer {name} ({id})");
        seeded_deliverers.push((DelivererId::new(id), name));
    }

    let deliveries = [
        (0, 0, "123 Main St", 2, 100_00, 10_00),
        (0, 1, "456 Oak Ave", 1, 50_00, 5_00),
        (1, 0, "789 Pier Rd", 4, 230_50, 15_00),
        (2, 1, "12 Mill Lane", 1, 75_25, 8_00),
    ];
    for (client, deliverer, destination, items, goods_cents, fees_cents) in deliveries {
        seed_delivery(
            &store,
            &seeded_clients,
            &seeded_deliverers,
            client,
            deliverer,
            destination,
            items,
            goods_cents,
            fees_cents,
        )
        .await?;
    }

    let aggregates = AggregateUpdater::new(store.clone());
    for (client_id, _) in &seeded_clients {
        aggregates.recompute_client(client_id).await?;
    }
    for (deliverer_id, _) in &seeded_deliverers {
        aggregates.recompute_deliverer(deliverer_id).await?;
    }

    info!(
        "Seeding complete: {} clients, {} deliverers, {} deliveries",
        seeded_clients.len(),
        seeded_deliverers.len(),
        deliveries.len()
    );

    Ok(())
}

fn client_fields(name: &str, email: &str, phone: &str) -> Document {
    serde_json::json!({
        "name": name,
        "email": email,
        "phone": phone,
        "isActive": true,
        "totalDeliveries": 0,
        "totalSpent": Money::ZERO,
        "createdAt": Utc::now(),
        "updatedAt": Utc::now(),
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

fn deliverer_fields(name: &str, email: &str, phone: &str, vehicle: &str) -> Document {
    serde_json::json!({
        "name": name,
        "email": email,
        "phone": phone,
        "vehicleType": vehicle,
        "status": "available",
        "rating": Decimal::ZERO,
        "totalDeliveries": 0,
        "isActive": true,
        "createdAt": Utc::now(),
        "updatedAt": Utc::now(),
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
async fn seed_delivery(
    store: &Store,
    clients: &[(ClientId, &str)],
    deliverers: &[(DelivererId, &str)],
    client: usize,
    deliverer: usize,
    destination: &str,
    items: i64,
    goods_cents: i64,
    fees_cents: i64,
) -> Result<(), CliError> {
    let (Some((client_id, client_name)), Some((deliverer_id, deliverer_name))) =
        (clients.get(client), deliverers.get(deliverer))
    else {
        return Err(CliError::InvalidInput("sample index out of range".to_owned()));
    };

    let fields = serde_json::json!({
        "clientId": client_id,
        "clientName": client_name,
        "delivererId": deliverer_id,
        "delivererName": deliverer_name,
        "destination": destination,
        "totalGoodsPrice": Money::new(Decimal::new(goods_cents, 2)),
        "deliveryFees": Money::new(Decimal::new(fees_cents, 2)),
        "numberOfItems": items,
        "status": "pending",
        "paymentStatus": "pending",
        "createdBy": "seed",
        "createdAt": Utc::now(),
        "updatedAt": Utc::now(),
    })
    .as_object()
    .cloned()
    .unwrap_or_default();

    let id = store.insert(collections::DELIVERIES, fields).await?;
    info!("Seeded delivery to {destination} ({id})");
    Ok(())
}
