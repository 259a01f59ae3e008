//! Static enumerations backing the dashboard's dropdowns.

use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};

use trego_core::{DelivererStatus, DeliveryStatus, PaymentStatus, Role};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(fetch))
}

#[derive(Debug, Serialize)]
struct Category {
    id: &'static str,
    name: &'static str,
    values: Vec<String>,
}

fn catalog() -> Vec<Category> {
    vec![
        Category {
            id: "delivery_status",
            name: "Delivery Status",
            values: DeliveryStatus::ALL.iter().map(ToString::to_string).collect(),
        },
        Category {
            id: "deliverer_status",
            name: "Deliverer Status",
            values: DelivererStatus::ALL.iter().map(ToString::to_string).collect(),
        },
        Category {
            id: "payment_status",
            name: "Payment Status",
            values: PaymentStatus::ALL.iter().map(ToString::to_string).collect(),
        },
        Category {
            id: "user_roles",
            name: "User Roles",
            values: Role::ALL.iter().map(ToString::to_string).collect(),
        },
    ]
}

async fn list(_auth: RequireAuth) -> Json<Value> {
    let categories = catalog();
    Json(json!({
        "total": categories.len(),
        "categories": categories,
    }))
}

async fn fetch(_auth: RequireAuth, Path(id): Path<String>) -> Result<Json<Category>, AppError> {
    catalog()
        .into_iter()
        .find(|category| category.id == id)
        .map(Json)
        .ok_or(AppError::NotFound("Category"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_all_enumerations() {
        let categories = catalog();
        assert_eq!(categories.len(), 4);

        let delivery = categories
            .iter()
            .find(|c| c.id == "delivery_status")
            .expect("delivery_status");
        assert!(delivery.values.contains(&"in-transit".to_owned()));
    }
}
