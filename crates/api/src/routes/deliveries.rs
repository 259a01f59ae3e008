//! Delivery routes.
//!
//! Create and delete are the only two operations that refresh the derived
//! counters on clients and deliverers. Updates, including status changes,
//! deliberately do not.

use axum::extract::{Path, Query as QueryParams, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use trego_core::{DeliveryId, DeliveryStatus, PaymentStatus, Role};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{Delivery, NewDelivery, UpdateDelivery};
use crate::state::AppState;
use crate::store::{Direction, Document, Query, collections, from_document, to_document};

use super::{Pagination, decode_all, missing, page_window};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/status", put(set_status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<String>,
    client_id: Option<String>,
    deliverer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    _auth: RequireAuth,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Value>, AppError> {
    let window = page_window(params.page, params.limit)?;

    let mut query =
        Query::collection(collections::DELIVERIES).order_by("createdAt", Direction::Desc);
    if let Some(status) = params.status.as_deref().filter(|s| *s != "all" && !s.is_empty()) {
        query = query.filter("status", status);
    }
    if let Some(client_id) = params.client_id.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter("clientId", client_id);
    }
    if let Some(deliverer_id) = params.deliverer_id.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter("delivererId", deliverer_id);
    }

    let total = state.store().count(&query).await?;
    let docs = state
        .store()
        .query(&query.offset(window.offset()).limit(window.limit()))
        .await?;
    let deliveries: Vec<Delivery> = decode_all(docs)?;

    Ok(Json(json!({
        "deliveries": deliveries,
        "pagination": Pagination::new(window, total),
    })))
}

async fn fetch(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Delivery>, AppError> {
    let fields = state
        .store()
        .get(collections::DELIVERIES, &id)
        .await?
        .ok_or(AppError::NotFound("Delivery"))?;
    Ok(Json(from_document(fields)?))
}

async fn create(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(payload): Json<NewDelivery>,
) -> Result<(StatusCode, Json<Delivery>), AppError> {
    auth.require_role(&[Role::Admin, Role::Deliverer])?;
    let valid = payload.validate().map_err(AppError::Validation)?;

    let now = Utc::now();
    let mut delivery = Delivery {
        id: DeliveryId::new(""),
        client_id: valid.client_id,
        client_name: valid.client_name,
        deliverer_id: valid.deliverer_id,
        deliverer_name: valid.deliverer_name,
        destination: valid.destination,
        total_goods_price: valid.total_goods_price,
        delivery_fees: valid.delivery_fees,
        number_of_items: valid.number_of_items,
        status: DeliveryStatus::Pending,
        payment_status: PaymentStatus::Pending,
        notes: valid.notes,
        created_by: auth.0.uid.clone(),
        created_at: now,
        updated_at: now,
        completed_date: None,
    };

    let id = state
        .store()
        .insert(collections::DELIVERIES, to_document(&delivery)?)
        .await?;
    delivery.id = DeliveryId::new(id);

    state
        .aggregates()
        .refresh_for(&delivery.client_id, &delivery.deliverer_id)
        .await;

    Ok((StatusCode::CREATED, Json(delivery)))
}

async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    Json(payload): Json<UpdateDelivery>,
) -> Result<Json<Delivery>, AppError> {
    auth.require_role(&[Role::Admin, Role::Deliverer])?;

    let mut fields = to_document(&payload)?;
    fields.insert(
        "updatedAt".to_owned(),
        Value::String(Utc::now().to_rfc3339()),
    );

    state
        .store()
        .update(collections::DELIVERIES, &id, fields)
        .await
        .map_err(missing("Delivery"))?;

    let updated = state
        .store()
        .get(collections::DELIVERIES, &id)
        .await?
        .ok_or(AppError::NotFound("Delivery"))?;
    Ok(Json(from_document(updated)?))
}

async fn set_status(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Delivery>, AppError> {
    auth.require_role(&[Role::Admin, Role::Deliverer])?;

    let status: DeliveryStatus = body
        .status
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::BadRequest("Invalid status".to_owned()))?;

    let now = Utc::now();
    let mut fields = Document::new();
    fields.insert("status".to_owned(), Value::String(status.to_string()));
    fields.insert("updatedAt".to_owned(), Value::String(now.to_rfc3339()));
    if status == DeliveryStatus::Delivered {
        fields.insert("completedDate".to_owned(), Value::String(now.to_rfc3339()));
    }

    state
        .store()
        .update(collections::DELIVERIES, &id, fields)
        .await
        .map_err(missing("Delivery"))?;

    let updated = state
        .store()
        .get(collections::DELIVERIES, &id)
        .await?
        .ok_or(AppError::NotFound("Delivery"))?;
    Ok(Json(from_document(updated)?))
}

async fn remove(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    auth.require_role(&[Role::Admin])?;

    let fields = state
        .store()
        .get(collections::DELIVERIES, &id)
        .await?
        .ok_or(AppError::NotFound("Delivery"))?;
    let delivery: Delivery = from_document(fields)?;

    state
        .store()
        .delete(collections::DELIVERIES, &id)
        .await
        .map_err(missing("Delivery"))?;

    state
        .aggregates()
        .refresh_for(&delivery.client_id, &delivery.deliverer_id)
        .await;

    Ok(Json(json!({ "message": "Delivery deleted successfully" })))
}
