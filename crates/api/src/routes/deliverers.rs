//! Deliverer management routes.

use axum::extract::{Path, Query as QueryParams, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use trego_core::{DelivererId, DelivererStatus, Role};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{Deliverer, Delivery, NewDeliverer, UpdateDeliverer};
use crate::state::AppState;
use crate::store::{Direction, Document, Query, collections, from_document, to_document};

use super::{Pagination, decode_all, missing, page_window};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/status", put(set_status))
        .route("/{id}/deliveries", get(deliveries_for))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<u32>,
    limit: Option<u32>,
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
        Query::collection(collections::DELIVERERS).order_by("createdAt", Direction::Desc);
    // "all" means unfiltered, matching the dashboard's status dropdown.
    if let Some(status) = params.status.as_deref().filter(|s| *s != "all" && !s.is_empty()) {
        query = query.filter("status", status);
    }
    if let Some(search) = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        query = query.prefix("name", search);
    }

    let total = state.store().count(&query).await?;
    let docs = state
        .store()
        .query(&query.offset(window.offset()).limit(window.limit()))
        .await?;
    let deliverers: Vec<Deliverer> = decode_all(docs)?;

    Ok(Json(json!({
        "deliverers": deliverers,
        "pagination": Pagination::new(window, total),
    })))
}

async fn fetch(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Deliverer>, AppError> {
    let fields = state
        .store()
        .get(collections::DELIVERERS, &id)
        .await?
        .ok_or(AppError::NotFound("Deliverer"))?;
    Ok(Json(from_document(fields)?))
}

async fn create(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(payload): Json<NewDeliverer>,
) -> Result<(StatusCode, Json<Deliverer>), AppError> {
    auth.require_role(&[Role::Admin])?;
    let valid = payload.validate().map_err(AppError::Validation)?;

    let now = Utc::now();
    let mut deliverer = Deliverer {
        id: DelivererId::new(""),
        name: valid.name,
        email: valid.email,
        phone: valid.phone,
        vehicle_type: valid.vehicle_type,
        status: DelivererStatus::Available,
        rating: Decimal::ZERO,
        total_deliveries: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let id = state
        .store()
        .insert(collections::DELIVERERS, to_document(&deliverer)?)
        .await?;
    deliverer.id = DelivererId::new(id);

    Ok((StatusCode::CREATED, Json(deliverer)))
}

async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    Json(payload): Json<UpdateDeliverer>,
) -> Result<Json<Deliverer>, AppError> {
    auth.require_role(&[Role::Admin])?;

    let mut fields = to_document(&payload)?;
    fields.insert(
        "updatedAt".to_owned(),
        Value::String(Utc::now().to_rfc3339()),
    );

    state
        .store()
        .update(collections::DELIVERERS, &id, fields)
        .await
        .map_err(missing("Deliverer"))?;

    let updated = state
        .store()
        .get(collections::DELIVERERS, &id)
        .await?
        .ok_or(AppError::NotFound("Deliverer"))?;
    Ok(Json(from_document(updated)?))
}

async fn remove(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    auth.require_role(&[Role::Admin])?;

    if state
        .store()
        .get(collections::DELIVERERS, &id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Deliverer"));
    }

    let references = state
        .store()
        .count(&Query::collection(collections::DELIVERIES).filter("delivererId", id.as_str()))
        .await?;
    if references > 0 {
        return Err(AppError::Conflict(
            "Cannot delete deliverer with existing deliveries. Please reassign deliveries first."
                .to_owned(),
        ));
    }

    state
        .store()
        .delete(collections::DELIVERERS, &id)
        .await
        .map_err(missing("Deliverer"))?;

    Ok(Json(json!({ "message": "Deliverer deleted successfully" })))
}

async fn set_status(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Deliverer>, AppError> {
    auth.require_role(&[Role::Admin, Role::Deliverer])?;

    let status: DelivererStatus = body
        .status
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::BadRequest("Invalid status".to_owned()))?;

    let mut fields = Document::new();
    fields.insert("status".to_owned(), Value::String(status.to_string()));
    fields.insert(
        "updatedAt".to_owned(),
        Value::String(Utc::now().to_rfc3339()),
    );

    state
        .store()
        .update(collections::DELIVERERS, &id, fields)
        .await
        .map_err(missing("Deliverer"))?;

    let updated = state
        .store()
        .get(collections::DELIVERERS, &id)
        .await?
        .ok_or(AppError::NotFound("Deliverer"))?;
    Ok(Json(from_document(updated)?))
}

async fn deliveries_for(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Value>, AppError> {
    let window = page_window(params.page, params.limit)?;

    let query = Query::collection(collections::DELIVERIES)
        .filter("delivererId", id.as_str())
        .order_by("createdAt", Direction::Desc);

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
