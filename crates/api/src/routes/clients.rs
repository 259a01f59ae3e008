//! Client management routes.

use axum::extract::{Path, Query as QueryParams, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use trego_core::{ClientId, Money, Role};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{Client, Delivery, NewClient, UpdateClient};
use crate::state::AppState;
use crate::store::{Direction, Query, collections, from_document, to_document};

use super::{Pagination, decode_all, missing, page_window};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/deliveries", get(deliveries_for))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list(
    State(state): State<AppState>,
    _auth: RequireAuth,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Value>, AppError> {
    let window = page_window(params.page, params.limit)?;

    let mut query =
        Query::collection(collections::CLIENTS).order_by("createdAt", Direction::Desc);
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
    let clients: Vec<Client> = decode_all(docs)?;

    Ok(Json(json!({
        "clients": clients,
        "pagination": Pagination::new(window, total),
    })))
}

async fn fetch(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Client>, AppError> {
    let fields = state
        .store()
        .get(collections::CLIENTS, &id)
        .await?
        .ok_or(AppError::NotFound("Client"))?;
    Ok(Json(from_document(fields)?))
}

async fn create(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(payload): Json<NewClient>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    auth.require_role(&[Role::Admin])?;
    let valid = payload.validate().map_err(AppError::Validation)?;

    let now = Utc::now();
    let mut client = Client {
        id: ClientId::new(""),
        name: valid.name,
        email: valid.email,
        phone: valid.phone,
        address: valid.address,
        is_active: true,
        total_deliveries: 0,
        total_spent: Money::ZERO,
        created_at: now,
        updated_at: now,
    };

    let id = state
        .store()
        .insert(collections::CLIENTS, to_document(&client)?)
        .await?;
    client.id = ClientId::new(id);

    Ok((StatusCode::CREATED, Json(client)))
}

async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    Json(payload): Json<UpdateClient>,
) -> Result<Json<Client>, AppError> {
    auth.require_role(&[Role::Admin])?;

    let mut fields = to_document(&payload)?;
    fields.insert(
        "updatedAt".to_owned(),
        Value::String(Utc::now().to_rfc3339()),
    );

    state
        .store()
        .update(collections::CLIENTS, &id, fields)
        .await
        .map_err(missing("Client"))?;

    let updated = state
        .store()
        .get(collections::CLIENTS, &id)
        .await?
        .ok_or(AppError::NotFound("Client"))?;
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
        .get(collections::CLIENTS, &id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Client"));
    }

    let references = state
        .store()
        .count(&Query::collection(collections::DELIVERIES).filter("clientId", id.as_str()))
        .await?;
    if references > 0 {
        return Err(AppError::Conflict(
            "Cannot delete client with existing deliveries. Please delete deliveries first."
                .to_owned(),
        ));
    }

    state
        .store()
        .delete(collections::CLIENTS, &id)
        .await
        .map_err(missing("Client"))?;

    Ok(Json(json!({ "message": "Client deleted successfully" })))
}

async fn deliveries_for(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Value>, AppError> {
    let window = page_window(params.page, params.limit)?;

    let query = Query::collection(collections::DELIVERIES)
        .filter("clientId", id.as_str())
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
