//! HTTP route handlers.
//!
//! Route table (all JSON, bearer auth unless noted):
//!
//! ```text
//! POST   /api/auth/register            public
//! POST   /api/auth/login               public
//! GET    /api/auth/me
//! PUT    /api/auth/me
//! POST   /api/auth/logout
//!
//! GET    /api/clients                  ?page&limit&search
//! POST   /api/clients                  admin
//! GET    /api/clients/{id}
//! PUT    /api/clients/{id}             admin
//! DELETE /api/clients/{id}             admin, refused while referenced
//! GET    /api/clients/{id}/deliveries  ?page&limit
//!
//! GET    /api/deliverers               ?page&limit&search&status
//! POST   /api/deliverers               admin
//! GET    /api/deliverers/{id}
//! PUT    /api/deliverers/{id}          admin
//! DELETE /api/deliverers/{id}          admin, refused while referenced
//! PUT    /api/deliverers/{id}/status   admin|deliverer
//! GET    /api/deliverers/{id}/deliveries
//!
//! GET    /api/deliveries               ?page&limit&status&clientId&delivererId
//! POST   /api/deliveries               admin|deliverer, refreshes aggregates
//! GET    /api/deliveries/{id}
//! PUT    /api/deliveries/{id}          admin|deliverer, no aggregate refresh
//! PUT    /api/deliveries/{id}/status   admin|deliverer, no aggregate refresh
//! DELETE /api/deliveries/{id}          admin, refreshes aggregates
//!
//! GET    /api/categories
//! GET    /api/categories/{id}
//!
//! GET    /health                       public liveness
//! GET    /health/ready                 public store probe
//! ```

pub mod auth;
pub mod categories;
pub mod clients;
pub mod deliverers;
pub mod deliveries;
pub mod health;

use axum::Router;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::{Document, StoreError, from_document};

const DEFAULT_PAGE_LIMIT: u32 = 10;
const MAX_PAGE_LIMIT: u32 = 100;

/// All `/api` routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/clients", clients::router())
        .nest("/deliverers", deliverers::router())
        .nest("/deliveries", deliveries::router())
        .nest("/categories", categories::router())
}

/// A resolved pagination window.
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    page: u32,
    limit: u32,
}

impl PageWindow {
    /// Number of results to skip.
    #[must_use]
    pub const fn offset(self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }

    /// Number of results per page.
    #[must_use]
    pub const fn limit(self) -> usize {
        self.limit as usize
    }
}

/// Resolve `page`/`limit` query parameters into a window.
///
/// Pages are 1-based; anything below 1 is treated as page 1. The limit is
/// clamped to 100, and an explicit `limit=0` is rejected up front rather
/// than dividing by zero in the pagination math.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for `limit=0`.
pub fn page_window(page: Option<u32>, limit: Option<u32>) -> Result<PageWindow, AppError> {
    let limit = match limit {
        None => DEFAULT_PAGE_LIMIT,
        Some(0) => {
            return Err(AppError::BadRequest(format!(
                "Limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        Some(limit) => limit.min(MAX_PAGE_LIMIT),
    };

    Ok(PageWindow {
        page: page.unwrap_or(1).max(1),
        limit,
    })
}

/// The `pagination` object attached to every list response.
#[derive(Debug, Serialize)]
pub struct Pagination {
    page: u32,
    limit: u32,
    total: usize,
    pages: usize,
}

impl Pagination {
    #[must_use]
    pub const fn new(window: PageWindow, total: usize) -> Self {
        Self {
            page: window.page,
            limit: window.limit,
            total,
            pages: total.div_ceil(window.limit as usize),
        }
    }
}

/// Deserialize a page of documents into models.
pub(crate) fn decode_all<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>, AppError> {
    docs.into_iter()
        .map(|doc| from_document(doc).map_err(AppError::from))
        .collect()
}

/// Map a store `NotFound` to the entity-level 404, passing other store
/// errors through.
pub(crate) fn missing(entity: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |error| match error {
        StoreError::NotFound => AppError::NotFound(entity),
        other => AppError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_defaults() {
        let window = page_window(None, None).expect("defaults");
        assert_eq!(window.offset(), 0);
        assert_eq!(window.limit(), 10);
    }

    #[test]
    fn test_page_window_offset_math() {
        let window = page_window(Some(3), Some(25)).expect("window");
        assert_eq!(window.offset(), 50);
        assert_eq!(window.limit(), 25);
    }

    #[test]
    fn test_page_window_clamps_and_rejects() {
        let window = page_window(Some(0), Some(500)).expect("clamped");
        assert_eq!(window.offset(), 0);
        assert_eq!(window.limit(), 100);

        assert!(page_window(None, Some(0)).is_err());
    }

    #[test]
    fn test_pagination_pages_is_ceiling() {
        let window = page_window(Some(1), Some(10)).expect("window");
        let serialized =
            serde_json::to_value(Pagination::new(window, 25)).expect("serialize");
        assert_eq!(serialized["pages"], 3);
        assert_eq!(serialized["total"], 25);

        let empty = serde_json::to_value(Pagination::new(window, 0)).expect("serialize");
        assert_eq!(empty["pages"], 0);
    }
}
