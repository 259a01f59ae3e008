//! Router assembly.

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::routes;
use crate::state::AppState;

/// Build the complete application router.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_router());

    // Browser access is limited to the configured dashboard origin. With no
    // FRONTEND_URL there is no CORS layer at all, so cross-origin browser
    // requests fail the same-origin policy.
    if let Some(origin) = state
        .config()
        .frontend_url
        .as_deref()
        .and_then(|url| url.parse::<HeaderValue>().ok())
    {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        );
    }

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        #[allow(clippy::cast_possible_truncation)]
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use trego_core::Role;

    use crate::config::{ApiConfig, StoreBackend};
    use crate::identity::{IdentityService, StaticIdentity};
    use crate::store::{MemoryStore, Store, collections, to_document};

    use super::*;

    fn test_config() -> ApiConfig {
        ApiConfig {
            host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 0,
            frontend_url: None,
            store_backend: StoreBackend::Memory,
            record_store: None,
            identity: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            tls: None,
        }
    }

    struct Harness {
        router: Router,
        store: Store,
        identity: StaticIdentity,
        admin_token: String,
    }

    async fn harness() -> Harness {
        let store = Store::Memory(MemoryStore::new());
        let identity = StaticIdentity::new();
        let admin_token = identity.register("ops@trego.app", Role::Admin);

        let state = AppState::new(
            test_config(),
            store.clone(),
            IdentityService::fixed(identity.clone()),
        );
        Harness {
            router: build_router(state),
            store,
            identity,
            admin_token,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible service");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, body)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        builder.body(body).expect("request")
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let h = harness().await;

        let (status, body) = send(&h.router, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!("ok"));

        let (status, _) = send(&h.router, request("GET", "/health/ready", None, None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_401() {
        let h = harness().await;
        let (status, body) = send(&h.router, request("GET", "/api/clients", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Access token required");
    }

    #[tokio::test]
    async fn test_bad_token_is_401() {
        let h = harness().await;
        let (status, body) =
            send(&h.router, request("GET", "/api/clients", Some("bogus"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_non_admin_cannot_create_client() {
        let h = harness().await;
        let client_token = h.identity.register("viewer@trego.app", Role::Client);

        let (status, body) = send(
            &h.router,
            request(
                "POST",
                "/api/clients",
                Some(&client_token),
                Some(json!({ "name": "Acme", "email": "a@b.c", "phone": "555" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Insufficient permissions");
    }

    #[tokio::test]
    async fn test_client_validation_errors() {
        let h = harness().await;
        let (status, body) = send(
            &h.router,
            request(
                "POST",
                "/api/clients",
                Some(&h.admin_token),
                Some(json!({ "email": "not-an-email" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let errors = body["errors"].as_array().expect("errors array");
        assert_eq!(errors.len(), 3);
    }

    async fn create_client(h: &Harness) -> String {
        let (status, body) = send(
            &h.router,
            request(
                "POST",
                "/api/clients",
                Some(&h.admin_token),
                Some(json!({
                    "name": "Acme Imports",
                    "email": "billing@acme.test",
                    "phone": "+1-555-0100",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().expect("client id").to_owned()
    }

    async fn create_deliverer(h: &Harness) -> String {
        let (status, body) = send(
            &h.router,
            request(
                "POST",
                "/api/deliverers",
                Some(&h.admin_token),
                Some(json!({
                    "name": "Mika Laine",
                    "email": "mika@trego.app",
                    "phone": "+358-555-0101",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().expect("deliverer id").to_owned()
    }

    async fn create_delivery(
        h: &Harness,
        client_id: &str,
        deliverer_id: &str,
        items: i64,
        goods: &str,
        fees: &str,
    ) -> Value {
        let (status, body) = send(
            &h.router,
            request(
                "POST",
                "/api/deliveries",
                Some(&h.admin_token),
                Some(json!({
                    "clientId": client_id,
                    "clientName": "Acme Imports",
                    "delivererId": deliverer_id,
                    "delivererName": "Mika Laine",
                    "destination": "123 Main St",
                    "totalGoodsPrice": goods,
                    "deliveryFees": fees,
                    "numberOfItems": items,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn fetch_json(h: &Harness, uri: &str) -> Value {
        let (status, body) = send(&h.router, request("GET", uri, Some(&h.admin_token), None)).await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_delivery_create_refreshes_aggregates() {
        let h = harness().await;
        let client_id = create_client(&h).await;
        let deliverer_id = create_deliverer(&h).await;

        create_delivery(&h, &client_id, &deliverer_id, 2, "100.00", "10.00").await;

        let client = fetch_json(&h, &format!("/api/clients/{client_id}")).await;
        assert_eq!(client["totalDeliveries"], 2);
        assert_eq!(client["totalSpent"], "110.00");

        let deliverer = fetch_json(&h, &format!("/api/deliverers/{deliverer_id}")).await;
        assert_eq!(deliverer["totalDeliveries"], 1);

        create_delivery(&h, &client_id, &deliverer_id, 1, "50.00", "5.00").await;

        let client = fetch_json(&h, &format!("/api/clients/{client_id}")).await;
        assert_eq!(client["totalDeliveries"], 3);
        assert_eq!(client["totalSpent"], "165.00");
        let deliverer = fetch_json(&h, &format!("/api/deliverers/{deliverer_id}")).await;
        assert_eq!(deliverer["totalDeliveries"], 2);
    }

    #[tokio::test]
    async fn test_delivery_delete_refreshes_aggregates() {
        let h = harness().await;
        let client_id = create_client(&h).await;
        let deliverer_id = create_deliverer(&h).await;

        let first = create_delivery(&h, &client_id, &deliverer_id, 2, "100.00", "10.00").await;
        create_delivery(&h, &client_id, &deliverer_id, 1, "50.00", "5.00").await;

        let (status, body) = send(
            &h.router,
            request(
                "DELETE",
                &format!("/api/deliveries/{}", first["id"].as_str().expect("id")),
                Some(&h.admin_token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Delivery deleted successfully");

        let client = fetch_json(&h, &format!("/api/clients/{client_id}")).await;
        assert_eq!(client["totalDeliveries"], 1);
        assert_eq!(client["totalSpent"], "55.00");
        let deliverer = fetch_json(&h, &format!("/api/deliverers/{deliverer_id}")).await;
        assert_eq!(deliverer["totalDeliveries"], 1);
    }

    #[tokio::test]
    async fn test_delivery_update_does_not_refresh_aggregates() {
        let h = harness().await;
        let client_id = create_client(&h).await;
        let deliverer_id = create_deliverer(&h).await;
        let delivery = create_delivery(&h, &client_id, &deliverer_id, 2, "100.00", "10.00").await;

        let (status, _) = send(
            &h.router,
            request(
                "PUT",
                &format!("/api/deliveries/{}", delivery["id"].as_str().expect("id")),
                Some(&h.admin_token),
                Some(json!({ "totalGoodsPrice": "999.00" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Counters still reflect the pre-edit rescan.
        let client = fetch_json(&h, &format!("/api/clients/{client_id}")).await;
        assert_eq!(client["totalSpent"], "110.00");
    }

    #[tokio::test]
    async fn test_status_transition_sets_completed_date() {
        let h = harness().await;
        let client_id = create_client(&h).await;
        let deliverer_id = create_deliverer(&h).await;
        let delivery = create_delivery(&h, &client_id, &deliverer_id, 1, "10.00", "1.00").await;
        let id = delivery["id"].as_str().expect("id");

        let (status, body) = send(
            &h.router,
            request(
                "PUT",
                &format!("/api/deliveries/{id}/status"),
                Some(&h.admin_token),
                Some(json!({ "status": "delivered" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "delivered");
        assert!(body["completedDate"].is_string());

        let (status, body) = send(
            &h.router,
            request(
                "PUT",
                &format!("/api/deliveries/{id}/status"),
                Some(&h.admin_token),
                Some(json!({ "status": "shipped" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid status");
    }

    #[tokio::test]
    async fn test_client_delete_refused_while_referenced() {
        let h = harness().await;
        let client_id = create_client(&h).await;
        let deliverer_id = create_deliverer(&h).await;
        let delivery = create_delivery(&h, &client_id, &deliverer_id, 1, "10.00", "1.00").await;

        let (status, body) = send(
            &h.router,
            request(
                "DELETE",
                &format!("/api/clients/{client_id}"),
                Some(&h.admin_token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Cannot delete client with existing deliveries. Please delete deliveries first."
        );

        // After the referencing delivery is gone the delete succeeds.
        let (status, _) = send(
            &h.router,
            request(
                "DELETE",
                &format!("/api/deliveries/{}", delivery["id"].as_str().expect("id")),
                Some(&h.admin_token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &h.router,
            request(
                "DELETE",
                &format!("/api/clients/{client_id}"),
                Some(&h.admin_token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Client deleted successfully");
    }

    #[tokio::test]
    async fn test_list_pagination_envelope() {
        let h = harness().await;
        let client_id = create_client(&h).await;
        let deliverer_id = create_deliverer(&h).await;
        for _ in 0..3 {
            create_delivery(&h, &client_id, &deliverer_id, 1, "10.00", "1.00").await;
        }

        let body = fetch_json(&h, "/api/deliveries?page=2&limit=2").await;
        assert_eq!(body["deliveries"].as_array().expect("array").len(), 1);
        assert_eq!(body["pagination"]["page"], 2);
        assert_eq!(body["pagination"]["limit"], 2);
        assert_eq!(body["pagination"]["total"], 3);
        assert_eq!(body["pagination"]["pages"], 2);
    }

    #[tokio::test]
    async fn test_client_search_prefix() {
        let h = harness().await;
        for (name, email) in [
            ("Alpha Foods", "a@x.test"),
            ("Alpine Goods", "b@x.test"),
            ("Beta Imports", "c@x.test"),
        ] {
            let (status, _) = send(
                &h.router,
                request(
                    "POST",
                    "/api/clients",
                    Some(&h.admin_token),
                    Some(json!({ "name": name, "email": email, "phone": "555" })),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let body = fetch_json(&h, "/api/clients?search=Alp").await;
        assert_eq!(body["clients"].as_array().expect("array").len(), 2);
        assert_eq!(body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn test_register_login_me_flow() {
        let h = harness().await;

        let (status, body) = send(
            &h.router,
            request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "driver@trego.app",
                    "password": "hunter22",
                    "displayName": "Mika Laine",
                    "role": "deliverer",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["role"], "deliverer");

        let (status, body) = send(
            &h.router,
            request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "driver@trego.app", "password": "hunter22" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["customToken"].as_str().expect("token").to_owned();

        let (status, body) =
            send(&h.router, request("GET", "/api/auth/me", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["displayName"], "Mika Laine");
        assert!(body["lastLoginAt"].is_string());
    }

    #[tokio::test]
    async fn test_login_refuses_deactivated_account() {
        let h = harness().await;
        let (status, _) = send(
            &h.router,
            request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "gone@trego.app",
                    "password": "hunter22",
                    "displayName": "Former Employee",
                    "role": "deliverer",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // Deactivate the profile document directly.
        let uid = IdentityService::fixed(h.identity.clone())
            .lookup_by_email("gone@trego.app")
            .await
            .expect("uid");
        let mut fields = crate::store::Document::new();
        fields.insert("isActive".to_owned(), json!(false));
        h.store
            .update(collections::USERS, uid.as_str(), fields)
            .await
            .expect("deactivate");

        let (status, body) = send(
            &h.router,
            request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "gone@trego.app", "password": "hunter22" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Account is deactivated");
    }

    #[tokio::test]
    async fn test_registration_requires_role() {
        let h = harness().await;
        let (status, body) = send(
            &h.router,
            request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "norole@trego.app",
                    "password": "hunter22",
                    "displayName": "No Role",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let errors = body["errors"].as_array().expect("errors array");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["field"], "role");
        assert_eq!(errors[0]["message"], "Valid role is required");
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let h = harness().await;
        let payload = json!({
            "email": "dup@trego.app",
            "password": "hunter22",
            "displayName": "Dup",
            "role": "deliverer",
        });

        let (status, _) = send(
            &h.router,
            request("POST", "/api/auth/register", None, Some(payload.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &h.router,
            request("POST", "/api/auth/register", None, Some(payload)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email already exists");
    }

    #[tokio::test]
    async fn test_deliverer_status_endpoint() {
        let h = harness().await;
        let deliverer_id = create_deliverer(&h).await;

        let (status, body) = send(
            &h.router,
            request(
                "PUT",
                &format!("/api/deliverers/{deliverer_id}/status"),
                Some(&h.admin_token),
                Some(json!({ "status": "busy" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "busy");
    }

    #[tokio::test]
    async fn test_categories() {
        let h = harness().await;
        let body = fetch_json(&h, "/api/categories").await;
        assert_eq!(body["total"], 4);

        let body = fetch_json(&h, "/api/categories/delivery_status").await;
        assert_eq!(body["id"], "delivery_status");

        let (status, _) = send(
            &h.router,
            request("GET", "/api/categories/nope", Some(&h.admin_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_delivery_404() {
        let h = harness().await;
        let (status, body) = send(
            &h.router,
            request("GET", "/api/deliveries/missing", Some(&h.admin_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Delivery not found");
    }

    #[tokio::test]
    async fn test_limit_zero_rejected() {
        let h = harness().await;
        let (status, _) = send(
            &h.router,
            request("GET", "/api/clients?limit=0", Some(&h.admin_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_to_document_helper_used_by_handlers_strips_id() {
        // Guard against the id field leaking into stored documents.
        #[derive(serde::Serialize)]
        struct Probe {
            id: String,
            name: String,
        }
        let fields = to_document(&Probe {
            id: "x".to_owned(),
            name: "y".to_owned(),
        })
        .expect("document");
        assert!(!fields.contains_key("id"));
    }
}
