//! HTTP client for the identity service.
//!
//! Speaks the provider's account-management REST surface:
//!
//! ```text
//! POST {base}/v1/accounts:lookup       {"idToken"}                 -> principal
//! POST {base}/v1/accounts:signUp       {"email","password","displayName"} -> {"uid"}
//! POST {base}/v1/accounts:queryByEmail {"email"}                   -> {"uid"}
//! POST {base}/v1/accounts:customToken  {"uid","claims":{"role"}}   -> {"token"}
//! ```
//!
//! Server-to-server calls authenticate with the configured API key.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use trego_core::{Role, UserId};

use crate::config::IdentityConfig;

use super::{CreatedAccount, IdentityError, Principal};

const API_KEY_HEADER: &str = "x-api-key";

/// Identity service HTTP client.
#[derive(Clone)]
pub struct HttpIdentity {
    inner: Arc<HttpIdentityInner>,
}

struct HttpIdentityInner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    uid: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    claims: Claims,
}

#[derive(Debug, Default, Deserialize)]
struct Claims {
    #[serde(default)]
    role: Option<Role>,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    uid: String,
}

#[derive(Debug, Deserialize)]
struct QueryByEmailResponse {
    uid: String,
}

#[derive(Debug, Deserialize)]
struct CustomTokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: String,
}

impl HttpIdentity {
    /// Create a new identity service client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            inner: Arc::new(HttpIdentityInner {
                client: reqwest::Client::new(),
                base_url: config.url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.expose_secret().to_owned(),
            }),
        }
    }

    fn endpoint(&self, operation: &str) -> String {
        format!("{}/v1/accounts:{operation}", self.inner.base_url)
    }

    async fn post(
        &self,
        operation: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, IdentityError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(operation))
            .header(API_KEY_HEADER, &self.inner.api_key)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    #[instrument(skip_all, fields(identity = "http"))]
    pub(super) async fn verify(&self, token: &str) -> Result<Principal, IdentityError> {
        let response = self.post("lookup", &json!({ "idToken": token })).await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST
        ) {
            return Err(IdentityError::InvalidToken);
        }
        let response = check_status(response).await?;

        let body: LookupResponse = response.json().await?;
        Ok(Principal {
            uid: UserId::new(body.uid),
            email: body.email,
            role: body.claims.role,
        })
    }

    #[instrument(skip_all, fields(identity = "http"))]
    pub(super) async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<CreatedAccount, IdentityError> {
        let response = self
            .post(
                "signUp",
                &json!({
                    "email": email,
                    "password": password,
                    "displayName": display_name,
                }),
            )
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(IdentityError::EmailExists);
        }
        let response = check_status(response).await?;

        let body: SignUpResponse = response.json().await?;
        Ok(CreatedAccount {
            uid: UserId::new(body.uid),
        })
    }

    #[instrument(skip_all, fields(identity = "http"))]
    pub(super) async fn lookup_by_email(&self, email: &str) -> Result<UserId, IdentityError> {
        let response = self.post("queryByEmail", &json!({ "email": email })).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(IdentityError::UserNotFound);
        }
        let response = check_status(response).await?;

        let body: QueryByEmailResponse = response.json().await?;
        Ok(UserId::new(body.uid))
    }

    #[instrument(skip_all, fields(identity = "http"))]
    pub(super) async fn custom_token(
        &self,
        uid: &UserId,
        role: Role,
    ) -> Result<String, IdentityError> {
        let response = self
            .post(
                "customToken",
                &json!({
                    "uid": uid,
                    "claims": { "role": role },
                }),
            )
            .await?;

        let response = check_status(response).await?;
        let body: CustomTokenResponse = response.json().await?;
        Ok(body.token)
    }
}

/// Map non-2xx responses into [`IdentityError::Api`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorResponse>()
        .await
        .map_or_else(|_| status.to_string(), |body| body.error);

    Err(IdentityError::Api {
        status: status.as_u16(),
        message,
    })
}
