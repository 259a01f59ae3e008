//! Identity service clients.
//!
//! Authentication is fully delegated: the identity service issues and
//! validates bearer credentials and associates a stable subject (`uid`) and
//! a `role` custom claim with each caller. This module only asks it
//! questions.
//!
//! Two backends exist behind [`IdentityService`]:
//!
//! - [`HttpIdentity`] - reqwest client for the provider's REST surface
//! - [`StaticIdentity`] - fixed token-to-principal map for tests and local
//!   development (never production)
//!
//! Verification results are cached per token in a bounded TTL cache so hot
//! dashboards don't turn every request into an identity round trip. The TTL
//! is well below the provider's token lifetime, so a revoked token stops
//! working within minutes, not hours.

pub mod dev;
pub mod http;

use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use trego_core::{Role, UserId};

pub use dev::StaticIdentity;
pub use http::HttpIdentity;

/// Cache TTL for verified tokens.
const VERIFY_CACHE_TTL: Duration = Duration::from_secs(300);

/// Maximum number of cached token verifications.
const VERIFY_CACHE_CAPACITY: u64 = 10_000;

/// Errors that can occur talking to the identity service.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The presented token is invalid or expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// No account exists for the given subject or email.
    #[error("user not found")]
    UserNotFound,

    /// An account already exists with the given email.
    #[error("email already exists")]
    EmailExists,

    /// HTTP transport error.
    #[error("identity transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The identity service rejected the request.
    #[error("identity API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// The authenticated caller, as attested by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Stable subject identifier.
    pub uid: UserId,
    /// Email on the account, when the provider shares it.
    pub email: Option<String>,
    /// Role custom claim carried by the credential.
    pub role: Option<Role>,
}

impl Principal {
    /// Check that the principal's role is one of `allowed`.
    ///
    /// A principal without a role claim never passes; the login flow always
    /// attaches one, so its absence means a token minted outside our flow.
    #[must_use]
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        self.role.is_some_and(|role| allowed.contains(&role))
    }
}

/// A newly created identity account.
#[derive(Debug, Clone)]
pub struct CreatedAccount {
    pub uid: UserId,
}

/// Identity service client over one of the supported backends, with a
/// token-verification cache in front.
#[derive(Clone)]
pub struct IdentityService {
    backend: Backend,
    verify_cache: Cache<String, Principal>,
}

#[derive(Clone)]
enum Backend {
    Http(HttpIdentity),
    Static(StaticIdentity),
}

impl IdentityService {
    /// Wrap the HTTP backend.
    #[must_use]
    pub fn http(client: HttpIdentity) -> Self {
        Self::new(Backend::Http(client))
    }

    /// Wrap the static development backend.
    #[must_use]
    pub fn fixed(map: StaticIdentity) -> Self {
        Self::new(Backend::Static(map))
    }

    fn new(backend: Backend) -> Self {
        Self {
            backend,
            verify_cache: Cache::builder()
                .max_capacity(VERIFY_CACHE_CAPACITY)
                .time_to_live(VERIFY_CACHE_TTL)
                .build(),
        }
    }

    /// Verify a bearer token and return the principal it belongs to.
    ///
    /// Successful verifications are cached; failures are not, so a token
    /// that becomes valid (clock skew) is retried on the next request.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidToken` for bad credentials, or a
    /// transport/API error when the provider cannot be reached.
    pub async fn verify(&self, token: &str) -> Result<Principal, IdentityError> {
        if let Some(principal) = self.verify_cache.get(token).await {
            return Ok(principal);
        }

        let principal = match &self.backend {
            Backend::Http(client) => client.verify(token).await?,
            Backend::Static(map) => map.verify(token)?,
        };

        self.verify_cache
            .insert(token.to_owned(), principal.clone())
            .await;
        Ok(principal)
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::EmailExists` if the email is taken.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<CreatedAccount, IdentityError> {
        match &self.backend {
            Backend::Http(client) => client.create_user(email, password, display_name).await,
            Backend::Static(map) => map.create_user(email),
        }
    }

    /// Look up an account's subject by email.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::UserNotFound` if no account exists.
    pub async fn lookup_by_email(&self, email: &str) -> Result<UserId, IdentityError> {
        match &self.backend {
            Backend::Http(client) => client.lookup_by_email(email).await,
            Backend::Static(map) => map.lookup_by_email(email),
        }
    }

    /// Mint a custom sign-in token for a subject, carrying the role claim.
    ///
    /// # Errors
    ///
    /// Returns a transport/API error when the provider cannot be reached.
    pub async fn custom_token(&self, uid: &UserId, role: Role) -> Result<String, IdentityError> {
        match &self.backend {
            Backend::Http(client) => client.custom_token(uid, role).await,
            Backend::Static(map) => Ok(map.custom_token(uid, role)),
        }
    }
}
