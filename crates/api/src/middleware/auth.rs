//! Bearer-token authentication extractor.
//!
//! Every protected route takes [`RequireAuth`] as an argument. The extractor
//! reads the `Authorization: Bearer` header, verifies the token with the
//! identity service, then hydrates the principal's email and role from the
//! caller's `users` document. The document is authoritative for the role;
//! the token's role claim is only a fallback for principals that have no
//! profile document yet.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use trego_core::Role;

use crate::error::AppError;
use crate::identity::{IdentityError, Principal};
use crate::models::User;
use crate::state::AppState;
use crate::store::{collections, from_document};

/// Extractor that rejects unauthenticated requests.
pub struct RequireAuth(pub Principal);

impl RequireAuth {
    /// Reject with 403 unless the principal holds one of `allowed`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` with the dashboard's expected message.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if self.0.has_role(allowed) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Insufficient permissions".to_owned()))
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Access token required".to_owned()))?;

        let mut principal = state.identity().verify(token).await.map_err(|e| match e {
            IdentityError::InvalidToken => {
                AppError::Unauthorized("Invalid or expired token".to_owned())
            }
            other => AppError::Identity(other),
        })?;

        if let Some(fields) = state
            .store()
            .get(collections::USERS, principal.uid.as_str())
            .await?
        {
            let user: User = from_document(fields)?;
            principal.email = Some(user.email);
            principal.role = Some(user.role);
        }

        Ok(Self(principal))
    }
}

#[cfg(test)]
mod tests {
    use trego_core::UserId;

    use super::*;

    fn principal(role: Option<Role>) -> RequireAuth {
        RequireAuth(Principal {
            uid: UserId::new("u1"),
            email: None,
            role,
        })
    }

    #[test]
    fn test_require_role_passes_member() {
        assert!(
            principal(Some(Role::Admin))
                .require_role(&[Role::Admin, Role::Deliverer])
                .is_ok()
        );
    }

    #[test]
    fn test_require_role_rejects_outsider() {
        let err = principal(Some(Role::Client))
            .require_role(&[Role::Admin])
            .expect_err("client is not admin");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_require_role_rejects_missing_claim() {
        assert!(principal(None).require_role(&[Role::Admin]).is_err());
    }
}
