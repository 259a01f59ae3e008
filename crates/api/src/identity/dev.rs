//! Fixed token-to-principal map for tests and local development.
//!
//! Tokens are opaque random strings handed out by [`StaticIdentity::register`];
//! there is no real credential verification. The API refuses to start with
//! this backend unless the memory store backend is also selected, which
//! keeps it out of production.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rand::Rng;
use rand::distr::Alphanumeric;

use trego_core::{Role, UserId};

use super::{CreatedAccount, IdentityError, Principal};

/// In-process identity backend.
///
/// Cheaply cloneable; all clones share the same accounts.
#[derive(Clone, Default)]
pub struct StaticIdentity {
    inner: Arc<RwLock<Accounts>>,
}

#[derive(Default)]
struct Accounts {
    /// token -> principal
    by_token: HashMap<String, Principal>,
    /// email -> uid
    by_email: HashMap<String, UserId>,
    next_uid: u64,
}

impl StaticIdentity {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account and return a bearer token for it.
    ///
    /// # Panics
    ///
    /// Panics if the account lock is poisoned, which only happens after a
    /// panic elsewhere in the same test.
    #[must_use]
    pub fn register(&self, email: &str, role: Role) -> String {
        let mut accounts = self.inner.write().expect("identity map lock");
        accounts.next_uid += 1;
        let uid = UserId::new(format!("dev-user-{}", accounts.next_uid));

        let token = random_token();
        accounts.by_email.insert(email.to_owned(), uid.clone());
        accounts.by_token.insert(
            token.clone(),
            Principal {
                uid,
                email: Some(email.to_owned()),
                role: Some(role),
            },
        );
        token
    }

    pub(super) fn verify(&self, token: &str) -> Result<Principal, IdentityError> {
        self.inner
            .read()
            .expect("identity map lock")
            .by_token
            .get(token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }

    pub(super) fn create_user(&self, email: &str) -> Result<CreatedAccount, IdentityError> {
        let mut accounts = self.inner.write().expect("identity map lock");
        if accounts.by_email.contains_key(email) {
            return Err(IdentityError::EmailExists);
        }

        accounts.next_uid += 1;
        let uid = UserId::new(format!("dev-user-{}", accounts.next_uid));
        accounts.by_email.insert(email.to_owned(), uid.clone());
        Ok(CreatedAccount { uid })
    }

    pub(super) fn lookup_by_email(&self, email: &str) -> Result<UserId, IdentityError> {
        self.inner
            .read()
            .expect("identity map lock")
            .by_email
            .get(email)
            .cloned()
            .ok_or(IdentityError::UserNotFound)
    }

    /// Mint a token for an existing subject and remember it.
    pub(super) fn custom_token(&self, uid: &UserId, role: Role) -> String {
        let mut accounts = self.inner.write().expect("identity map lock");
        let email = accounts
            .by_email
            .iter()
            .find(|(_, mapped)| *mapped == uid)
            .map(|(email, _)| email.clone());

        let token = random_token();
        accounts.by_token.insert(
            token.clone(),
            Principal {
                uid: uid.clone(),
                email,
                role: Some(role),
            },
        );
        token
    }
}

fn random_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_verify() {
        let map = StaticIdentity::new();
        let token = map.register("ops@trego.app", Role::Admin);

        let principal = map.verify(&token).expect("registered token");
        assert_eq!(principal.email.as_deref(), Some("ops@trego.app"));
        assert_eq!(principal.role, Some(Role::Admin));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let map = StaticIdentity::new();
        map.create_user("dup@trego.app").expect("first");
        let err = map.create_user("dup@trego.app").expect_err("duplicate");
        assert!(matches!(err, IdentityError::EmailExists));
    }

    #[test]
    fn test_custom_token_carries_role() {
        let map = StaticIdentity::new();
        let account = map.create_user("driver@trego.app").expect("create");

        let token = map.custom_token(&account.uid, Role::Deliverer);
        let principal = map.verify(&token).expect("minted token");
        assert_eq!(principal.uid, account.uid);
        assert_eq!(principal.role, Some(Role::Deliverer));
    }
}
