//! Admin account bootstrap.
//!
//! Registration requires the caller to state a role and there is no
//! role-escalation endpoint, so the first admin has to be created out of
//! band. This command creates the identity account and the matching
//! `users` document with the admin role.
//!
//! # Environment Variables
//!
//! Same as the API binary: `RECORD_STORE_URL`/`RECORD_STORE_TOKEN` and
//! `IDENTITY_URL`/`IDENTITY_API_KEY` (or `STORE_BACKEND=memory` for a dry
//! run).

use chrono::Utc;

use trego_api::config::ApiConfig;
use trego_api::models::User;
use trego_api::store::{collections, to_document};
use trego_core::{Email, Role};

use super::{CliError, connect};

const MIN_PASSWORD_LEN: usize = 6;

/// Create a new admin account.
///
/// # Errors
///
/// Returns `CliError` on invalid input, a taken email, or backend failure.
pub async fn create(email: &str, name: &str, password: &str) -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let email =
        Email::parse(email).map_err(|e| CliError::InvalidInput(format!("email: {e}")))?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(CliError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if name.trim().is_empty() {
        return Err(CliError::InvalidInput("name must not be empty".to_owned()));
    }

    let config = ApiConfig::from_env()?;
    let (store, identity) = connect(&config)?;

    tracing::info!("Creating admin account: {}", email);
    let account = identity
        .create_user(email.as_str(), password, name)
        .await?;

    let user = User {
        id: account.uid.clone(),
        email: email.as_str().to_owned(),
        display_name: name.trim().to_owned(),
        role: Role::Admin,
        phone: None,
        is_active: true,
        created_at: Utc::now(),
        last_login_at: None,
    };
    store
        .put(collections::USERS, account.uid.as_str(), to_document(&user)?)
        .await?;

    tracing::info!(
        "Admin account created successfully! uid: {}, email: {}",
        account.uid,
        email
    );

    Ok(())
}
