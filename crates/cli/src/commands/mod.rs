//! CLI command implementations.

pub mod admin;
pub mod seed;

use trego_api::config::{ApiConfig, StoreBackend};
use trego_api::identity::{HttpIdentity, IdentityService, StaticIdentity};
use trego_api::store::{HttpStore, MemoryStore, Store};
use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] trego_api::config::ConfigError),

    /// Input validation failed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Identity service operation failed.
    #[error("Identity error: {0}")]
    Identity(#[from] trego_api::identity::IdentityError),

    /// Record store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] trego_api::store::StoreError),
}

/// Build the store and identity clients the same way the API binary does.
///
/// The memory variants are only useful for dry-running commands; data
/// written to them is gone when the process exits.
pub(crate) fn connect(config: &ApiConfig) -> Result<(Store, IdentityService), CliError> {
    let store = match (config.store_backend, &config.record_store) {
        (StoreBackend::Http, Some(record_store)) => Store::Http(HttpStore::new(record_store)),
        (StoreBackend::Memory, _) => {
            tracing::warn!("using in-memory record store; changes will not persist");
            Store::Memory(MemoryStore::new())
        }
        (StoreBackend::Http, None) => {
            return Err(CliError::InvalidInput(
                "RECORD_STORE_URL and RECORD_STORE_TOKEN are required".to_owned(),
            ));
        }
    };

    let identity = match &config.identity {
        Some(identity_config) => IdentityService::http(HttpIdentity::new(identity_config)),
        None => {
            tracing::warn!("no identity service configured; using static development accounts");
            IdentityService::fixed(StaticIdentity::new())
        }
    };

    Ok((store, identity))
}
