//! Shared application state.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::identity::IdentityService;
use crate::services::AggregateUpdater;
use crate::store::Store;

/// Application state shared across all request handlers.
///
/// Cheaply cloneable; the inner state is reference-counted.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: Store,
    identity: IdentityService,
    aggregates: AggregateUpdater,
}

impl AppState {
    #[must_use]
    pub fn new(config: ApiConfig, store: Store, identity: IdentityService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                aggregates: AggregateUpdater::new(store.clone()),
                store,
                identity,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityService {
        &self.inner.identity
    }

    #[must_use]
    pub fn aggregates(&self) -> &AggregateUpdater {
        &self.inner.aggregates
    }
}
