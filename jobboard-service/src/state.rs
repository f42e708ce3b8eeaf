//! Application state management

use std::sync::Arc;

use crate::{
    config::Config,
    integrity::{ReferenceResolver, StoreReferences, UncheckedReferences},
    repository::{Resource, ResourceRepository},
    service::ResourceService,
    store::DocumentStore,
};

/// Application state shared across handlers
///
/// Cloning is cheap: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<dyn DocumentStore>,
    references: Arc<dyn ReferenceResolver>,
}

impl AppState {
    /// Create state over an open store
    ///
    /// The reference resolver follows `integrity.enforce_references`.
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let references: Arc<dyn ReferenceResolver> = if config.integrity.enforce_references {
            Arc::new(StoreReferences::new(
                Arc::clone(&store),
                config.request_timeout(),
            ))
        } else {
            tracing::warn!("Referential integrity checks are disabled");
            Arc::new(UncheckedReferences)
        };

        Self {
            config: Arc::new(config),
            store,
            references,
        }
    }

    /// Replace the reference resolver
    #[must_use]
    pub fn with_references(mut self, references: Arc<dyn ReferenceResolver>) -> Self {
        self.references = references;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the document store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Service for resource `E`
    pub fn service<E: Resource>(&self) -> ResourceService<E> {
        ResourceService::new(
            ResourceRepository::new(Arc::clone(&self.store), self.config.request_timeout()),
            Arc::clone(&self.references),
        )
    }
}
