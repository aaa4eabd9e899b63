//! Provider adapter lookup keyed by stored provider tag

use std::collections::HashMap;
use std::sync::Arc;

use realtysync_domain::{ProviderKind, RealtySyncError, Result, SyncAccount};

use super::ports::EventSource;

/// Maps each [`ProviderKind`] to its adapter.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    sources: HashMap<ProviderKind, Arc<dyn EventSource>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own kind, replacing any previous one.
    pub fn register(&mut self, source: Arc<dyn EventSource>) -> &mut Self {
        self.sources.insert(source.kind(), source);
        self
    }

    pub fn with_source(mut self, source: Arc<dyn EventSource>) -> Self {
        self.register(source);
        self
    }

    /// Resolve the adapter for a stored provider tag.
    ///
    /// # Errors
    /// `UnsupportedProvider` for an unknown tag or a kind with no adapter.
    pub fn resolve(&self, tag: &str) -> Result<Arc<dyn EventSource>> {
        self.source_for(tag.parse()?)
    }

    /// Resolve the adapter for an account's stored provider.
    ///
    /// # Errors
    /// `UnsupportedProvider` for an unknown tag or a kind with no adapter.
    pub fn resolve_account(&self, account: &SyncAccount) -> Result<Arc<dyn EventSource>> {
        self.source_for(account.provider_kind()?)
    }

    pub fn source_for(&self, kind: ProviderKind) -> Result<Arc<dyn EventSource>> {
        self.sources.get(&kind).cloned().ok_or_else(|| {
            RealtySyncError::UnsupportedProvider(format!("no adapter registered for {kind}"))
        })
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.sources.keys().copied().collect()
    }
}
