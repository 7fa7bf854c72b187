//! Application state shared across handlers.

use std::sync::Arc;

use campus_client::{CmsClient, CmsResult, ContentRepository, ExecutionContext, ListingCache};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Fail-soft content access over the server-context CMS client.
    repository: Arc<ContentRepository<CmsClient>>,
    /// First-page listing cache.
    cache: ListingCache,
    /// Server configuration.
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Create new application state, building the server-context CMS client.
    pub fn new(config: ServerConfig) -> CmsResult<Self> {
        let client = CmsClient::new(&config.cms, ExecutionContext::Server)?;
        Ok(Self::with_client(client, config))
    }

    /// Create application state around an existing client.
    pub fn with_client(client: CmsClient, config: ServerConfig) -> Self {
        Self {
            repository: Arc::new(ContentRepository::new(client)),
            cache: ListingCache::with_config(config.cache_config()),
            config: Arc::new(config),
        }
    }

    /// Get a reference to the content repository.
    pub fn repository(&self) -> &ContentRepository<CmsClient> {
        &self.repository
    }

    /// Get a reference to the CMS client.
    pub fn client(&self) -> &CmsClient {
        self.repository.source()
    }

    /// Get a reference to the listing cache.
    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}
