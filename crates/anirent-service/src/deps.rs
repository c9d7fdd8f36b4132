//! Dependency injection for `AnirentService`.
//!
//! All collaborators are injected as trait objects so the facade stays
//! adapter-neutral and tests can swap in scripted fakes.

use std::sync::Arc;

use anirent_btdigg::{BtDiggConfig, BtDiggProvider};
use anirent_core::{DownloadEngine, NameParser, SearchProvider, ServiceConfig};
use anirent_download::HttpEngine;
use anirent_parser::SubsPleaseParser;

use crate::error::ServiceError;

/// Dependencies required to construct an `AnirentService`.
///
/// All fields are private to enforce construction via `ServiceDeps::new()`
/// or `ServiceDeps::from_config()`.
///
/// # Example
///
/// ```ignore
/// let deps = ServiceDeps::new(provider, parser, engine);
/// let service = AnirentService::new(deps, &config);
/// ```
pub struct ServiceDeps {
    /// Remote search provider.
    pub(crate) provider: Arc<dyn SearchProvider>,
    /// Release name parser.
    pub(crate) parser: Arc<dyn NameParser>,
    /// Content retrieval engine.
    pub(crate) engine: Arc<dyn DownloadEngine>,
}

impl ServiceDeps {
    /// Create a new `ServiceDeps` with all required dependencies.
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        parser: Arc<dyn NameParser>,
        engine: Arc<dyn DownloadEngine>,
    ) -> Self {
        Self {
            provider,
            parser,
            engine,
        }
    }

    /// Build the production adapters: BTDigg search, the `SubsPlease`
    /// parser and the HTTP download engine.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        config.validate()?;

        let provider = BtDiggProvider::new(BtDiggConfig::from_service(config))?;
        let engine = HttpEngine::new(config)?;

        Ok(Self::new(
            Arc::new(provider),
            Arc::new(SubsPleaseParser::new()),
            Arc::new(engine),
        ))
    }
}

impl std::fmt::Debug for ServiceDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDeps").finish_non_exhaustive()
    }
}
