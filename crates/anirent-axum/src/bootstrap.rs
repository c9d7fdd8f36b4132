//! Axum server bootstrap - the composition root.
//!
//! This module is the only place where the production adapters are wired
//! together for the web transport.

use std::sync::Arc;

use anirent_service::{AnirentService, ServiceConfig, ServiceDeps};
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::create_router;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Context for the Axum server.
///
/// Holds the service facade every handler delegates to.
#[derive(Debug, Clone)]
pub struct AxumContext {
    /// Service facade for search, downloads and subscriptions.
    pub service: Arc<AnirentService>,
}

impl AxumContext {
    /// Wrap an already constructed service.
    pub const fn new(service: Arc<AnirentService>) -> Self {
        Self { service }
    }
}

/// Build the service with the production adapters.
///
/// Must be called inside a tokio runtime.
pub fn bootstrap(config: &ServiceConfig) -> Result<AxumContext> {
    info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir.display(),
        "Bootstrapping anirent service"
    );
    let deps = ServiceDeps::from_config(config).context("failed to build service adapters")?;
    Ok(AxumContext::new(Arc::new(AnirentService::new(deps, config))))
}

/// Serve the API on `listener` until the service's shutdown signal fires.
///
/// After the signal the listener stops accepting, in-flight requests are
/// allowed to finish, and the service is drained before this returns.
pub async fn serve(ctx: AxumContext, listener: TcpListener, cors: CorsConfig) -> Result<()> {
    let service = Arc::clone(&ctx.service);
    let app = create_router(ctx, &cors);

    if let Ok(addr) = listener.local_addr() {
        info!("anirent web server listening on http://{addr}");
    }

    let shutdown = Arc::clone(&service);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.shutdown_requested().await })
        .await
        .context("server error")?;

    info!("Listener closed; draining service");
    service.drain().await;
    Ok(())
}

/// Bootstrap, bind `config.listen_addr` and serve until Ctrl-C.
pub async fn start_server(config: ServiceConfig, cors: CorsConfig) -> Result<()> {
    let ctx = bootstrap(&config)?;
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    let service = Arc::clone(&ctx.service);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received; shutting down"),
            Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {e}; shutting down"),
        }
        service.shutdown();
    });

    serve(ctx, listener, cors).await
}
