//! # docrelay Server
//!
//! Relays document changes from a set of sources and collections to a
//! webhook endpoint. One trigger function is generated per (source,
//! collection) pair at startup; the change source invokes them over HTTP.

mod config;
mod health;
mod routes;

pub use config::{AppConfig, CollectionConfig, CollectionEntry, ConfigError, RelayConfig, ServerConfig, load_config};
pub use health::{ConfigurationSummary, EnvironmentSummary, HEALTH_CHECK_FUNCTION, HealthReport};
pub use routes::{TriggerError, TriggerRequest, TriggerResponse};

use std::sync::Arc;

use axum::Router;
use docrelay_events::{EventError, SharedHandler, TriggerRegistry};
use docrelay_webhooks::{WebhookDispatcher, WebhookError};

use crate::routes::{RelayState, relay_routes};

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Server error.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Webhook(#[from] WebhookError),
    #[error(transparent)]
    Event(#[from] EventError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The relay server: configuration, trigger registry and HTTP surface.
pub struct RelayServer {
    config: AppConfig,
    state: RelayState,
}

impl RelayServer {
    /// Creates a server that relays every change to the configured webhook.
    ///
    /// Fails if the webhook secret is missing or the URL is invalid.
    pub fn new(config: AppConfig) -> ServerResult<Self> {
        let dispatcher = WebhookDispatcher::new(config.webhook.clone())?;
        Self::with_handler(config, Arc::new(dispatcher))
    }

    /// Creates a server that passes changes to a custom handler.
    pub fn with_handler(config: AppConfig, handler: SharedHandler) -> ServerResult<Self> {
        config.validate()?;

        let configuration = ConfigurationSummary::from_config(&config);
        let environment = EnvironmentSummary::from_env();

        tracing::info!("docrelay configuration:");
        tracing::info!("Webhook URL: {}", configuration.webhook_url);
        tracing::info!(
            "Webhook secret: {}",
            if configuration.has_webhook_secret { "configured" } else { "NOT CONFIGURED" }
        );
        tracing::info!("Project: {}", environment.project());
        tracing::info!("Version: {}", environment.version);
        tracing::info!("Databases: [{}]", configuration.databases.join(", "));
        tracing::info!("Collections: [{}]", configuration.collections.join(", "));
        if config.webhook.is_placeholder_url() {
            tracing::warn!("Webhook URL is the built-in placeholder; set WEBHOOK_URL");
        }

        let registry = TriggerRegistry::build(
            config.relay.sources.as_slice(),
            &config.relay.collection_specs(),
            handler,
        )?;

        tracing::info!(
            "Setup complete: generated {} sync functions + 1 health check function",
            registry.len()
        );

        Ok(Self {
            config,
            state: RelayState {
                registry: Arc::new(registry),
                configuration: Arc::new(configuration),
                environment: Arc::new(environment),
            },
        })
    }

    /// Builds the HTTP router.
    pub fn router(&self) -> Router {
        relay_routes(self.state.clone())
    }

    /// Serves until Ctrl-C.
    pub async fn run(&self) -> ServerResult<()> {
        let addr = self.config.server.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("Starting docrelay on {}", addr);
        tracing::info!("Registered functions: {:?}", self.state.registry.function_names());

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
