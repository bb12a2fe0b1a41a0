//! Main runtime orchestration.
//!
//! The runtime owns the loaded configuration and the handler registry. On
//! start it builds the Slack Web API client, wraps registry and client in a
//! [`Dispatcher`] and serves it behind the webhook endpoint.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use chime_runtime::ChimeRuntime;
//!
//! // Searches the current directory for chime.toml
//! let mut runtime = ChimeRuntime::builder().build()?;
//!
//! // Explicit file and profile
//! let mut runtime = ChimeRuntime::builder()
//!     .config_file("config/chime.toml")
//!     .profile("production")
//!     .build()?;
//!
//! // Pre-loaded config
//! let config = load_config()?;
//! let mut runtime = ChimeRuntime::from_config(&config);
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::signal;
use tracing::{debug, info};

use chime_core::BoxedClient;
use chime_framework::{Dispatcher, HandlerEntry, HandlerRegistry};
use chime_transport::{
    ServerHandle, SignatureVerifier, SlackClient, SlackClientConfig, WebhookServer,
    WebhookServerConfig,
};

use crate::config::{ChimeConfig, ConfigLoader, ConfigResult, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// The Chime runtime: configuration, handlers and the server that feeds them.
///
/// Handlers are tried in registration order and the first match wins, so
/// register the specific ones before the broad ones.
///
/// ```rust,ignore
/// let mut runtime = ChimeRuntime::builder().build()?;
/// runtime.register(on_command("/hello").handler(hello));
/// runtime.register(on_event(EventKind::AppMention).handler(mention));
/// runtime.run().await?;
/// ```
pub struct ChimeRuntime {
    config: ChimeConfig,
    registry: HandlerRegistry,
    /// Replaces the Slack Web API client when set.
    client: Option<BoxedClient>,
}

impl ChimeRuntime {
    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a new runtime from configuration.
    ///
    /// This initializes logging from `config.logging`; an already installed
    /// subscriber is kept.
    pub fn from_config(config: &ChimeConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            registry: HandlerRegistry::new(),
            client: None,
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &ChimeConfig {
        &self.config
    }

    /// Returns the handlers registered so far, in priority order.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Appends a handler entry; earlier entries take precedence.
    pub fn register(&mut self, entry: HandlerEntry) {
        debug!(handler = entry.name(), matcher = %entry.matcher(), "Registered handler");
        self.registry.register(entry);
    }

    /// Registers multiple entries at once, preserving their order.
    pub fn register_all(&mut self, entries: impl IntoIterator<Item = HandlerEntry>) {
        for entry in entries {
            self.register(entry);
        }
    }

    /// Uses `client` instead of building a Slack Web API client.
    pub fn with_client(mut self, client: BoxedClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the dispatcher over a snapshot of the current registry.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Transport`] if the HTTP client cannot be built.
    pub fn dispatcher(&self) -> RuntimeResult<Dispatcher> {
        let client = match &self.client {
            Some(client) => Arc::clone(client),
            None => {
                let slack = &self.config.slack;
                let client = SlackClient::new(SlackClientConfig {
                    bot_token: slack.bot_token.clone(),
                    api_base: slack.api_base.clone(),
                    timeout: slack.timeout(),
                })?;
                Arc::new(client) as BoxedClient
            }
        };

        Ok(Dispatcher::new(self.registry.clone(), client))
    }

    /// Builds the webhook server without validating the configuration.
    ///
    /// # Errors
    ///
    /// See [`dispatcher`](Self::dispatcher).
    pub fn webhook_server(&self) -> RuntimeResult<WebhookServer<Dispatcher>> {
        let server = &self.config.server;
        let verifier = server
            .verify_signatures
            .then(|| SignatureVerifier::new(self.config.slack.signing_secret.clone()));

        if verifier.is_none() {
            debug!("Request signature verification disabled");
        }

        let config = WebhookServerConfig {
            addr: server.addr(),
            path: server.path.clone(),
            ack_timeout: server.ack_timeout(),
            verifier,
        };

        Ok(WebhookServer::new(config, self.dispatcher()?))
    }

    /// Validates the configuration and starts serving in the background.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Config`] for an invalid configuration and
    /// [`RuntimeError::Transport`] when the client or listener cannot be set
    /// up.
    pub async fn start(&self) -> RuntimeResult<ServerHandle> {
        validate_config(&self.config)?;

        info!(handlers = self.registry.len(), "Starting Chime runtime");
        let handle = self.webhook_server()?.start().await?;
        info!(addr = %handle.local_addr(), "Runtime started");

        Ok(handle)
    }

    /// Runs the runtime until a shutdown signal is received.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start); also fails if the signal handlers cannot
    /// be installed.
    pub async fn run(&self) -> RuntimeResult<()> {
        let handle = self.start().await?;

        info!("Chime runtime is now running. Press Ctrl+C to stop.");

        let signal = wait_for_shutdown().await;
        handle.shutdown().await;
        info!("Runtime stopped");

        signal
    }

    /// Runs the runtime until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let handle = self.start().await?;

        shutdown.await;

        handle.shutdown().await;
        info!("Runtime stopped");

        Ok(())
    }
}

impl std::fmt::Debug for ChimeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChimeRuntime")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("custom_client", &self.client.is_some())
            .finish()
    }
}

/// Waits for shutdown signals (Ctrl+C or SIGTERM).
async fn wait_for_shutdown() -> RuntimeResult<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(RuntimeError::Signal)?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result.map_err(RuntimeError::Signal)?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.map_err(RuntimeError::Signal)?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a `ChimeRuntime` with custom configuration.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder searching the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: ChimeConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration and builds the runtime.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load`].
    pub fn build(self) -> ConfigResult<ChimeRuntime> {
        let config = self.config_loader.load()?;
        Ok(ChimeRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chime_core::{AckResponse, ApiCallResult, InboundEvent, PlatformClient};
    use chime_framework::{ResponseContext, on_command};

    struct NullClient;

    #[async_trait]
    impl PlatformClient for NullClient {
        async fn post_message(&self, _: &str, _: &str) -> ApiCallResult {
            ApiCallResult::success()
        }

        async fn add_reaction(&self, _: &str, _: &str, _: &str) -> ApiCallResult {
            ApiCallResult::success()
        }
    }

    async fn hello(_event: InboundEvent, _ctx: ResponseContext) -> AckResponse {
        AckResponse::in_channel("hello everyone")
    }

    fn config() -> ChimeConfig {
        let mut config = ChimeConfig::default();
        config.slack.bot_token = "xoxb-test".to_string();
        config.server.host = "127.0.0.1".to_string();
        config.server.verify_signatures = false;
        config
    }

    fn runtime(config: &ChimeConfig) -> ChimeRuntime {
        let mut runtime = ChimeRuntime::from_config(config).with_client(Arc::new(NullClient));
        runtime.register(on_command("/hello").handler(hello));
        runtime
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_config() {
        let mut config = config();
        config.slack.bot_token.clear();

        let result = runtime(&config).start().await;
        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }

    #[tokio::test]
    async fn test_dispatcher_snapshot_keeps_order() {
        let runtime = runtime(&config());
        let dispatcher = runtime.dispatcher().unwrap();

        assert_eq!(dispatcher.registry().len(), 1);
        assert_eq!(runtime.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_serves_slash_command() {
        let mut config = config();
        config.server.port = 0;

        let handle = runtime(&config)
            .webhook_server()
            .unwrap()
            .start()
            .await
            .unwrap();
        let url = format!("http://{}/slack/events", handle.local_addr());

        let response = reqwest::Client::new()
            .post(&url)
            .header("content-type", "application/x-www-form-urlencoded")
            .body("command=%2Fhello&channel_id=C1&text=&user_id=U1")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body = response.text().await.unwrap();
        assert!(body.contains("in_channel"));
        assert!(body.contains("hello everyone"));

        let response = reqwest::Client::new()
            .post(&url)
            .header("content-type", "application/x-www-form-urlencoded")
            .body("command=%2Funknown&channel_id=C1")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert!(response.text().await.unwrap().is_empty());

        handle.shutdown().await;
    }
}
