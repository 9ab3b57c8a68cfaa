//! The assembled gateway.
//!
//! One [`Gateway`] owns one limiter and one reference cache. Construct it
//! once and share it; every clone of its parts talks through the same
//! limiter, so quotas hold across concurrent callers.

use std::sync::Arc;

use taskgate_core::{Board, BoardList, WriteIntent};
use taskgate_fetch::{FetchError, HttpTransport, RateLimiter, RequestExecutor, Transport};
use taskgate_store::{GatewayConfig, ReferenceCache};
use tracing::info;

use crate::api::TrelloApi;
use crate::error::{GatewayError, WriteError};
use crate::metadata::BoardMetadata;
use crate::orchestrator::{TaskOutcome, TaskWriter};

/// Rate-limited, caching, deduplicating access to one Trello account.
#[derive(Debug, Clone)]
pub struct Gateway {
    api: TrelloApi,
    metadata: BoardMetadata,
    writer: TaskWriter,
    limiter: Arc<RateLimiter>,
}

impl Gateway {
    /// Builds a gateway talking HTTPS to the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] for invalid configuration or missing
    /// credentials, and [`GatewayError::Transport`] if the HTTP client
    /// cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let credentials = config.credentials()?;
        let transport =
            HttpTransport::with_base_url(&config.base_url, credentials, config.request_timeout())?;
        Ok(Self::assemble(config, Arc::new(transport)))
    }

    /// Builds a gateway over any transport.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] for invalid configuration.
    pub fn with_transport(
        config: &GatewayConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self::assemble(config, transport))
    }

    fn assemble(config: &GatewayConfig, transport: Arc<dyn Transport>) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.limits.clone()));
        let executor = RequestExecutor::new(transport, Arc::clone(&limiter))
            .with_retry_strategy(config.retry.clone());
        let api = TrelloApi::new(executor);
        let cache = Arc::new(ReferenceCache::from_config(&config.cache));
        let metadata = BoardMetadata::new(api.clone(), cache);
        let writer = TaskWriter::new(
            api.clone(),
            metadata.clone(),
            config.writer.clone(),
            config.default_board_id.clone(),
        );

        info!(
            base_url = %config.base_url,
            default_board = config.default_board_id.as_deref().unwrap_or("-"),
            "Gateway ready"
        );

        Self {
            api,
            metadata,
            writer,
            limiter,
        }
    }

    /// Creates a card from a write intent, or returns an existing duplicate.
    ///
    /// # Errors
    ///
    /// See [`TaskWriter::create_task`].
    pub async fn create_task(&self, intent: WriteIntent) -> Result<TaskOutcome, WriteError> {
        self.writer.create_task(intent).await
    }

    /// Lists open boards.
    ///
    /// # Errors
    ///
    /// Returns the call error.
    pub async fn list_boards(&self) -> Result<Vec<Board>, FetchError> {
        self.api.list_boards().await
    }

    /// Returns the lists of a board, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns the call error on a cache miss.
    pub async fn board_lists(&self, board_id: &str) -> Result<Vec<BoardList>, FetchError> {
        Ok(self.metadata.lists(board_id).await?.lists().to_vec())
    }

    /// Returns the raw endpoint client.
    pub fn api(&self) -> &TrelloApi {
        &self.api
    }

    /// Returns the cached reference data reader.
    pub fn metadata(&self) -> &BoardMetadata {
        &self.metadata
    }

    /// Returns the task writer.
    pub fn writer(&self) -> &TaskWriter {
        &self.writer
    }

    /// Returns the shared limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Stops admitting calls. Waiting callers fail with
    /// [`FetchError::Shutdown`] and their requests are never sent.
    pub fn shutdown(&self) {
        info!("Shutting down gateway");
        self.limiter.shutdown();
    }
}
