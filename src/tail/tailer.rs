use crate::config::types::TailConfig;
use crate::provider::{ContinuationToken, LogProvider, ProviderError};
use crate::sink::{BatchSender, OutputBatch};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum TailerError {
    #[error("fetching stream '{stream}' failed: {source}")]
    Provider {
        stream: String,
        #[source]
        source: ProviderError,
    },

    #[error("output sink closed while tailing stream '{stream}'")]
    SinkClosed { stream: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailSettings {
    pub fetch_limit: usize,
    pub idle_backoff: Duration,
}

impl From<&TailConfig> for TailSettings {
    fn from(config: &TailConfig) -> Self {
        Self {
            fetch_limit: config.fetch_limit,
            idle_backoff: config.idle_backoff,
        }
    }
}

impl Default for TailSettings {
    fn default() -> Self {
        Self::from(&TailConfig::default())
    }
}

/// What a single fetch did to the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// First read, the baseline token was established
    Initial,
    /// The provider handed back a different token
    Advanced,
    /// The provider handed back the token it was given: nothing new yet
    Idle,
}

/// Fetch/advance loop for exactly one log stream.
///
/// The tailer is the only owner of the stream's continuation token. The first
/// fetch has no cursor and lands on the most recent events; every later fetch
/// reads oldest-first from the held token so nothing is skipped or reordered.
pub struct StreamTailer {
    group: String,
    stream: String,
    provider: Arc<dyn LogProvider>,
    output: BatchSender,
    settings: TailSettings,
    token: Option<ContinuationToken>,
    fetch_count: u64,
}

impl StreamTailer {
    pub fn new(
        group: impl Into<String>,
        stream: impl Into<String>,
        provider: Arc<dyn LogProvider>,
        output: BatchSender,
        settings: TailSettings,
    ) -> Self {
        Self {
            group: group.into(),
            stream: stream.into(),
            provider,
            output,
            settings,
            token: None,
            fetch_count: 0,
        }
    }

    /// Continue from a token obtained by an earlier tailer of the same stream,
    /// skipping the initial fetch.
    pub fn resume_from(mut self, token: Option<ContinuationToken>) -> Self {
        self.token = token;
        self
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Token the next fetch will start from, if the baseline has been set
    pub fn token(&self) -> Option<&ContinuationToken> {
        self.token.as_ref()
    }

    pub fn into_token(self) -> Option<ContinuationToken> {
        self.token
    }

    /// Perform one fetch, hand its batch to the sink and advance the cursor.
    pub async fn fetch_next(&mut self) -> Result<FetchOutcome, TailerError> {
        let limit = self.settings.fetch_limit;
        let page = match &self.token {
            None => self.provider.fetch_initial(&self.group, &self.stream, limit).await,
            Some(token) => {
                self.provider
                    .fetch_from(&self.group, &self.stream, token, limit)
                    .await
            }
        }
        .map_err(|source| TailerError::Provider {
            stream: self.stream.clone(),
            source,
        })?;

        self.fetch_count += 1;
        let event_count = page.events.len();

        self.output
            .send(OutputBatch::new(self.stream.clone(), page.events))
            .await
            .map_err(|_| TailerError::SinkClosed {
                stream: self.stream.clone(),
            })?;

        let outcome = match self.token.replace(page.next_token) {
            None => FetchOutcome::Initial,
            Some(previous) if Some(&previous) == self.token.as_ref() => FetchOutcome::Idle,
            Some(_) => FetchOutcome::Advanced,
        };

        trace!(
            group = %self.group,
            stream = %self.stream,
            event_count,
            fetch_count = self.fetch_count,
            outcome = ?outcome,
            "Fetched events"
        );

        Ok(outcome)
    }

    /// Tail until cancelled or a fetch fails.
    ///
    /// Loops immediately while data is flowing and waits `idle_backoff` after
    /// each fetch that did not move the cursor.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<(), TailerError> {
        debug!(
            group = %self.group,
            stream = %self.stream,
            resumed = self.token.is_some(),
            "Tailer started"
        );

        loop {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.fetch_next() => result?,
            };

            if outcome == FetchOutcome::Idle {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(self.settings.idle_backoff) => {}
                }
            }
        }

        debug!(stream = %self.stream, fetch_count = self.fetch_count, "Tailer cancelled");
        Ok(())
    }
}
