use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// Opaque read position inside a log stream.
///
/// Only providers create tokens; the tailer stores and compares them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// One entry of a stream listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub name: String,
    /// `None` when the stream has never received an event
    pub last_event: Option<DateTime<Utc>>,
}

/// Result of a single fetch against a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPage {
    pub events: Vec<LogEvent>,
    pub next_token: ContinuationToken,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request to log service failed: {0}")]
    Request(String),

    #[error("log service returned no next token for stream '{stream}'")]
    MissingToken { stream: String },

    #[error("log service returned an invalid timestamp {millis} for stream '{stream}'")]
    InvalidTimestamp { stream: String, millis: i64 },
}

/// Remote log service operations the tailing engine depends on.
#[async_trait]
pub trait LogProvider: Send + Sync {
    /// Streams of `group`, most recently active first. A single page only.
    async fn list_recent_streams(&self, group: &str) -> Result<Vec<StreamSummary>, ProviderError>;

    /// First read of a stream: no cursor, provider's default ordering.
    async fn fetch_initial(
        &self,
        group: &str,
        stream: &str,
        limit: usize,
    ) -> Result<EventPage, ProviderError>;

    /// Read up to `limit` events starting at `token`, oldest first.
    async fn fetch_from(
        &self,
        group: &str,
        stream: &str,
        token: &ContinuationToken,
        limit: usize,
    ) -> Result<EventPage, ProviderError>;
}
