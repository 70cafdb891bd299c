use crate::config::types::DiscoveryConfig;
use crate::provider::{LogProvider, ProviderError, StreamSummary};
use crate::watcher::claims::ClaimedStreams;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("listing streams of group '{group}' failed: {source}")]
    Provider {
        group: String,
        #[source]
        source: ProviderError,
    },
}

/// Starts a tailer for a newly claimed stream.
pub trait TailerLauncher: Send + Sync {
    fn launch(&self, stream: String);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySettings {
    pub interval: Duration,
    pub activity_window: ChronoDuration,
}

impl From<&DiscoveryConfig> for DiscoverySettings {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            interval: config.interval,
            // Range checked during config validation
            activity_window: ChronoDuration::from_std(config.activity_window)
                .unwrap_or(ChronoDuration::MAX),
        }
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

/// True when `last_event` falls inside `window` before `now`. The boundary
/// itself counts as recent.
pub fn is_recent(last_event: DateTime<Utc>, now: DateTime<Utc>, window: ChronoDuration) -> bool {
    match now.checked_sub_signed(window) {
        Some(cutoff) => last_event >= cutoff,
        None => true,
    }
}

/// Periodically discovers recently active streams of a group and launches a
/// tailer for each one it has not claimed yet.
pub struct GroupWatcher<L> {
    group: String,
    provider: Arc<dyn LogProvider>,
    launcher: L,
    settings: DiscoverySettings,
    claims: ClaimedStreams,
    poll_count: u64,
}

impl<L: TailerLauncher> GroupWatcher<L> {
    pub fn new(
        group: impl Into<String>,
        provider: Arc<dyn LogProvider>,
        launcher: L,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            group: group.into(),
            provider,
            launcher,
            settings,
            claims: ClaimedStreams::new(),
            poll_count: 0,
        }
    }

    pub fn claims(&self) -> &ClaimedStreams {
        &self.claims
    }

    /// One discovery round. Returns the streams claimed (and launched) by it,
    /// most recently active first.
    pub async fn poll_once(&mut self, now: DateTime<Utc>) -> Result<Vec<String>, WatcherError> {
        let streams = self
            .provider
            .list_recent_streams(&self.group)
            .await
            .map_err(|source| WatcherError::Provider {
                group: self.group.clone(),
                source,
            })?;
        self.poll_count += 1;

        let mut claimed = Vec::new();
        for StreamSummary { name, last_event } in streams {
            let Some(last_event) = last_event else {
                trace!(stream = %name, "Skipping stream without events");
                continue;
            };
            if !is_recent(last_event, now, self.settings.activity_window) {
                trace!(stream = %name, last_event = %last_event, "Skipping inactive stream");
                continue;
            }
            if !self.claims.claim(&name) {
                continue;
            }

            info!(group = %self.group, stream = %name, "Tailing new stream");
            self.launcher.launch(name.clone());
            claimed.push(name);
        }

        debug!(
            group = %self.group,
            poll_count = self.poll_count,
            newly_claimed = claimed.len(),
            total_claimed = self.claims.len(),
            "Discovery round complete"
        );

        Ok(claimed)
    }

    /// Poll every `interval` until cancelled or a listing fails.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<(), WatcherError> {
        debug!(group = %self.group, interval = ?self.settings.interval, "Group watcher started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.poll_once(Utc::now()) => { result?; }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.settings.interval) => {}
            }
        }

        debug!(group = %self.group, "Group watcher cancelled");
        Ok(())
    }
}
