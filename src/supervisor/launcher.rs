use crate::provider::{ContinuationToken, LogProvider};
use crate::sink::BatchSender;
use crate::tail::{StreamTailer, TailSettings, TailerError};
use crate::watcher::{GroupWatcher, TailerLauncher, WatcherError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Reported by every worker task when it stops.
pub enum WorkerExit {
    Tailer {
        stream: String,
        /// Last token the tailer held, so a restart can resume from it
        token: Option<ContinuationToken>,
        result: Result<(), TailerError>,
    },
    Watcher {
        /// Handed back with its claimed streams intact
        watcher: Box<GroupWatcher<Launcher>>,
        result: Result<(), WatcherError>,
    },
}

pub type ExitSender = mpsc::UnboundedSender<WorkerExit>;
pub type ExitReceiver = mpsc::UnboundedReceiver<WorkerExit>;

/// Cloneable handle that spawns worker tasks for one log group.
///
/// Every task it spawns observes the shared cancellation token and reports a
/// [`WorkerExit`] when it stops.
#[derive(Clone)]
pub struct Launcher {
    group: String,
    provider: Arc<dyn LogProvider>,
    output: BatchSender,
    settings: TailSettings,
    limiter: Option<Arc<Semaphore>>,
    exits: ExitSender,
    cancel: CancellationToken,
}

impl Launcher {
    pub fn new(
        group: impl Into<String>,
        provider: Arc<dyn LogProvider>,
        output: BatchSender,
        settings: TailSettings,
        max_tailers: Option<usize>,
        exits: ExitSender,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            group: group.into(),
            provider,
            output,
            settings,
            limiter: max_tailers.map(|n| Arc::new(Semaphore::new(n))),
            exits,
            cancel,
        }
    }

    /// Spawn a tailer for `stream`, optionally resuming from `token`, after
    /// waiting `delay`. With a tailer limit configured the task queues until a
    /// slot frees up.
    pub fn spawn_tailer(&self, stream: String, token: Option<ContinuationToken>, delay: Duration) {
        let mut tailer = StreamTailer::new(
            self.group.clone(),
            stream,
            Arc::clone(&self.provider),
            self.output.clone(),
            self.settings.clone(),
        )
        .resume_from(token);
        let limiter = self.limiter.clone();
        let exits = self.exits.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            if !wait_unless_cancelled(&cancel, delay).await {
                return;
            }

            let _permit = match limiter {
                Some(limiter) => {
                    trace!(
                        stream = %tailer.stream(),
                        available = limiter.available_permits(),
                        "Waiting for tailer slot"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        permit = limiter.acquire_owned() => match permit {
                            Ok(permit) => Some(permit),
                            Err(_) => return,
                        },
                    }
                }
                None => None,
            };

            let result = tailer.run(&cancel).await;
            let stream = tailer.stream().to_string();
            let _ = exits.send(WorkerExit::Tailer {
                stream,
                token: tailer.into_token(),
                result,
            });
        });
    }

    /// Spawn `watcher` after waiting `delay`.
    pub fn spawn_watcher(&self, mut watcher: Box<GroupWatcher<Launcher>>, delay: Duration) {
        let exits = self.exits.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            if !wait_unless_cancelled(&cancel, delay).await {
                return;
            }

            let result = watcher.run(&cancel).await;
            let _ = exits.send(WorkerExit::Watcher { watcher, result });
        });
    }
}

impl TailerLauncher for Launcher {
    fn launch(&self, stream: String) {
        debug!(group = %self.group, stream = %stream, "Launching tailer");
        self.spawn_tailer(stream, None, Duration::ZERO);
    }
}

/// Returns false when cancelled before `delay` elapsed.
async fn wait_unless_cancelled(cancel: &CancellationToken, delay: Duration) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = sleep(delay) => true,
    }
}
