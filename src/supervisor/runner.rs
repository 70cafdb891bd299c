use crate::config::types::{Config, ErrorPolicy};
use crate::provider::LogProvider;
use crate::sink::{create_channel, OutputSink, SinkError};
use crate::supervisor::launcher::{ExitReceiver, Launcher, WorkerExit};
use crate::tail::{TailSettings, TailerError};
use crate::watcher::{DiscoverySettings, GroupWatcher, WatcherError};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum SuperviseError {
    #[error(transparent)]
    Tailer(#[from] TailerError),

    #[error(transparent)]
    Watcher(#[from] WatcherError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("output task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// What to tail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single named stream of the group
    Stream(String),
    /// Every recently active stream of the group, discovered over time
    Group,
}

/// Owns the worker tasks of one tailing session and applies the configured
/// error policy to every worker that stops.
pub struct Supervisor {
    group: String,
    provider: Arc<dyn LogProvider>,
    config: Config,
}

impl Supervisor {
    pub fn new(group: impl Into<String>, provider: Arc<dyn LogProvider>, config: Config) -> Self {
        Self {
            group: group.into(),
            provider,
            config,
        }
    }

    /// Run until `shutdown` resolves or a worker fails under the exit policy.
    ///
    /// Batches already queued for the sink are written before returning.
    pub async fn run<W, F>(
        self,
        target: Target,
        sink: OutputSink<W>,
        shutdown: F,
    ) -> Result<(), SuperviseError>
    where
        W: Write + Send + 'static,
        F: Future<Output = ()>,
    {
        let (batch_tx, batch_rx) = create_channel(self.config.output.queue_capacity);
        let mut sink_handle = tokio::spawn(sink.run(batch_rx));

        let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let launcher = Launcher::new(
            self.group.clone(),
            Arc::clone(&self.provider),
            batch_tx,
            TailSettings::from(&self.config.tail),
            self.config.discovery.max_tailers,
            exit_tx,
            cancel.clone(),
        );

        match &target {
            Target::Stream(stream) => {
                info!(group = %self.group, stream = %stream, "Tailing single stream");
                launcher.spawn_tailer(stream.clone(), None, Duration::ZERO);
            }
            Target::Group => {
                info!(group = %self.group, "Watching log group");
                let watcher = GroupWatcher::new(
                    self.group.clone(),
                    Arc::clone(&self.provider),
                    launcher.clone(),
                    DiscoverySettings::from(&self.config.discovery),
                );
                launcher.spawn_watcher(Box::new(watcher), Duration::ZERO);
            }
        }

        tokio::pin!(shutdown);
        let mut sink_finished = false;

        let outcome = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break Ok(());
                }
                result = &mut sink_handle => {
                    sink_finished = true;
                    break match result {
                        Ok(Ok(_)) => Ok(()),
                        Ok(Err(e)) => Err(e.into()),
                        Err(e) => Err(e.into()),
                    };
                }
                Some(exit) = exit_rx.recv() => {
                    if let Err(e) = self.handle_exit(exit, &launcher) {
                        break Err(e);
                    }
                }
            }
        };

        cancel.cancel();
        drain_and_close(launcher, exit_rx);

        if !sink_finished {
            debug!("Waiting for output sink to drain");
            match sink_handle.await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(error = %e, "Output sink failed while draining"),
                Err(e) => warn!(error = %e, "Output sink task failed while draining"),
            }
        }

        outcome
    }

    fn handle_exit(&self, exit: WorkerExit, launcher: &Launcher) -> Result<(), SuperviseError> {
        let policy = self.config.supervision.on_error;
        let delay = self.config.supervision.restart_delay;

        match exit {
            WorkerExit::Tailer {
                stream,
                result: Ok(()),
                ..
            } => {
                debug!(stream = %stream, "Tailer stopped");
                Ok(())
            }
            WorkerExit::Tailer {
                stream,
                token,
                result: Err(err),
            } => {
                if policy == ErrorPolicy::Exit || matches!(err, TailerError::SinkClosed { .. }) {
                    error!(stream = %stream, error = %err, "Tailer failed");
                    return Err(err.into());
                }
                warn!(
                    stream = %stream,
                    error = %err,
                    resume = token.is_some(),
                    restart_delay = ?delay,
                    "Tailer failed, restarting"
                );
                launcher.spawn_tailer(stream, token, delay);
                Ok(())
            }
            WorkerExit::Watcher { result: Ok(()), .. } => {
                debug!(group = %self.group, "Group watcher stopped");
                Ok(())
            }
            WorkerExit::Watcher {
                watcher,
                result: Err(err),
            } => {
                if policy == ErrorPolicy::Exit {
                    error!(group = %self.group, error = %err, "Group watcher failed");
                    return Err(err.into());
                }
                warn!(
                    group = %self.group,
                    error = %err,
                    claimed = watcher.claims().len(),
                    restart_delay = ?delay,
                    "Group watcher failed, restarting"
                );
                launcher.spawn_watcher(watcher, delay);
                Ok(())
            }
        }
    }
}

/// Release every handle on the batch queue held by the supervisor, so the
/// sink finishes once the cancelled workers have stopped.
fn drain_and_close(launcher: Launcher, mut exit_rx: ExitReceiver) {
    drop(launcher);
    exit_rx.close();
    while exit_rx.try_recv().is_ok() {}
}
