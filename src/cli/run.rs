use crate::cli::args::RunOptions;
use crate::config::{load_or_default, ConfigError};
use crate::provider::CloudWatchProvider;
use crate::sink::OutputSink;
use crate::supervisor::{SuperviseError, Supervisor, Target};
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("must pass a log group, -log=xxx")]
    MissingGroup,

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Supervise(#[from] SuperviseError),
}

/// Tail the requested group or stream until Ctrl+C or a fatal worker error.
pub async fn run(options: RunOptions) -> Result<(), RunError> {
    let mut config = load_or_default(options.config_path.as_deref())?;
    if options.region.is_some() {
        config.aws.region = options.region;
    }
    if options.profile.is_some() {
        config.aws.profile = options.profile;
    }

    let provider = Arc::new(CloudWatchProvider::from_config(&config.aws).await);

    let target = match options.stream {
        Some(stream) => Target::Stream(stream),
        None => Target::Group,
    };

    info!(group = %options.group, target = ?target, "Starting cloudtail");
    Supervisor::new(options.group, provider, config)
        .run(target, OutputSink::stdout(), ctrl_c())
        .await?;

    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        // Without a signal handler the process runs until killed
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
