use crate::sink::channel::BatchReceiver;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write to console: {0}")]
    Io(#[from] io::Error),

    #[error("console writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Single consumer of the batch queue.
///
/// Batches are written in arrival order, each one with a single write so that
/// lines from different streams never interleave. Writes run on the blocking
/// pool, so a stalled console never holds up a runtime worker.
#[derive(Debug)]
pub struct OutputSink<W> {
    writer: W,
    batches_written: u64,
    batches_dropped: u64,
}

impl OutputSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + 'static> OutputSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            batches_written: 0,
            batches_dropped: 0,
        }
    }

    /// Drain `input` until every sender is gone, then hand the writer back.
    pub async fn run(mut self, mut input: BatchReceiver) -> Result<W, SinkError> {
        debug!("Output sink started");

        while let Some(batch) = input.recv().await {
            if batch.is_empty() {
                self.batches_dropped += 1;
                trace!(stream = %batch.stream, "Dropping empty batch");
                continue;
            }

            let rendered = batch.render();
            let mut writer = self.writer;
            self.writer = tokio::task::spawn_blocking(move || {
                writer.write_all(rendered.as_bytes())?;
                writer.flush()?;
                Ok::<_, io::Error>(writer)
            })
            .await??;
            self.batches_written += 1;
            trace!(
                stream = %batch.stream,
                event_count = batch.events.len(),
                "Wrote batch"
            );
        }

        debug!(
            batches_written = self.batches_written,
            batches_dropped = self.batches_dropped,
            "Output sink stopped, all producers closed"
        );
        Ok(self.writer)
    }
}
