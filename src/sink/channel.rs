use crate::sink::batch::OutputBatch;
use tokio::sync::mpsc;

pub type BatchSender = mpsc::Sender<OutputBatch>;
pub type BatchReceiver = mpsc::Receiver<OutputBatch>;

/// Create the bounded batch queue. Tailers wait for room when it is full.
pub fn create_channel(capacity: usize) -> (BatchSender, BatchReceiver) {
    mpsc::channel(capacity)
}
