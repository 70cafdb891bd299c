pub mod batch;
pub mod channel;
pub mod console;

pub use batch::OutputBatch;
pub use channel::{create_channel, BatchReceiver, BatchSender};
pub use console::{OutputSink, SinkError};
