pub mod tailer;

pub use tailer::{FetchOutcome, StreamTailer, TailSettings, TailerError};
