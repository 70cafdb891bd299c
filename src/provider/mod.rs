pub mod cloudwatch;
pub mod traits;

pub use cloudwatch::CloudWatchProvider;
pub use traits::{
    ContinuationToken, EventPage, LogEvent, LogProvider, ProviderError, StreamSummary,
};
