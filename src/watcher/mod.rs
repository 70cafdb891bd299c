pub mod claims;
pub mod group;

pub use claims::ClaimedStreams;
pub use group::{is_recent, DiscoverySettings, GroupWatcher, TailerLauncher, WatcherError};
