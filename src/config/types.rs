use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for the tailing engine. Every section is optional in the
/// YAML file; missing values fall back to the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub aws: AwsConfig,
    pub tail: TailConfig,
    pub discovery: DiscoveryConfig,
    pub output: OutputConfig,
    pub supervision: SupervisionConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AwsConfig {
    /// Overrides the region resolved by the SDK default chain
    pub region: Option<String>,
    /// Named profile from the shared AWS config files
    pub profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TailConfig {
    /// Maximum events requested per fetch
    pub fetch_limit: usize,
    /// Pause after a fetch that returned the token it was given
    #[serde(with = "humantime_serde")]
    pub idle_backoff: Duration,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            fetch_limit: 10,
            idle_backoff: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Streams whose last event is older than this are not tailed
    #[serde(with = "humantime_serde")]
    pub activity_window: Duration,
    /// Upper bound on concurrently running tailers; unbounded when absent
    pub max_tailers: Option<usize>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            activity_window: Duration::from_secs(24 * 60 * 60),
            max_tailers: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Capacity of the batch queue feeding the console; producers wait when full
    pub queue_capacity: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupervisionConfig {
    pub on_error: ErrorPolicy,
    #[serde(with = "humantime_serde")]
    pub restart_delay: Duration,
}

impl Default for SupervisionConfig {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::Exit,
            restart_delay: Duration::from_secs(5),
        }
    }
}

/// What the supervisor does when a tailer or the watcher fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop every worker and exit with the error
    #[default]
    Exit,
    /// Log the error and relaunch the failed worker
    Restart,
}
