pub mod cli;
pub mod config;
pub mod provider;
pub mod sink;
pub mod supervisor;
pub mod tail;
pub mod watcher;
