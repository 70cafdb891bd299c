pub mod args;
pub mod run;

pub use args::{is_info_request, normalize_args, Cli, Commands, RunOptions, INFO_EXIT_CODE};
pub use run::{run, RunError};
