use crate::cli::run::RunError;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Long options that may also be spelled with a single dash, Go style
/// (`-log=my-group`, `-stream my-stream`).
const SINGLE_DASH_LONGS: &[&str] = &["log", "stream", "config", "region", "profile", "help"];

/// Exit code of the version and help paths: not an error, but not a tailing
/// session either.
pub const INFO_EXIT_CODE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "cloudtail")]
#[command(about = "Follow CloudWatch Logs streams like tail -f", long_about = None)]
pub struct Cli {
    /// Log group to tail
    #[arg(long = "log", value_name = "GROUP")]
    pub log: Option<String>,

    /// Tail only this stream; every recently active stream of the group otherwise
    #[arg(long, value_name = "STREAM")]
    pub stream: Option<String>,

    /// YAML config file with tuning options
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// AWS region, overrides the config file and SDK defaults
    #[arg(long)]
    pub region: Option<String>,

    /// Named AWS profile, overrides the config file
    #[arg(long)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Print the version and exit
    Version,
}

/// Validated inputs for a tailing session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub group: String,
    pub stream: Option<String>,
    pub config_path: Option<PathBuf>,
    pub region: Option<String>,
    pub profile: Option<String>,
}

impl Cli {
    /// Parse process arguments, accepting single-dash long options.
    ///
    /// Help output comes back as an error of kind `DisplayHelp`; see
    /// [`is_info_request`].
    pub fn try_parse_normalized() -> Result<Self, clap::Error> {
        Self::try_parse_from(normalize_args(std::env::args_os()))
    }

    /// Empty values count as absent, like the unset flag.
    pub fn into_options(self) -> Result<RunOptions, RunError> {
        let group = self
            .log
            .filter(|g| !g.is_empty())
            .ok_or(RunError::MissingGroup)?;

        Ok(RunOptions {
            group,
            stream: self.stream.filter(|s| !s.is_empty()),
            config_path: self.config,
            region: self.region,
            profile: self.profile,
        })
    }
}

/// Whether a parse error is really a request for help or version text.
pub fn is_info_request(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

/// Rewrite `-name` / `-name=value` into `--name` / `--name=value` for the
/// known long options. Everything after a bare `--` is left alone.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 || passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or(rest);
                    if SINGLE_DASH_LONGS.contains(&name) {
                        OsString::from(format!("-{text}"))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}
