use clap::CommandFactory;
use cloudtail::cli::{is_info_request, Cli, Commands, INFO_EXIT_CODE};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr so they never mix with tailed output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudtail=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = match Cli::try_parse_normalized() {
        Ok(cli) => cli,
        Err(e) if is_info_request(&e) => {
            let _ = e.print();
            return ExitCode::from(INFO_EXIT_CODE);
        }
        Err(e) => e.exit(),
    };

    if let Some(Commands::Version) = cli.command {
        println!("cloudtail version v{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::from(INFO_EXIT_CODE);
    }

    let result = match cli.into_options() {
        Ok(options) => cloudtail::cli::run(options).await,
        Err(e) => {
            eprintln!("{}", Cli::command().render_help());
            Err(e)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
