mod cli;
mod dispatcher;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logs go to stderr so piped TSV/JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = cli.check_output_flags() {
        err.exit();
    }

    if cli.no_color {
        colored::control::set_override(false);
    }

    dispatcher::dispatch(cli)
}
