use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "magnetis")]
#[command(version, about = "Get my data from the Magnetis website")]
#[command(
    long_about = "Signs in to Magnetis and retrieves the equity curve, investment plan, asset list and transaction history, printing them or exporting them to a spreadsheet."
)]
pub struct Cli {
    /// Your user id on the Magnetis API
    #[arg(short = 'U', long = "user-id", env = "MAGNETIS_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Your username on the Magnetis website
    #[arg(short, long, env = "MAGNETIS_USER", global = true)]
    pub username: Option<String>,

    /// Your password on the Magnetis website
    #[arg(
        short,
        long,
        env = "MAGNETIS_PASS",
        hide_env_values = true,
        global = true
    )]
    pub password: Option<String>,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/magnetis/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Reject `--json` together with another stdout format. `--json` is
    /// global, so the check runs after parsing instead of through
    /// `conflicts_with`.
    pub fn check_output_flags(&self) -> Result<(), clap::Error> {
        let output = match &self.command {
            Commands::Curve { output, .. } | Commands::Transactions { output, .. } => *output,
            Commands::Plan | Commands::Assets => return Ok(()),
        };
        if self.json && (output.print || output.excel) {
            let flag = if output.excel { "--excel" } else { "--print" };
            return Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                format!("the argument '--json' cannot be used with '{}'", flag),
            ));
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get your equity curve from the Magnetis API
    #[command(visible_alias = "c")]
    Curve {
        #[command(flatten)]
        output: OutputArgs,

        /// Save the curve to an .xlsx file, with the "Historico" and
        /// "Aplicado" sheets its formulas read
        #[arg(short, long, value_name = "FILE")]
        save: Option<PathBuf>,

        /// Parse a saved equity_curve JSON response instead of signing in
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Saved movimentacoes HTML page used for the ledger sheets of --save
        #[arg(long, value_name = "FILE", requires = "save")]
        ledger: Option<PathBuf>,
    },

    /// Get your investment plan from the Magnetis API
    #[command(visible_alias = "p")]
    Plan,

    /// Get your assets from the Magnetis API
    #[command(visible_alias = "a")]
    Assets,

    /// Get your transaction history from the Magnetis website
    #[command(visible_aliases = ["applications", "ap"])]
    Transactions {
        #[command(flatten)]
        output: OutputArgs,

        /// Save the history as the "Historico" and "Aplicado" sheets of an
        /// .xlsx file
        #[arg(short, long, value_name = "FILE")]
        save: Option<PathBuf>,

        /// Parse a saved movimentacoes HTML page instead of signing in
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
}

#[derive(Args, Clone, Copy, Default)]
pub struct OutputArgs {
    /// Print on the console as a table (default when no other output is chosen)
    #[arg(long, conflicts_with = "excel")]
    pub print: bool,

    /// Print on the console as tab separated Excel formatted values
    #[arg(short, long)]
    pub excel: bool,
}
