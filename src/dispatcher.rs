//! Command dispatcher
//!
//! Each command runs the pipeline sequentially: sign in, fetch, parse, then
//! print or export. Every failure is returned to `main`, nothing is retried.

use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::info;

use magnetis::config::{Credentials, FileConfig};
use magnetis::equity::{self, EquityCurve};
use magnetis::export;
use magnetis::ledger::{self, Transaction};
use magnetis::portfolio;
use magnetis::session::{Session, DEFAULT_HOST};

use crate::cli::formatters;
use crate::cli::{Cli, Commands, OutputArgs};

pub fn dispatch(cli: Cli) -> Result<()> {
    let file = FileConfig::load(cli.config.as_deref())?;
    let ctx = RunContext {
        cli_user_id: cli.user_id,
        cli_username: cli.username,
        cli_password: cli.password,
        file,
        json: cli.json,
    };

    match cli.command {
        Commands::Curve {
            output,
            save,
            input,
            ledger: ledger_page,
        } => {
            let (curve, session) = match input {
                Some(path) => {
                    let body = read_input(&path)?;
                    let curve = equity::parse_equity_curve(&body)
                        .with_context(|| format!("failed to parse {}", path.display()))?;
                    (curve, None)
                }
                None => {
                    let (session, creds) = ctx.sign_in()?;
                    let curve = equity::fetch_equity_curve(&session, &creds.user_id)
                        .context("Error retrieving equity curve")?;
                    (curve, Some(session))
                }
            };
            print_curve(&curve, output, ctx.json);
            if let Some(path) = save {
                let transactions = match (ledger_page, session) {
                    (Some(page), _) => load_ledger(&page)?,
                    (None, Some(session)) => ledger::fetch_transactions(&session)
                        .context("Error retrieving transaction history")?,
                    (None, None) => bail!(
                        "--save with --input also needs --ledger <FILE>, the saved movimentacoes page the workbook formulas read"
                    ),
                };
                export::write_workbook(&path, &export::curve_workbook(curve.points(), &transactions))?;
                print_saved(&path);
            }
            Ok(())
        }

        Commands::Plan => {
            let (session, creds) = ctx.sign_in()?;
            let plan = portfolio::fetch_investment_plan(&session, &creds.user_id)
                .context("Error retrieving investment plan")?;
            if ctx.json {
                println!("{}", formatters::format_json(&plan));
            } else {
                print!("{}", formatters::format_plan(&plan));
            }
            Ok(())
        }

        Commands::Assets => {
            let (session, creds) = ctx.sign_in()?;
            let assets = portfolio::fetch_assets(&session, &creds.user_id)
                .context("Error retrieving assets")?;
            if ctx.json {
                println!("{}", formatters::format_json(&assets));
            } else {
                print!("{}", formatters::format_assets_table(&assets));
            }
            Ok(())
        }

        Commands::Transactions {
            output,
            save,
            input,
        } => {
            let transactions = match input {
                Some(path) => load_ledger(&path)?,
                None => {
                    let (session, _) = ctx.sign_in()?;
                    ledger::fetch_transactions(&session)
                        .context("Error retrieving transaction history")?
                }
            };
            print_transactions(&transactions, output, ctx.json);
            if let Some(path) = save {
                export::write_workbook(&path, &export::ledger_workbook(&transactions))?;
                print_saved(&path);
            }
            Ok(())
        }
    }
}

struct RunContext {
    cli_user_id: Option<String>,
    cli_username: Option<String>,
    cli_password: Option<String>,
    file: FileConfig,
    json: bool,
}

impl RunContext {
    fn sign_in(&self) -> Result<(Session, Credentials)> {
        let creds = Credentials::resolve(
            self.cli_user_id.clone(),
            self.cli_username.clone(),
            self.cli_password.clone(),
            &self.file,
        )?;
        let session = Session::authenticate(
            &self.file.session_config(DEFAULT_HOST),
            &creds.username,
            &creds.password,
        )
        .context("Sign in failed")?;
        info!("Signed in as {}", creds.username);
        Ok((session, creds))
    }
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_ledger(path: &Path) -> Result<Vec<Transaction>> {
    let html = read_input(path)?;
    ledger::parse_ledger(&html).with_context(|| format!("failed to parse {}", path.display()))
}

/// `--print` is implied when neither `--excel` nor `--json` was given. The
/// flags are mutually exclusive, see `Cli::check_output_flags`.
fn wants_table(output: OutputArgs, json: bool) -> bool {
    output.print || (!output.excel && !json)
}

fn print_curve(curve: &EquityCurve, output: OutputArgs, json: bool) {
    if json {
        println!("{}", formatters::format_json(curve));
    }
    if wants_table(output, json) {
        print!("{}", formatters::format_curve_table(curve));
    }
    if output.excel {
        print!("{}", formatters::format_curve_excel(curve));
    }
}

fn print_transactions(transactions: &[Transaction], output: OutputArgs, json: bool) {
    if json {
        println!("{}", formatters::format_json(transactions));
    }
    if wants_table(output, json) {
        print!("{}", formatters::format_transactions_table(transactions));
    }
    if output.excel {
        print!("{}", formatters::format_transactions_excel(transactions));
    }
}

fn print_saved(path: &Path) {
    eprintln!("{} Saved {}", "✓".green().bold(), path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_default_output() {
        assert!(wants_table(OutputArgs::default(), false));
        assert!(!wants_table(OutputArgs::default(), true));
        let excel = OutputArgs {
            print: false,
            excel: true,
        };
        assert!(!wants_table(excel, false));
        let print = OutputArgs {
            print: true,
            excel: false,
        };
        assert!(wants_table(print, false));
    }
}
