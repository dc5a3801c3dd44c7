//! Transaction ledger scraped from the "movimentações" page
//!
//! The page renders one table row per transaction. Rows only carry a date
//! when it changes, mark their kind with CSS classes or coloured badges, and
//! print amounts in Brazilian locale. [`parser`] turns the rows into
//! [`Transaction`] records and [`classifier`] decides each row's
//! [`TransactionType`].

pub mod classifier;
pub mod parser;

use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::session::Session;

pub use classifier::classify;
pub use parser::parse_ledger;

pub const LEDGER_PATH: &str = "/movimentacoes";

/// Kind of movement recorded in the ledger
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionType {
    #[default]
    MoneyApplication,
    IRWithdrawal,
    TransactionFees,
    AdvisoryFee,
    Redemption,
    ExpiredTitle,
}

impl TransactionType {
    /// Canonical display name, also used as the type label in spreadsheets.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::MoneyApplication => "Application",
            TransactionType::IRWithdrawal => "IRWithdrawal",
            TransactionType::TransactionFees => "TransactionFees",
            TransactionType::AdvisoryFee => "AdvisoryFee",
            TransactionType::Redemption => "Redemption",
            TransactionType::ExpiredTitle => "Expired",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Settlement date; advisory-fee rows may have none
    pub effective_date: Option<NaiveDate>,
    /// Request date from the enclosing order header, when there is one
    pub application_date: Option<NaiveDate>,
    pub transaction_type: TransactionType,
    pub investment: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub tax_withheld: Decimal,
    pub net_amount: Decimal,
}

impl Transaction {
    /// Investment label with the cell padding removed
    pub fn label(&self) -> &str {
        self.investment.trim()
    }

    /// Tab-separated spreadsheet cells: date, label, type, quantity, price,
    /// tax and net. A missing date renders as an empty cell.
    pub fn excel(&self) -> String {
        format!(
            "{}\t{}\t{}\t={}\t={}\t={}\t={}",
            date_formula(self.effective_date),
            self.label(),
            self.transaction_type,
            self.quantity,
            self.price,
            self.tax_withheld,
            self.net_amount
        )
    }
}

/// `=DATE(y,m,d)` for a date, empty for none
pub fn date_formula(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("=DATE({},{},{})", d.year(), d.month(), d.day()),
        None => String::new(),
    }
}

/// Fetch and parse the ledger page through an authenticated session.
pub fn fetch_transactions(session: &Session) -> Result<Vec<Transaction>> {
    let html = session.get_text(LEDGER_PATH)?;
    let transactions = parse_ledger(&html)?;
    debug!("Parsed {} ledger rows", transactions.len());
    Ok(transactions)
}
