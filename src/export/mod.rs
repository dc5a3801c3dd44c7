//! Spreadsheet export
//!
//! Builds the sheets of the tracking workbook: `Rendimento` (equity curve
//! with derived return formulas), `Historico` (the ledger) and `Aplicado`
//! (dated application amounts). The equity formulas aggregate `Historico`
//! and `Aplicado` and compare each row against the one above it, so every
//! grid keeps its input order. Cross-sheet ranges are bounded by the number
//! of rows actually written.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Datelike;
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::equity::EquityPoint;
use crate::ledger::{date_formula, Transaction, TransactionType};

/// First data row (1-based); row 1 holds the headers.
pub const FIRST_ROW: usize = 2;

pub const EQUITY_SHEET: &str = "Rendimento";
pub const TRANSACTIONS_SHEET: &str = "Historico";
pub const APPLICATIONS_SHEET: &str = "Aplicado";

pub const EQUITY_HEADERS: [&str; 11] = [
    "Data",
    "Saldo Atual",
    "Total Aplicado",
    "Retorno",
    "Retorno dia",
    "Retorno dia %",
    "Retorno desde início",
    "R$/R$ investido",
    "Mês",
    "Ano",
    "Total Aplicado",
];

pub const TRANSACTION_HEADERS: [&str; 8] = [
    "Data aplicação",
    "Data efetivação",
    "Tipo da transação",
    "Investimento",
    "Quantidade",
    "Preço (R$)",
    "IR (R$)",
    "Total Líquido (R$)",
];

pub const APPLICATION_HEADERS: [&str; 2] = ["Data", "Valor aplicado"];

/// One spreadsheet cell. Formulas keep their leading `=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Formula(String),
}

impl Cell {
    fn formula(text: String) -> Self {
        if text.is_empty() {
            Cell::Text(text)
        } else {
            Cell::Formula(text)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Cell::Text(s) | Cell::Formula(s) => s,
        }
    }
}

/// Rows destined for one sheet, header row included
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub sheet: &'static str,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetGrid {
    fn new(sheet: &'static str, headers: &[&str]) -> Self {
        Self {
            sheet,
            rows: vec![headers.iter().map(|h| Cell::Text(h.to_string())).collect()],
        }
    }

    /// A1 range covering the grid, e.g. `Historico!A1:H10`
    pub fn range(&self) -> String {
        let width = self.rows.first().map_or(1, Vec::len);
        format!(
            "{}!A1:{}{}",
            self.sheet,
            column_letter(width.saturating_sub(1)),
            self.rows.len()
        )
    }
}

/// Workbook for `curve --save`: the equity sheet plus the two sheets its
/// formulas read.
pub fn curve_workbook(points: &[EquityPoint], transactions: &[Transaction]) -> Vec<SheetGrid> {
    vec![
        equity_sheet(points, transactions),
        transactions_sheet(transactions),
        applications_sheet(transactions),
    ]
}

/// Workbook for `transactions --save`.
pub fn ledger_workbook(transactions: &[Transaction]) -> Vec<SheetGrid> {
    vec![
        transactions_sheet(transactions),
        applications_sheet(transactions),
    ]
}

/// Equity curve sheet with its derived return formulas.
///
/// `transactions` must be the ledger written alongside it: the `Historico`
/// and `Aplicado` ranges end at the last row those sheets will hold.
pub fn equity_sheet(points: &[EquityPoint], transactions: &[Transaction]) -> SheetGrid {
    let historico_end = last_row(transactions.len());
    let aplicado_end = last_row(applications(transactions).count());

    let mut grid = SheetGrid::new(EQUITY_SHEET, &EQUITY_HEADERS);
    for (i, point) in points.iter().enumerate() {
        let row = FIRST_ROW + i;
        let ts = point.timestamp;
        let net_flow = format!(
            "={}-{}-{}+{}+{}",
            sum_by_type(row, historico_end, TransactionType::MoneyApplication),
            sum_by_type(row, historico_end, TransactionType::Redemption),
            sum_by_type(row, historico_end, TransactionType::ExpiredTitle),
            sum_by_type(row, historico_end, TransactionType::AdvisoryFee),
            sum_by_type(row, historico_end, TransactionType::TransactionFees),
        );
        grid.rows.push(vec![
            Cell::Formula(format!("=DATE({},{},{})", ts.year(), ts.month(), ts.day())),
            Cell::Formula(format!("={}", point.value)),
            Cell::Formula(format!(
                "=SUMIF({sheet}!$A${first}:$A${end},\"<=\"&A{row},{sheet}!$B${first}:$B${end})",
                sheet = APPLICATIONS_SHEET,
                first = FIRST_ROW,
                end = aplicado_end,
                row = row
            )),
            Cell::Formula(format!("=B{row}-C{row}")),
            Cell::Formula(format!("=D{}-{}", row, previous_return(row))),
            Cell::Formula(format!("=E{row}/B{row}")),
            Cell::Formula(format!("=SUM($F${}:F{})", FIRST_ROW, row)),
            Cell::Formula(format!("=D{row}/C{row}")),
            Cell::Formula(format!("={}", ts.month())),
            Cell::Formula(format!("={}", ts.year())),
            Cell::Formula(net_flow),
        ]);
    }
    grid
}

/// Ledger sheet, one row per transaction in ledger order.
pub fn transactions_sheet(transactions: &[Transaction]) -> SheetGrid {
    let mut grid = SheetGrid::new(TRANSACTIONS_SHEET, &TRANSACTION_HEADERS);
    for tx in transactions {
        grid.rows.push(vec![
            Cell::formula(date_formula(tx.application_date)),
            Cell::formula(date_formula(tx.effective_date)),
            Cell::Text(tx.transaction_type.as_str().to_string()),
            Cell::Text(tx.label().to_string()),
            Cell::Formula(format!("={}", tx.quantity)),
            Cell::Formula(format!("={}", tx.price)),
            Cell::Formula(format!("={}", tx.tax_withheld)),
            Cell::Formula(format!("={}", tx.net_amount)),
        ]);
    }
    grid
}

/// Dated money applications: effective date and net amount of every
/// settled `Application` row, in ledger order.
pub fn applications_sheet(transactions: &[Transaction]) -> SheetGrid {
    let mut grid = SheetGrid::new(APPLICATIONS_SHEET, &APPLICATION_HEADERS);
    for tx in applications(transactions) {
        grid.rows.push(vec![
            Cell::formula(date_formula(tx.effective_date)),
            Cell::Formula(format!("={}", tx.net_amount)),
        ]);
    }
    grid
}

fn applications(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(|tx| {
        tx.transaction_type == TransactionType::MoneyApplication && tx.effective_date.is_some()
    })
}

/// Last data row of a sheet holding `count` records. An empty sheet still
/// gets a one-row range so formulas stay well-formed.
fn last_row(count: usize) -> usize {
    FIRST_ROW + count.max(1) - 1
}

/// Write the grids to an `.xlsx` workbook, one worksheet per grid.
pub fn write_workbook(path: &Path, grids: &[SheetGrid]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for grid in grids {
        let worksheet = workbook
            .add_worksheet()
            .set_name(grid.sheet)
            .with_context(|| format!("invalid sheet name {}", grid.sheet))?;

        for (r, cells) in grid.rows.iter().enumerate() {
            let row = u32::try_from(r).context("too many rows for a worksheet")?;
            for (c, cell) in cells.iter().enumerate() {
                let col = u16::try_from(c).context("too many columns for a worksheet")?;
                match cell {
                    Cell::Text(text) if r == 0 => {
                        worksheet.write_string_with_format(row, col, text, &header)?;
                    }
                    Cell::Text(text) => {
                        worksheet.write_string(row, col, text)?;
                    }
                    Cell::Formula(formula) => {
                        worksheet.write_formula(row, col, formula.as_str())?;
                    }
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed to save workbook {}", path.display()))?;
    info!("Wrote {} sheet(s) to {}", grids.len(), path.display());
    Ok(())
}

fn sum_by_type(row: usize, end: usize, kind: TransactionType) -> String {
    format!(
        "SUMIFS({sheet}!$H${first}:$H${end},{sheet}!$A${first}:$A${end},\"<=\"&$A{row},{sheet}!$C${first}:$C${end},\"={kind}\")",
        sheet = TRANSACTIONS_SHEET,
        first = FIRST_ROW,
        end = end,
        row = row,
        kind = kind
    )
}

fn previous_return(row: usize) -> String {
    if row == FIRST_ROW {
        "0".to_string()
    } else {
        format!("D{}", row - 1)
    }
}

/// Zero-based column index to its letter name (0 → A, 25 → Z, 26 → AA).
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}
