//! Ledger table parsing
//!
//! Walks `section.transactions table tbody tr` in document order. Rows keep
//! the order the page renders them in (newest first); nothing is re-sorted,
//! since spreadsheet formulas downstream refer to neighbouring rows.

use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use super::classifier::{classify, is_advisory_fee};
use super::Transaction;
use crate::error::ParseError;
use crate::utils::parse_locale_number;

const DATE_FORMAT: &str = "%Y-%m-%d";

static ROWS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("section.transactions table tbody tr").expect("valid rows selector")
});
static TIME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("time").expect("valid time selector"));
static ORDER_HEADER_TIME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("header time").expect("valid header time selector"));
static ADVISORY_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td:nth-child(1) span").expect("valid advisory selector"));
static CELLS: LazyLock<[Selector; 5]> = LazyLock::new(|| {
    [2, 3, 4, 5, 6].map(|n| {
        Selector::parse(&format!("td:nth-child({})", n)).expect("valid cell selector")
    })
});

const ORDER_HEADER_CLASS: &str = "user-order__header";

/// Parse every transaction row of the ledger page.
///
/// Rows without a `<time datetime>` inherit the effective date of the
/// previous transaction, except advisory-fee rows which stay undated. A
/// dateless first row cannot inherit anything and fails with
/// [`ParseError::MissingPredecessor`].
pub fn parse_ledger(html: &str) -> Result<Vec<Transaction>, ParseError> {
    let document = Html::parse_document(html);
    let mut transactions: Vec<Transaction> = Vec::new();

    for (index, row) in document.select(&ROWS).enumerate() {
        let transaction = parse_row(index, &row, transactions.last())?;
        trace!(
            "row {}: {} {:?}",
            index,
            transaction.transaction_type,
            transaction.effective_date
        );
        transactions.push(transaction);
    }

    Ok(transactions)
}

fn parse_row(
    index: usize,
    row: &ElementRef,
    previous: Option<&Transaction>,
) -> Result<Transaction, ParseError> {
    let [label, quantity, price, tax, net] = &*CELLS;
    let advisory = is_advisory_fee(row);

    let effective_date = match row
        .select(&TIME)
        .next()
        .and_then(|time| time.value().attr("datetime"))
    {
        Some(value) => Some(parse_date(value).ok_or_else(|| ParseError::InvalidDate {
            row: index,
            value: value.to_string(),
        })?),
        None if advisory => None,
        None => previous
            .ok_or(ParseError::MissingPredecessor { row: index })?
            .effective_date,
    };

    let application_date = match order_header_date(row) {
        Some(value) => Some(parse_date(value).ok_or_else(|| {
            ParseError::InvalidApplicationDate {
                row: index,
                value: value.to_string(),
            }
        })?),
        None => None,
    };

    let investment = if advisory {
        row.select(&ADVISORY_LABEL)
            .flat_map(|span| span.text())
            .collect::<String>()
    } else {
        cell_text(row, label)
    };

    Ok(Transaction {
        effective_date,
        application_date,
        transaction_type: classify(row),
        investment,
        quantity: parse_locale_number(&cell_text(row, quantity)),
        price: parse_locale_number(&cell_text(row, price)),
        tax_withheld: parse_locale_number(&cell_text(row, tax)),
        net_amount: parse_locale_number(&cell_text(row, net)),
    })
}

fn cell_text(row: &ElementRef, selector: &Selector) -> String {
    row.select(selector)
        .next()
        .map(|cell| cell.text().collect())
        .unwrap_or_default()
}

/// `datetime` of the order header enclosing the row, if any.
fn order_header_date<'a>(row: &ElementRef<'a>) -> Option<&'a str> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == "div" && el.value().classes().any(|c| c == ORDER_HEADER_CLASS)
        })?
        .select(&ORDER_HEADER_TIME)
        .next()
        .and_then(|time| time.value().attr("datetime"))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}
