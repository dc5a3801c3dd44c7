//! Output formatting module for CLI display
//!
//! Keeps presentation (tables, TSV lines, JSON) apart from the scraping and
//! parsing done by the library.

use colored::Colorize;
use magnetis::equity::EquityCurve;
use magnetis::ledger::{Transaction, TransactionType};
use magnetis::portfolio::{Asset, InvestmentPlan};
use magnetis::utils::{format_currency, format_decimal_br};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

/// Pretty JSON for any record the CLI prints
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

pub fn format_curve_excel(curve: &EquityCurve) -> String {
    curve
        .points()
        .iter()
        .map(|p| format!("{}\n", p.excel()))
        .collect()
}

pub fn format_transactions_excel(transactions: &[Transaction]) -> String {
    transactions
        .iter()
        .map(|tx| format!("{}\n", tx.excel()))
        .collect()
}

pub fn format_curve_table(curve: &EquityCurve) -> String {
    if curve.is_empty() {
        return format_empty("No equity points returned");
    }

    #[derive(Tabled)]
    struct EquityRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Balance")]
        value: String,
    }

    let rows: Vec<EquityRow> = curve
        .points()
        .iter()
        .map(|p| EquityRow {
            date: p.timestamp.format("%d/%m/%Y").to_string(),
            value: p.value.clone(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());

    format!(
        "\n{} Equity curve ({} points)\n\n{}\n",
        "📈".cyan().bold(),
        curve.len(),
        table
    )
}

pub fn format_transactions_table(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return format_empty("No transactions found");
    }

    #[derive(Tabled)]
    struct TransactionRow {
        #[tabled(rename = "Requested")]
        application_date: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Type")]
        kind: String,
        #[tabled(rename = "Investment")]
        investment: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Price")]
        price: String,
        #[tabled(rename = "IR")]
        tax: String,
        #[tabled(rename = "Net")]
        net: String,
    }

    let rows: Vec<TransactionRow> = transactions
        .iter()
        .map(|tx| TransactionRow {
            application_date: tx
                .application_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
            date: tx
                .effective_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "-".to_string()),
            kind: colorize_type(tx.transaction_type),
            investment: tx.label().to_string(),
            quantity: format_decimal_br(tx.quantity),
            price: format_currency(tx.price),
            tax: format_currency(tx.tax_withheld),
            net: colorize_amount(tx.net_amount),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(4..), Alignment::right());

    format!(
        "\n{} Transaction history ({} rows)\n\n{}\n",
        "📒".cyan().bold(),
        transactions.len(),
        table
    )
}

pub fn format_plan(plan: &InvestmentPlan) -> String {
    let money = |v: Option<Decimal>| v.map(format_currency).unwrap_or_else(|| "N/A".to_string());
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
    let number = |v: Option<String>| v.unwrap_or_else(|| "N/A".to_string());

    let mut output = format!("\n{} Investment plan\n", "🎯".cyan().bold());
    let lines = [
        ("Goal:", text(&plan.goal)),
        ("Goal value:", money(plan.goal_value)),
        ("Initial investment:", money(plan.initial_investment)),
        ("Monthly investment:", money(plan.monthly_investment)),
        ("Period (years):", number(plan.period_in_years.map(|v| v.to_string()))),
        ("Age:", number(plan.age.map(|v| v.to_string()))),
        ("Risk level:", number(plan.risk_level.map(|v| v.to_string()))),
        ("Risk profile:", text(&plan.risk_profile)),
        ("Experience:", text(&plan.experience)),
        ("Loss tolerance:", text(&plan.loss_tolerance)),
    ];
    for (label, value) in lines {
        output.push_str(&format!("\n{:<22} {}", label.bold(), value));
    }
    output.push('\n');
    output
}

pub fn format_assets_table(assets: &[Asset]) -> String {
    if assets.is_empty() {
        return format_empty("No assets found");
    }

    #[derive(Tabled)]
    struct AssetRow {
        #[tabled(rename = "Id")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Type")]
        instrument: String,
        #[tabled(rename = "Issuer")]
        issuer: String,
        #[tabled(rename = "Maturity")]
        maturity: String,
        #[tabled(rename = "Yield")]
        yield_rate: String,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Return")]
        asset_return: String,
    }

    let rows: Vec<AssetRow> = assets
        .iter()
        .map(|a| AssetRow {
            id: a.asset_id,
            name: a.name.clone(),
            instrument: a.instrument_type_name.clone().unwrap_or_default(),
            issuer: a.issuer.clone().unwrap_or_default(),
            maturity: a.maturity_date.clone().unwrap_or_default(),
            yield_rate: a.yield_rate.clone().unwrap_or_default(),
            amount: a.amount.clone().unwrap_or_default(),
            asset_return: a.asset_return.clone().unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(6..), Alignment::right());

    format!("\n{} Assets\n\n{}\n", "💼".cyan().bold(), table)
}

fn format_empty(message: &str) -> String {
    format!("{} {}\n", "ℹ".blue().bold(), message)
}

fn colorize_type(kind: TransactionType) -> String {
    match kind {
        TransactionType::MoneyApplication => kind.as_str().green().to_string(),
        TransactionType::Redemption | TransactionType::ExpiredTitle => {
            kind.as_str().yellow().to_string()
        }
        TransactionType::IRWithdrawal
        | TransactionType::TransactionFees
        | TransactionType::AdvisoryFee => kind.as_str().red().to_string(),
    }
}

fn colorize_amount(value: Decimal) -> String {
    let text = format_currency(value);
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample() -> Transaction {
        Transaction {
            effective_date: NaiveDate::from_ymd_opt(2018, 4, 2),
            application_date: None,
            transaction_type: TransactionType::MoneyApplication,
            investment: " LCA Banco Y ".to_string(),
            quantity: dec!(2),
            price: dec!(1000),
            tax_withheld: dec!(0),
            net_amount: dec!(2000),
        }
    }

    #[test]
    fn test_empty_transactions_message() {
        colored::control::set_override(false);
        assert_eq!(format_transactions_table(&[]), "ℹ No transactions found\n");
    }

    #[test]
    fn test_transactions_table_shows_trimmed_label_and_brl_amounts() {
        colored::control::set_override(false);
        let table = format_transactions_table(&[sample()]);
        assert!(table.contains("LCA Banco Y"));
        assert!(table.contains("R$ 2.000,00"));
        assert!(table.contains("02/04/2018"));
    }

    #[test]
    fn test_excel_lines_end_with_newline() {
        let out = format_transactions_excel(&[sample(), sample()]);
        assert_eq!(out.lines().count(), 2);
        assert!(out.starts_with("=DATE(2018,4,2)\tLCA Banco Y\tApplication"));
    }

    #[test]
    fn test_json_serializes_decimals_as_strings() {
        let json = format_json(&[sample()]);
        assert!(json.contains("\"net_amount\": \"2000\""));
        assert!(json.contains("\"effective_date\": \"2018-04-02\""));
    }
}
