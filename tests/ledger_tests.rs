//! Parsing tests against saved page snapshots
//!
//! - movimentacoes.html: order sections with header dates, badge rows,
//!   fee rows, advisory fee and placeholder cells
//! - equity_curve.json: unsorted curve with a duplicated timestamp

use chrono::{NaiveDate, TimeZone, Utc};
use magnetis::equity::parse_equity_curve;
use magnetis::export::{
    applications_sheet, curve_workbook, equity_sheet, transactions_sheet, write_workbook, FIRST_ROW,
};
use magnetis::ledger::{parse_ledger, Transaction, TransactionType};
use rust_decimal_macros::dec;

const LEDGER: &str = include_str!("fixtures/movimentacoes.html");
const CURVE: &str = include_str!("fixtures/equity_curve.json");

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn ledger() -> Vec<Transaction> {
    parse_ledger(LEDGER).expect("fixture should parse")
}

#[test]
fn test_ledger_keeps_every_row_in_page_order() {
    let txs = ledger();
    let kinds: Vec<TransactionType> = txs.iter().map(|t| t.transaction_type).collect();
    assert_eq!(
        kinds,
        [
            TransactionType::Redemption,
            TransactionType::IRWithdrawal,
            TransactionType::MoneyApplication,
            TransactionType::TransactionFees,
            TransactionType::AdvisoryFee,
            TransactionType::ExpiredTitle,
            TransactionType::MoneyApplication,
        ]
    );
}

#[test]
fn test_ledger_dates_are_explicit_or_inherited() {
    let txs = ledger();
    let dates: Vec<Option<NaiveDate>> = txs.iter().map(|t| t.effective_date).collect();
    assert_eq!(
        dates,
        [
            date(2018, 5, 4),
            date(2018, 5, 4),
            date(2018, 4, 11),
            date(2018, 4, 11),
            None,
            date(2018, 3, 1),
            date(2018, 2, 15),
        ]
    );
}

#[test]
fn test_ledger_application_dates_come_from_order_headers() {
    let txs = ledger();
    assert_eq!(txs[0].application_date, date(2018, 5, 2));
    assert_eq!(txs[1].application_date, date(2018, 5, 2));
    assert_eq!(txs[2].application_date, date(2018, 4, 10));
    assert_eq!(txs[3].application_date, date(2018, 4, 10));
    assert_eq!(txs[4].application_date, None);
    assert_eq!(txs[6].application_date, None);
}

#[test]
fn test_ledger_amounts_use_brazilian_locale() {
    let txs = ledger();
    let redemption = &txs[0];
    assert_eq!(redemption.label(), "Tesouro Selic 2023");
    assert_eq!(redemption.quantity, dec!(0.15));
    assert_eq!(redemption.price, dec!(9512.33));
    assert_eq!(redemption.net_amount, dec!(-1426.85));

    let ir = &txs[1];
    assert_eq!(ir.quantity, dec!(0));
    assert_eq!(ir.tax_withheld, dec!(12.40));

    let fund = &txs[6];
    assert_eq!(fund.quantity, dec!(1234.567890));
    assert_eq!(fund.tax_withheld, dec!(0));
    assert_eq!(fund.net_amount, dec!(2000));
}

#[test]
fn test_advisory_fee_uses_label_from_first_cell() {
    let txs = ledger();
    assert_eq!(txs[4].investment, "Taxa de consultoria");
    assert_eq!(txs[4].net_amount, dec!(-8.33));
}

#[test]
fn test_historico_sheet_matches_ledger_rows() {
    let txs = ledger();
    let grid = transactions_sheet(&txs);
    assert_eq!(grid.range(), format!("Historico!A1:H{}", txs.len() + 1));
    assert_eq!(grid.rows[FIRST_ROW - 1][2].as_str(), "Redemption");
    assert_eq!(grid.rows[FIRST_ROW - 1 + 4][1].as_str(), "");
    assert_eq!(grid.rows[FIRST_ROW - 1 + 5][2].as_str(), "Expired");
}

#[test]
fn test_equity_fixture_is_sorted_and_complete() {
    let curve = parse_equity_curve(CURVE).unwrap();
    assert_eq!(curve.len(), 4);
    let values: Vec<&str> = curve.points().iter().map(|p| p.value.as_str()).collect();
    assert_eq!(values, ["10000.00", "10234.77", "10520.33", "10520.34"]);
    assert_eq!(
        curve.points()[0].timestamp,
        Utc.with_ymd_and_hms(2018, 2, 1, 0, 0, 0).unwrap()
    );
}

#[test]
fn test_rendimento_sheet_covers_every_point() {
    let curve = parse_equity_curve(CURVE).unwrap();
    let grid = equity_sheet(curve.points(), &ledger());
    assert_eq!(grid.range(), "Rendimento!A1:K5");
    assert_eq!(grid.rows[1][1].as_str(), "=10000.00");
    assert_eq!(grid.rows[4][4].as_str(), "=D5-D4");
    assert!(grid.rows[1][2].as_str().contains("Aplicado!$B$2:$B$3"));
    assert!(grid.rows[1][10].as_str().contains("Historico!$H$2:$H$8"));
}

#[test]
fn test_aplicado_sheet_lists_settled_applications() {
    let grid = applications_sheet(&ledger());
    assert_eq!(grid.range(), "Aplicado!A1:B3");
    assert_eq!(grid.rows[1][0].as_str(), "=DATE(2018,4,11)");
    assert_eq!(grid.rows[1][1].as_str(), "=2000.00");
    assert_eq!(grid.rows[2][0].as_str(), "=DATE(2018,2,15)");
}

#[test]
fn test_curve_workbook_from_snapshots_is_written() {
    let curve = parse_equity_curve(CURVE).unwrap();
    let grids = curve_workbook(curve.points(), &ledger());
    let sheets: Vec<&str> = grids.iter().map(|g| g.sheet).collect();
    assert_eq!(sheets, ["Rendimento", "Historico", "Aplicado"]);

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("magnetis.xlsx");
    write_workbook(&path, &grids).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}
