//! Row classification
//!
//! A ledger row can carry several markers at once (a fee row inside an
//! asset trade, a coloured badge on a fee row). The rules below are
//! evaluated in order and the last one that matches decides the type; a
//! row that matches none is an ordinary money application.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::TransactionType;

pub const TRANSACTION_FEES_CLASS: &str = "journal-summary__transaction-fees";
pub const TRADE_WITH_FEES_CLASS: &str = "journal-summary__asset-trade--with-transaction-fees";
pub const ADVISORY_FEE_CLASS: &str = "advisory-fee";

static REDEMPTION_BADGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.color-redemption").expect("valid redemption selector"));
static EXPIRED_BADGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span.color-expired-asset").expect("valid expired asset selector")
});
static IR_BADGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.color-ir").expect("valid ir selector"));

/// A marker and the type it assigns
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&ElementRef) -> bool,
    pub assigns: TransactionType,
}

/// Classification rules, lowest priority first.
pub const RULES: &[Rule] = &[
    Rule {
        name: "transaction-fees row",
        matches: is_transaction_fee,
        assigns: TransactionType::TransactionFees,
    },
    Rule {
        name: "asset trade with fees row",
        matches: is_trade_with_fees,
        assigns: TransactionType::MoneyApplication,
    },
    Rule {
        name: "advisory-fee row",
        matches: is_advisory_fee,
        assigns: TransactionType::AdvisoryFee,
    },
    Rule {
        name: "redemption badge",
        matches: has_redemption_badge,
        assigns: TransactionType::Redemption,
    },
    Rule {
        name: "expired asset badge",
        matches: has_expired_badge,
        assigns: TransactionType::ExpiredTitle,
    },
    Rule {
        name: "IR badge",
        matches: has_ir_badge,
        assigns: TransactionType::IRWithdrawal,
    },
];

/// Type of a ledger `<tr>`: the last matching rule wins.
pub fn classify(row: &ElementRef) -> TransactionType {
    RULES
        .iter()
        .filter(|rule| (rule.matches)(row))
        .last()
        .map(|rule| rule.assigns)
        .unwrap_or_default()
}

fn has_class(row: &ElementRef, class: &str) -> bool {
    row.value().classes().any(|c| c == class)
}

pub fn is_transaction_fee(row: &ElementRef) -> bool {
    has_class(row, TRANSACTION_FEES_CLASS)
}

pub fn is_trade_with_fees(row: &ElementRef) -> bool {
    has_class(row, TRADE_WITH_FEES_CLASS)
}

/// Advisory-fee rows have no date of their own and put the label in the
/// first cell.
pub fn is_advisory_fee(row: &ElementRef) -> bool {
    has_class(row, ADVISORY_FEE_CLASS)
}

fn has_redemption_badge(row: &ElementRef) -> bool {
    row.select(&REDEMPTION_BADGE).next().is_some()
}

fn has_expired_badge(row: &ElementRef) -> bool {
    row.select(&EXPIRED_BADGE).next().is_some()
}

fn has_ir_badge(row: &ElementRef) -> bool {
    row.select(&IR_BADGE).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn classify_row(tr: &str) -> TransactionType {
        let html = format!("<table><tbody>{}</tbody></table>", tr);
        let fragment = Html::parse_fragment(&html);
        let selector = Selector::parse("tr").unwrap();
        let row = fragment.select(&selector).next().expect("row");
        classify(&row)
    }

    #[test]
    fn test_unmarked_row_is_application() {
        assert_eq!(
            classify_row("<tr><td></td><td>CDB Banco X</td></tr>"),
            TransactionType::MoneyApplication
        );
    }

    #[test]
    fn test_fee_marker_alone_is_transaction_fees() {
        assert_eq!(
            classify_row(r#"<tr class="journal-summary__transaction-fees"><td></td></tr>"#),
            TransactionType::TransactionFees
        );
    }

    #[test]
    fn test_trade_marker_overrides_fee_marker() {
        assert_eq!(
            classify_row(
                r#"<tr class="journal-summary__transaction-fees journal-summary__asset-trade--with-transaction-fees"><td></td></tr>"#
            ),
            TransactionType::MoneyApplication
        );
    }

    #[test]
    fn test_advisory_fee_row() {
        assert_eq!(
            classify_row(r#"<tr class="advisory-fee"><td><span>Consultoria</span></td></tr>"#),
            TransactionType::AdvisoryFee
        );
    }

    #[test]
    fn test_badges_are_classified() {
        assert_eq!(
            classify_row(r#"<tr><td><span class="color-redemption">Resgate</span></td></tr>"#),
            TransactionType::Redemption
        );
        assert_eq!(
            classify_row(r#"<tr><td><span class="color-expired-asset">Vencido</span></td></tr>"#),
            TransactionType::ExpiredTitle
        );
        assert_eq!(
            classify_row(r#"<tr><td><span class="color-ir">IR</span></td></tr>"#),
            TransactionType::IRWithdrawal
        );
    }

    #[test]
    fn test_later_badge_wins_over_earlier_markers() {
        assert_eq!(
            classify_row(
                r#"<tr class="advisory-fee"><td><span class="color-redemption">R</span><span class="color-ir">IR</span></td></tr>"#
            ),
            TransactionType::IRWithdrawal
        );
        assert_eq!(
            classify_row(
                r#"<tr class="journal-summary__transaction-fees"><td><span class="color-expired-asset">V</span></td></tr>"#
            ),
            TransactionType::ExpiredTitle
        );
    }

    #[test]
    fn test_badge_must_be_a_span() {
        assert_eq!(
            classify_row(r#"<tr><td><div class="color-redemption">R</div></td></tr>"#),
            TransactionType::MoneyApplication
        );
    }

    #[test]
    fn test_rule_order_is_fee_trade_advisory_then_badges() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "transaction-fees row",
                "asset trade with fees row",
                "advisory-fee row",
                "redemption badge",
                "expired asset badge",
                "IR badge"
            ]
        );
    }
}
