//! Brazilian locale number handling
//!
//! Parsing of scraped "1.234,56" cells into decimals, and the reverse
//! formatting used when printing records to the terminal.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Parse a Brazilian-formatted number ("1.234,56") into a decimal.
///
/// Whitespace is trimmed, every `.` thousands separator is dropped and the
/// `,` decimal separator becomes `.`. Empty or unparsable cells yield zero:
/// ledger tables routinely leave placeholder cells such as `-` or blanks.
///
/// # Examples
/// ```
/// use magnetis::utils::parse_locale_number;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_locale_number("1.234,56"), dec!(1234.56));
/// assert_eq!(parse_locale_number(" 0,00 "), dec!(0));
/// assert_eq!(parse_locale_number(""), dec!(0));
/// ```
pub fn parse_locale_number(text: &str) -> Decimal {
    let cleaned = text.trim().replace('.', "").replace(',', ".");
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or(Decimal::ZERO)
}

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "R$ " prefix (Brazilian Real)
    BRL,
    /// No currency symbol (quantities, unit prices)
    None,
}

/// Formats a Decimal value using Brazilian locale conventions, right-aligned
/// to `width` when `width` is non-zero.
///
/// # Examples
/// ```
/// use magnetis::utils::{format_currency_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234.56), 0, CurrencySymbol::BRL),
///     "R$ 1.234,56"
/// );
/// assert_eq!(
///     format_currency_with_width(dec!(1234), 12, CurrencySymbol::None),
///     "    1.234,00"
/// );
/// ```
pub fn format_currency_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut with_separators = String::with_capacity(integer_part.len() + integer_part.len() / 3);
    for (i, c) in integer_part.chars().enumerate() {
        if i > 0 && (integer_part.len() - i) % 3 == 0 {
            with_separators.push('.');
        }
        with_separators.push(c);
    }

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::BRL => "R$ ",
        CurrencySymbol::None => "",
    };

    let result = format!("{}{}{},{}", prefix, sign, with_separators, decimal_part);

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format as Brazilian Real with symbol: "R$ 1.234,56"
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::BRL)
}

/// Format number only (no symbol): "1.234,56"
pub fn format_decimal_br(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::None)
}
