//! Equity curve: daily account balance as reported by the pricing API
//!
//! The endpoint returns `[[epoch_millis, "balance"], ...]`. Balances stay as
//! the strings the API sent because they are written verbatim into
//! spreadsheet formulas.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{excerpt, ParseError, Result};
use crate::session::Session;

pub fn equity_curve_path(user_id: &str) -> String {
    format!("/pricing/api/portfolio/{}/equity_curve", user_id)
}

/// Balance of the account at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub value: String,
}

impl EquityPoint {
    /// Two tab-separated spreadsheet cells: `=DATE(y,m,d)` and `=value`.
    pub fn excel(&self) -> String {
        let ts = self.timestamp;
        format!(
            "=DATE({},{},{})\t={}",
            ts.year(),
            ts.month(),
            ts.day(),
            self.value
        )
    }
}

/// Equity points sorted ascending by timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Convert raw `[millis, balance]` pairs into a sorted curve.
///
/// Milliseconds are truncated to whole seconds. The sort is stable, so
/// entries sharing a timestamp keep their original relative order.
pub fn normalize(raw: &[Value]) -> Result<EquityCurve, ParseError> {
    let mut points = raw
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(index, entry))
        .collect::<Result<Vec<_>, _>>()?;
    points.sort_by_key(|point| point.timestamp);
    Ok(EquityCurve { points })
}

/// Parse the raw endpoint body and normalize it.
pub fn parse_equity_curve(body: &str) -> Result<EquityCurve, ParseError> {
    let raw: Vec<Value> = serde_json::from_str(body).map_err(|source| ParseError::Json {
        payload: excerpt(body),
        source,
    })?;
    normalize(&raw)
}

/// Fetch the equity curve of `user_id` through an authenticated session.
pub fn fetch_equity_curve(session: &Session, user_id: &str) -> Result<EquityCurve> {
    let body = session.get_text(&equity_curve_path(user_id))?;
    let curve = parse_equity_curve(&body)?;
    debug!("Parsed {} equity points", curve.len());
    Ok(curve)
}

fn parse_entry(index: usize, entry: &Value) -> Result<EquityPoint, ParseError> {
    let malformed = || ParseError::MalformedEquity {
        index,
        payload: excerpt(&entry.to_string()),
    };

    let pair = match entry.as_array() {
        Some(pair) if pair.len() == 2 => pair,
        _ => return Err(malformed()),
    };
    let millis = pair[0].as_f64().ok_or_else(malformed)?;
    let value = match &pair[1] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Err(malformed()),
    };

    let seconds = millis as i64 / 1000;
    let timestamp = DateTime::from_timestamp(seconds, 0)
        .ok_or(ParseError::InvalidTimestamp { index, millis })?;

    Ok(EquityPoint { timestamp, value })
}
