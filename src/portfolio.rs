//! Investment plan and asset list JSON endpoints

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{excerpt, ParseError, Result};
use crate::session::Session;

pub fn investment_plan_path(user_id: &str) -> String {
    format!("/api/investment_plan/{}", user_id)
}

pub fn assets_path(user_id: &str) -> String {
    format!("/user_portfolio/api/portfolios/{}/assets", user_id)
}

/// Plan the account was opened with. Money amounts arrive as JSON strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentPlan {
    pub age: Option<u32>,
    pub experience: Option<String>,
    pub goal: Option<String>,
    pub goal_value: Option<Decimal>,
    pub initial_investment: Option<Decimal>,
    pub loss_tolerance: Option<String>,
    pub monthly_investment: Option<Decimal>,
    pub period_in_years: Option<u32>,
    pub risk_level: Option<i32>,
    pub risk_profile: Option<String>,
}

/// An investment held by the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub amount: Option<String>,
    pub asset_id: i64,
    #[serde(default)]
    pub asset_return: Option<String>,
    #[serde(default)]
    pub category_key: Option<String>,
    #[serde(default)]
    pub instrument_type_name: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub liquidity: Option<i64>,
    #[serde(default)]
    pub maturity_date: Option<String>,
    pub name: String,
    #[serde(default, rename = "yield")]
    pub yield_rate: Option<String>,
}

pub fn parse_investment_plan(body: &str) -> Result<InvestmentPlan, ParseError> {
    parse_json(body)
}

pub fn parse_assets(body: &str) -> Result<Vec<Asset>, ParseError> {
    parse_json(body)
}

pub fn fetch_investment_plan(session: &Session, user_id: &str) -> Result<InvestmentPlan> {
    let body = session.get_text(&investment_plan_path(user_id))?;
    Ok(parse_investment_plan(&body)?)
}

pub fn fetch_assets(session: &Session, user_id: &str) -> Result<Vec<Asset>> {
    let body = session.get_text(&assets_path(user_id))?;
    let assets = parse_assets(&body)?;
    debug!("Parsed {} assets", assets.len());
    Ok(assets)
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ParseError> {
    serde_json::from_str(body).map_err(|source| ParseError::Json {
        payload: excerpt(body),
        source,
    })
}
