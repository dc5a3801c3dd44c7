//! Error handling for the Magnetis crawler
//!
//! Defines the typed errors surfaced by the extraction pipeline. Nothing in
//! the library retries or swallows these; the binary attaches context with
//! anyhow and decides whether to abort the run.

use std::fmt;

use thiserror::Error;

/// Maximum number of characters of a response body or payload kept in an error.
pub const EXCERPT_LIMIT: usize = 2048;

/// Which request of the sign-in flow failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    /// GET of the sign-in page (token scraping)
    SignInPage,
    /// POST of the credentials form
    Credentials,
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStage::SignInPage => f.write_str("sign-in page"),
            AuthStage::Credentials => f.write_str("credentials submit"),
        }
    }
}

/// Errors produced while talking to the site
#[derive(Error, Debug)]
pub enum CrawlerError {
    #[error("authentication failed at {stage}: unexpected status {code}\nbody: {body}")]
    Auth {
        stage: AuthStage,
        code: u16,
        body: String,
    },

    #[error("request to {url} returned status {code}\nbody: {body}")]
    UnexpectedStatus { url: String, code: u16, body: String },

    #[error("transport error")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Payloads that do not match the expected JSON/HTML shape
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON payload: {payload}")]
    Json {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed equity entry at index {index}: {payload}")]
    MalformedEquity { index: usize, payload: String },

    #[error("equity entry at index {index} has out-of-range timestamp {millis}")]
    InvalidTimestamp { index: usize, millis: f64 },

    #[error("row {row}: invalid transaction date {value:?}")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: invalid application date {value:?}")]
    InvalidApplicationDate { row: usize, value: String },

    #[error("row {row}: no date and no previous transaction to inherit one from")]
    MissingPredecessor { row: usize },
}

/// Result type alias for crawler operations
pub type Result<T, E = CrawlerError> = std::result::Result<T, E>;

/// Cut a body or payload down to [`EXCERPT_LIMIT`] characters.
pub fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_LIMIT) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_formatting_is_readable() {
        let err = CrawlerError::Auth {
            stage: AuthStage::SignInPage,
            code: 500,
            body: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("authentication failed at sign-in page"));
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err: CrawlerError = ParseError::MissingPredecessor { row: 0 }.into();
        assert_eq!(
            err.to_string(),
            "row 0: no date and no previous transaction to inherit one from"
        );
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let body = "x".repeat(EXCERPT_LIMIT + 10);
        let cut = excerpt(&body);
        assert_eq!(cut.chars().count(), EXCERPT_LIMIT + 1);
        assert!(cut.ends_with('…'));

        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: anyhow::Result<()> = Err(CrawlerError::UnexpectedStatus {
            url: "https://example.test/movimentacoes".to_string(),
            code: 403,
            body: String::new(),
        })
        .context("failed to fetch transactions");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to fetch transactions"));
        assert!(format!("{:?}", err).contains("403"));
    }
}
