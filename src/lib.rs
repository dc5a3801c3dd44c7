//! Magnetis crawler - scraping and normalization of a Magnetis account
//!
//! This library signs in to the Magnetis website, fetches the equity curve,
//! investment plan, asset list and transaction ledger, and turns them into
//! typed records ready to be printed or exported to a spreadsheet.

pub mod config;
pub mod equity;
pub mod error;
pub mod export;
pub mod ledger;
pub mod portfolio;
pub mod session;
pub mod utils;

pub use error::{CrawlerError, ParseError, Result};
