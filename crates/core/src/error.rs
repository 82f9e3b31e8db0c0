//! Error types for the fallible edges of the crate.
//!
//! Date resolution itself never fails with an error: an expression that
//! cannot be understood yields no date. Errors only come from decoding
//! settings and host-provided names.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NldError {
    #[error("invalid week start: {0} (expected sunday..saturday or locale-default)")]
    InvalidWeekStart(String),

    #[error("invalid parse mode: {0} (expected replace, link, clean or time)")]
    InvalidParseMode(String),

    #[error("invalid date action: {0}")]
    InvalidAction(String),

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NldError>;
