//! Error types for the gap scanner.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures from the quote endpoint: transport, HTTP status, or payload
/// problems. Recovery is always a user-initiated re-fetch; there is no
/// automatic retry anywhere in the crate.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("quote request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("quote endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("quote endpoint rejected the request: retCode {code} ({msg})")]
    Endpoint { code: i64, msg: String },

    #[error("quote response carried no ticker entries")]
    EmptyTickerList,

    #[error("unparseable last price {0:?}")]
    BadPrice(String),
}

/// Crate-level error. None of these are fatal to the process; callers surface
/// them and offer a retry.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("scan cooldown active, {0} remaining")]
    CooldownActive(String),

    #[error("investment amount must be within [{min}, {max}] in steps of {step}, got {value}")]
    InvalidInvestment {
        value: u32,
        min: u32,
        max: u32,
        step: u32,
    },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("malformed persisted record: {0}")]
    Persistence(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}
