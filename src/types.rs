//! Core data types shared across the scanner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A reference price observed at the quote venue.
///
/// Immutable once created; a later fetch supersedes the quote, it is never
/// mutated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub reference_price: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Comparison price and percentage gap derived from a quote.
///
/// The comparison price is a deterministic markup on the reference price, so
/// `gap_percent` always equals the configured premium within float tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedGap {
    pub comparison_price: f64,
    pub gap_percent: f64,
}

/// Profit projection for a chosen notional amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub units_acquired: f64,
    pub final_amount: f64,
    pub profit: f64,
}

/// Last successful price pair, durable across restarts.
///
/// Field names match the legacy `scanResults` record so existing stored state
/// stays readable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistedResult {
    #[serde(rename = "bybit")]
    pub reference_price: f64,
    #[serde(rename = "kvamdex")]
    pub comparison_price: f64,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub captured_at: DateTime<Utc>,
}

/// User-chosen notional amount, bounded to [100, 10000] in steps of 100.
///
/// Consumed by the projection math only; it never feeds back into a quote or
/// a derived gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvestmentAmount(u32);

impl InvestmentAmount {
    pub const MIN: u32 = 100;
    pub const MAX: u32 = 10_000;
    pub const STEP: u32 = 100;

    pub fn new(value: u32) -> Result<Self> {
        if value < Self::MIN || value > Self::MAX || value % Self::STEP != 0 {
            return Err(Error::InvalidInvestment {
                value,
                min: Self::MIN,
                max: Self::MAX,
                step: Self::STEP,
            });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        f64::from(self.0)
    }
}

impl Default for InvestmentAmount {
    fn default() -> Self {
        Self(1000)
    }
}
