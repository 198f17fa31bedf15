//! Quote feed: one reference price per scan from the Bybit spot ticker.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::QuoteConfig;
use crate::error::FetchError;
use crate::types::Quote;

/// Seam for the single upstream price dependency.
///
/// The session only ever needs one fresh reference price per scan; retries
/// are a caller concern (the user re-invoking the scan), never this trait's.
#[async_trait]
pub trait QuoteFeed: Send + Sync {
    async fn fetch_reference_price(&self) -> Result<Quote, FetchError>;
}

/// Raw shape of the Bybit v5 ticker response.
#[derive(Debug, Clone, Deserialize)]
struct TickerResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    #[serde(default)]
    result: TickerResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TickerResult {
    #[serde(default)]
    list: Vec<TickerEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct TickerEntry {
    #[serde(rename = "lastPrice")]
    last_price: String,
}

/// Bybit spot ticker client for a fixed trading pair.
#[derive(Clone)]
pub struct BybitSource {
    http: Client,
    endpoint: String,
    category: String,
    symbol: String,
}

impl BybitSource {
    /// The client always carries a request timeout; a hung upstream must not
    /// wedge the scan.
    pub fn new(config: &QuoteConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            category: config.category.clone(),
            symbol: config.symbol.clone(),
        })
    }
}

#[async_trait]
impl QuoteFeed for BybitSource {
    async fn fetch_reference_price(&self) -> Result<Quote, FetchError> {
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("category", self.category.as_str()),
                ("symbol", self.symbol.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body: TickerResponse = resp.json().await?;
        let price = parse_last_price(&body)?;
        debug!(symbol = %self.symbol, price, "fetched reference price");

        Ok(Quote {
            reference_price: price,
            fetched_at: Utc::now(),
        })
    }
}

/// Validate the response body and pull out the last price.
fn parse_last_price(body: &TickerResponse) -> Result<f64, FetchError> {
    if body.ret_code != 0 {
        return Err(FetchError::Endpoint {
            code: body.ret_code,
            msg: body.ret_msg.clone(),
        });
    }

    let entry = body
        .result
        .list
        .first()
        .ok_or(FetchError::EmptyTickerList)?;

    let price: f64 = entry
        .last_price
        .trim()
        .parse()
        .map_err(|_| FetchError::BadPrice(entry.last_price.clone()))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(FetchError::BadPrice(entry.last_price.clone()));
    }

    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_body(json: &str) -> Result<f64, FetchError> {
        let body: TickerResponse = serde_json::from_str(json).unwrap();
        parse_last_price(&body)
    }

    #[test]
    fn parses_valid_ticker() {
        let price = parse_body(
            r#"{
                "retCode": 0,
                "retMsg": "OK",
                "result": {
                    "category": "spot",
                    "list": [{"symbol": "TRXUSDT", "lastPrice": "0.29"}]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(price, 0.29);
    }

    #[test]
    fn rejects_error_ret_code() {
        let err = parse_body(
            r#"{"retCode": 10001, "retMsg": "params error", "result": {"list": []}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::Endpoint { code: 10001, .. }));
    }

    #[test]
    fn rejects_empty_ticker_list() {
        let err =
            parse_body(r#"{"retCode": 0, "retMsg": "OK", "result": {"list": []}}"#).unwrap_err();
        assert!(matches!(err, FetchError::EmptyTickerList));
    }

    #[test]
    fn rejects_missing_result() {
        let err = parse_body(r#"{"retCode": 0, "retMsg": "OK"}"#).unwrap_err();
        assert!(matches!(err, FetchError::EmptyTickerList));
    }

    #[test]
    fn rejects_non_numeric_price() {
        let err = parse_body(
            r#"{"retCode": 0, "retMsg": "OK", "result": {"list": [{"symbol": "TRXUSDT", "lastPrice": "n/a"}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::BadPrice(_)));
    }

    #[test]
    fn rejects_non_positive_price() {
        for bad in ["0", "-1.5", "NaN", "inf"] {
            let json = format!(
                r#"{{"retCode": 0, "retMsg": "OK", "result": {{"list": [{{"symbol": "TRXUSDT", "lastPrice": "{bad}"}}]}}}}"#,
            );
            let err = parse_body(&json).unwrap_err();
            assert!(matches!(err, FetchError::BadPrice(_)), "accepted {bad:?}");
        }
    }
}
