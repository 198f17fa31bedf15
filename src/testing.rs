//! Test support: a controllable quote feed.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::FetchError;
use crate::source::QuoteFeed;
use crate::types::Quote;

/// Quote feed returning a fixed price, or failing on demand.
pub struct StubFeed {
    price: f64,
    fail_code: Option<i64>,
    calls: AtomicUsize,
}

impl StubFeed {
    pub fn price(price: f64) -> Self {
        Self {
            price,
            fail_code: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(code: i64) -> Self {
        Self {
            price: 0.0,
            fail_code: Some(code),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteFeed for StubFeed {
    async fn fetch_reference_price(&self) -> Result<Quote, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_code {
            Some(code) => Err(FetchError::Endpoint {
                code,
                msg: "stubbed failure".to_string(),
            }),
            None => Ok(Quote {
                reference_price: self.price,
                fetched_at: Utc::now(),
            }),
        }
    }
}
