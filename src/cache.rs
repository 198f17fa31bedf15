//! Last-result cache: one global slot that survives restarts.
//!
//! A new successful scan overwrites the slot unconditionally; the record is
//! written the moment the fetch succeeds, so a restart mid-animation still
//! recovers the true result.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::Store;
use crate::types::PersistedResult;

const KEY_SCAN_RESULTS: &str = "scanResults";

#[derive(Clone)]
pub struct ResultCache {
    store: Store,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: Store, ttl_hours: i64) -> Self {
        Self {
            store,
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub async fn save(&self, result: &PersistedResult) -> Result<()> {
        let json = serde_json::to_string(result)?;
        self.store.put(KEY_SCAN_RESULTS, &json).await
    }

    /// Load the slot if it is still fresh. Stale and unreadable records are
    /// logically deleted and reported as a miss, never as an error.
    pub async fn load(&self, now: DateTime<Utc>) -> Result<Option<PersistedResult>> {
        let Some(raw) = self.store.get(KEY_SCAN_RESULTS).await? else {
            return Ok(None);
        };

        let result: PersistedResult = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "discarding unreadable cached result");
                self.store.delete(KEY_SCAN_RESULTS).await?;
                return Ok(None);
            }
        };

        if now - result.captured_at >= self.ttl {
            debug!(captured_at = %result.captured_at, "cached result expired");
            self.store.delete(KEY_SCAN_RESULTS).await?;
            return Ok(None);
        }

        Ok(Some(result))
    }
}
