//! Advisory daily rate limit.
//!
//! Persists the timestamp of the first completed scan and exposes the rolling
//! cooldown remaining. The record lives in client-equivalent storage, so this
//! is a UX gate, not a security control: wiping the store resets it. True
//! enforcement would need a server-side limit keyed by an authenticated
//! identity.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::Store;

const KEY_FIRST_SCAN: &str = "firstSearchTime";

pub struct RateLimitGate {
    store: Store,
    window: Duration,
}

impl RateLimitGate {
    /// `cooldown_hours = 0` disables the gate entirely (the re-run variant).
    pub fn new(store: Store, cooldown_hours: i64) -> Self {
        Self {
            store,
            window: Duration::hours(cooldown_hours),
        }
    }

    pub fn enabled(&self) -> bool {
        self.window > Duration::zero()
    }

    /// Mark the first gated scan of the current window.
    ///
    /// A later scan while the window is open must not refresh the timestamp;
    /// the record marks the first scan, not the most recent.
    pub async fn record_first_scan(&self, now: DateTime<Utc>) -> Result<()> {
        if !self.enabled() {
            return Ok(());
        }
        if self.first_scan_at(now).await?.is_some() {
            return Ok(());
        }
        self.store
            .put(KEY_FIRST_SCAN, &now.timestamp_millis().to_string())
            .await
    }

    /// Time left in the window. `None` means no cooldown is recorded and a
    /// new scan is permitted; an expired record is cleared on the way out.
    pub async fn remaining(&self, now: DateTime<Utc>) -> Result<Option<Duration>> {
        let Some(first) = self.first_scan_at(now).await? else {
            return Ok(None);
        };
        // The record is persisted at millisecond precision (the original's
        // `Date.now()`); compute the remainder at the same granularity.
        Ok(Some(Duration::milliseconds(
            first.timestamp_millis() + self.window.num_milliseconds() - now.timestamp_millis(),
        )))
    }

    async fn first_scan_at(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
        if !self.enabled() {
            return Ok(None);
        }
        let Some(raw) = self.store.get(KEY_FIRST_SCAN).await? else {
            return Ok(None);
        };

        let first = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis);
        let Some(first) = first else {
            warn!(raw = %raw, "discarding unreadable cooldown record");
            self.store.delete(KEY_FIRST_SCAN).await?;
            return Ok(None);
        };

        if now - first >= self.window {
            debug!(first_scan_at = %first, "cooldown expired, clearing");
            self.store.delete(KEY_FIRST_SCAN).await?;
            return Ok(None);
        }

        Ok(Some(first))
    }
}

/// `HH:MM:SS`, floored at zero.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn gate(cooldown_hours: i64) -> RateLimitGate {
        RateLimitGate::new(Store::in_memory().await.unwrap(), cooldown_hours)
    }

    #[tokio::test]
    async fn no_record_means_permission() {
        let gate = gate(24).await;
        assert_eq!(gate.remaining(Utc::now()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn remaining_counts_down_from_first_scan() {
        let gate = gate(24).await;
        let now = Utc::now();
        gate.record_first_scan(now - Duration::hours(23)).await.unwrap();

        let remaining = gate.remaining(now).await.unwrap().unwrap();
        assert_eq!(remaining, Duration::hours(1));
    }

    #[tokio::test]
    async fn expired_record_is_cleared() {
        let gate = gate(24).await;
        let now = Utc::now();
        gate.record_first_scan(now - Duration::hours(25)).await.unwrap();

        assert_eq!(gate.remaining(now).await.unwrap(), None);
        assert_eq!(gate.store.get(KEY_FIRST_SCAN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn later_scans_do_not_refresh_the_window() {
        let gate = gate(24).await;
        let now = Utc::now();
        let first = now - Duration::hours(10);

        gate.record_first_scan(first).await.unwrap();
        gate.record_first_scan(now).await.unwrap();

        let stored = gate.store.get(KEY_FIRST_SCAN).await.unwrap().unwrap();
        assert_eq!(stored, first.timestamp_millis().to_string());
        assert_eq!(
            gate.remaining(now).await.unwrap(),
            Some(Duration::hours(14))
        );
    }

    #[tokio::test]
    async fn malformed_record_is_a_miss() {
        let gate = gate(24).await;
        gate.store.put(KEY_FIRST_SCAN, "yesterday-ish").await.unwrap();

        assert_eq!(gate.remaining(Utc::now()).await.unwrap(), None);
        assert_eq!(gate.store.get(KEY_FIRST_SCAN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn disabled_gate_never_blocks() {
        let gate = gate(0).await;
        let now = Utc::now();
        gate.record_first_scan(now).await.unwrap();

        assert!(!gate.enabled());
        assert_eq!(gate.remaining(now).await.unwrap(), None);
        assert_eq!(gate.store.get(KEY_FIRST_SCAN).await.unwrap(), None);
    }

    #[test]
    fn formats_hh_mm_ss() {
        assert_eq!(format_remaining(Duration::seconds(3661)), "01:01:01");
        assert_eq!(format_remaining(Duration::hours(24)), "24:00:00");
        assert_eq!(format_remaining(Duration::zero()), "00:00:00");
        assert_eq!(format_remaining(Duration::seconds(-5)), "00:00:00");
    }
}
