//! Scan lifecycle state machine.
//!
//! One fetch, then a simulated progress window decoupled from the real I/O
//! latency, then a paced reveal. The fetch always completes before the
//! progress timer is armed, so progress is always against a known quote.
//! At most one driver task is armed at a time; a generation counter
//! invalidates anything stale.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Duration, Instant};
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::gap;
use crate::gate::{self, RateLimitGate};
use crate::source::QuoteFeed;
use crate::types::{DerivedGap, PersistedResult, Quote};

/// Coarse phase, broadcast to anything that paces itself off the session
/// (the cycling display).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Scanning,
    Revealed,
}

/// Exclusive session state. Progress is derived from elapsed time, never
/// stored.
#[derive(Debug, Clone, Copy)]
enum ScanState {
    Idle,
    Scanning {
        started_at: Instant,
        quote: Quote,
        gap: DerivedGap,
    },
    Revealed {
        quote: Quote,
        gap: DerivedGap,
    },
}

/// Point-in-time view handed to callers.
#[derive(Debug, Clone, Copy)]
pub struct ScanSnapshot {
    pub phase: Phase,
    pub progress: f64,
    pub quote: Option<Quote>,
    pub gap: Option<DerivedGap>,
}

pub struct ScanSession {
    feed: Arc<dyn QuoteFeed>,
    cache: ResultCache,
    gate: RateLimitGate,
    config: ScanConfig,
    state: RwLock<ScanState>,
    /// Also serializes `start`/`reset`, so two callers can never both arm a
    /// driver.
    driver: Mutex<Option<JoinHandle<()>>>,
    generation: AtomicU64,
    phase_tx: watch::Sender<Phase>,
}

impl ScanSession {
    pub fn new(
        feed: Arc<dyn QuoteFeed>,
        cache: ResultCache,
        gate: RateLimitGate,
        config: ScanConfig,
    ) -> Arc<Self> {
        let (phase_tx, _) = watch::channel(Phase::Idle);
        Arc::new(Self {
            feed,
            cache,
            gate,
            config,
            state: RwLock::new(ScanState::Idle),
            driver: Mutex::new(None),
            generation: AtomicU64::new(0),
            phase_tx,
        })
    }

    pub fn phase_watch(&self) -> watch::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    /// Rehydrate from a fresh cached result: straight to `Revealed`, skipping
    /// the fetch and the animation. Returns whether anything was restored.
    pub async fn hydrate(&self) -> Result<bool> {
        let Some(cached) = self.cache.load(Utc::now()).await? else {
            return Ok(false);
        };

        let quote = Quote {
            reference_price: cached.reference_price,
            fetched_at: cached.captured_at,
        };
        let gap = gap::from_pair(cached.reference_price, cached.comparison_price);
        *self.state.write().await = ScanState::Revealed { quote, gap };
        self.phase_tx.send_replace(Phase::Revealed);
        info!(reference = cached.reference_price, "restored previous scan result");
        Ok(true)
    }

    /// Start a scan.
    ///
    /// While already `Scanning` this is a no-op returning the in-flight
    /// snapshot. With an open cooldown it refuses. On a fetch failure the
    /// machine resets to `Idle` with prices cleared and nothing persisted.
    pub async fn start(self: &Arc<Self>) -> Result<ScanSnapshot> {
        let mut driver = self.driver.lock().await;

        if matches!(*self.state.read().await, ScanState::Scanning { .. }) {
            debug!("scan already in flight");
            return Ok(self.snapshot().await);
        }

        let now = Utc::now();
        if let Some(remaining) = self.gate.remaining(now).await? {
            return Err(Error::CooldownActive(gate::format_remaining(remaining)));
        }

        let quote = match self.feed.fetch_reference_price().await {
            Ok(quote) => quote,
            Err(e) => {
                *self.state.write().await = ScanState::Idle;
                self.phase_tx.send_replace(Phase::Idle);
                warn!(error = %e, "reference price fetch failed");
                return Err(e.into());
            }
        };
        let gap = gap::derive(quote.reference_price, self.config.premium_pct);

        // Persist before the animation runs so a restart mid-scan still
        // recovers the true result.
        self.cache
            .save(&PersistedResult {
                reference_price: quote.reference_price,
                comparison_price: gap.comparison_price,
                captured_at: quote.fetched_at,
            })
            .await?;

        if let Some(stale) = driver.take() {
            stale.abort();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started_at = Instant::now();
        *self.state.write().await = ScanState::Scanning {
            started_at,
            quote,
            gap,
        };
        self.phase_tx.send_replace(Phase::Scanning);
        *driver = Some(tokio::spawn(
            Arc::clone(self).drive(generation, started_at),
        ));
        drop(driver);

        info!(
            reference = quote.reference_price,
            gap_percent = gap.gap_percent,
            "scan started"
        );
        Ok(self.snapshot().await)
    }

    /// Poll elapsed time on a fixed tick until the fill completes, hold the
    /// reveal pause, then finish.
    async fn drive(self: Arc<Self>, generation: u64, started_at: Instant) {
        let total = Duration::from_millis(self.config.scan_duration_ms);
        let mut tick = interval(Duration::from_millis(self.config.tick_ms.max(1)));
        loop {
            tick.tick().await;
            if started_at.elapsed() >= total {
                break;
            }
        }
        // The reveal pause runs from fill completion, not from whenever the
        // tick loop noticed it; an absolute deadline keeps that true even
        // when the clock moves in coarse jumps.
        sleep_until(started_at + total + Duration::from_millis(self.config.reveal_delay_ms)).await;
        self.finish(generation).await;
    }

    /// Exactly-once transition into `Revealed`; stale generations lose.
    async fn finish(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "stale scan timer, ignoring");
            return;
        }

        let mut state = self.state.write().await;
        let ScanState::Scanning { quote, gap, .. } = *state else {
            return;
        };
        *state = ScanState::Revealed { quote, gap };
        drop(state);

        self.phase_tx.send_replace(Phase::Revealed);
        if let Err(e) = self.gate.record_first_scan(Utc::now()).await {
            warn!(error = %e, "failed to record cooldown start");
        }
        info!("scan revealed");
    }

    /// Back to `Idle`. Refused while the advisory cooldown is open.
    pub async fn reset(&self) -> Result<()> {
        if let Some(remaining) = self.gate.remaining(Utc::now()).await? {
            return Err(Error::CooldownActive(gate::format_remaining(remaining)));
        }

        let mut driver = self.driver.lock().await;
        if let Some(handle) = driver.take() {
            handle.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.state.write().await = ScanState::Idle;
        self.phase_tx.send_replace(Phase::Idle);
        Ok(())
    }

    /// Cancel the outstanding driver; no state update can land afterwards.
    pub async fn dispose(&self) {
        let mut driver = self.driver.lock().await;
        if let Some(handle) = driver.take() {
            handle.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn cooldown_remaining(&self) -> Result<Option<chrono::Duration>> {
        self.gate.remaining(Utc::now()).await
    }

    pub async fn snapshot(&self) -> ScanSnapshot {
        match *self.state.read().await {
            ScanState::Idle => ScanSnapshot {
                phase: Phase::Idle,
                progress: 0.0,
                quote: None,
                gap: None,
            },
            ScanState::Scanning {
                started_at,
                quote,
                gap,
            } => ScanSnapshot {
                phase: Phase::Scanning,
                progress: progress_at(
                    started_at.elapsed(),
                    Duration::from_millis(self.config.scan_duration_ms),
                ),
                quote: Some(quote),
                gap: Some(gap),
            },
            ScanState::Revealed { quote, gap } => ScanSnapshot {
                phase: Phase::Revealed,
                progress: 100.0,
                quote: Some(quote),
                gap: Some(gap),
            },
        }
    }
}

/// Elapsed-over-total fill, clamped to 100.
pub fn progress_at(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 100.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64() * 100.0).min(100.0)
}
