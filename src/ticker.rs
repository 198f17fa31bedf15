//! Cosmetic venue/coin ticker.
//!
//! Cycles two fixed label lists in lock-step, slower while idle, faster while
//! a scan is running, frozen once results are revealed. One task owns the
//! index; re-arming on every phase change makes concurrent timers impossible.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

use crate::config::TickerConfig;
use crate::session::Phase;

pub const EXCHANGES: [&str; 22] = [
    "BYBIT",
    "KvamDex",
    "MEXC",
    "OKX",
    "Gate.io",
    "Bitget",
    "Binance",
    "Kraken",
    "Coinbase",
    "Huobi",
    "KuCoin",
    "Gemini",
    "Crypto.com",
    "Bitfinex",
    "Bitstamp",
    "Poloniex",
    "Bittrex",
    "HTX",
    "Upbit",
    "Bithumb",
    "Phemex",
    "BingX",
];

pub const COINS: [&str; 30] = [
    "BTC", "ETH", "SOL", "DOGE", "PEPE", "SHIB", "TRX", "MATIC", "DOT", "AVAX", "ADA", "BNB",
    "LINK", "LTC", "XRP", "UNI", "ALGO", "ATOM", "FTM", "NEAR", "XLM", "SAND", "AXS", "USDT",
    "USDC", "FLOKI", "KITTY", "WAVES", "APE", "CAKE",
];

/// What the presentation layer shows at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickerFrame {
    pub left_exchange: &'static str,
    pub right_exchange: &'static str,
    pub coin: &'static str,
}

struct TickerInner {
    index: AtomicUsize,
}

pub struct CyclingDisplay {
    inner: Arc<TickerInner>,
    handle: JoinHandle<()>,
}

impl CyclingDisplay {
    pub fn spawn(config: &TickerConfig, phases: watch::Receiver<Phase>) -> Self {
        let inner = Arc::new(TickerInner {
            index: AtomicUsize::new(0),
        });
        let idle = Duration::from_millis(config.idle_period_ms.max(1));
        let scan = Duration::from_millis(config.scan_period_ms.max(1));
        let handle = tokio::spawn(run(Arc::clone(&inner), phases, idle, scan));
        Self { inner, handle }
    }

    pub fn frame(&self) -> TickerFrame {
        frame_at(self.inner.index.load(Ordering::Relaxed))
    }
}

impl Drop for CyclingDisplay {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn frame_at(index: usize) -> TickerFrame {
    TickerFrame {
        left_exchange: EXCHANGES[index % EXCHANGES.len()],
        right_exchange: EXCHANGES[(index + 1) % EXCHANGES.len()],
        coin: COINS[index % COINS.len()],
    }
}

fn period_for(phase: Phase, idle: Duration, scan: Duration) -> Option<Duration> {
    match phase {
        Phase::Idle => Some(idle),
        Phase::Scanning => Some(scan),
        // Frozen on fixed content once revealed.
        Phase::Revealed => None,
    }
}

async fn run(
    inner: Arc<TickerInner>,
    mut phases: watch::Receiver<Phase>,
    idle: Duration,
    scan: Duration,
) {
    loop {
        let phase = *phases.borrow_and_update();
        match period_for(phase, idle, scan) {
            None => {
                if phases.changed().await.is_err() {
                    return;
                }
            }
            Some(period) => {
                let mut tick = interval(period);
                // The immediate first tick is not an advance.
                tick.tick().await;
                loop {
                    tokio::select! {
                        _ = tick.tick() => {
                            inner.index.fetch_add(1, Ordering::Relaxed);
                        }
                        changed = phases.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            // Re-arm at the new period.
                            break;
                        }
                    }
                }
            }
        }
    }
}
