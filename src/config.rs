//! Layered configuration: a TOML file plus `GAPFINDER__`-prefixed
//! environment overrides. Every knob has a default, so an empty file (or no
//! file at all) yields a working setup.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub quote: QuoteConfig,
    pub scan: ScanConfig,
    pub gate: GateConfig,
    pub cache: CacheConfig,
    pub ticker: TickerConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub links: LinksConfig,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("GAPFINDER").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// Upstream quote endpoint for the fixed trading pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub endpoint: String,
    pub category: String,
    pub symbol: String,
    pub http_timeout_secs: u64,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.bybit.com/v5/market/tickers".to_string(),
            category: "spot".to_string(),
            symbol: "TRXUSDT".to_string(),
            http_timeout_secs: 10,
        }
    }
}

/// Scan pacing and gap math.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Fixed markup defining the synthetic comparison price, in percent.
    pub premium_pct: f64,
    /// Simulated progress-fill duration.
    pub scan_duration_ms: u64,
    /// Pause between the fill completing and the reveal.
    pub reveal_delay_ms: u64,
    /// Progress re-evaluation tick.
    pub tick_ms: u64,
    /// Notional used when the caller does not choose one.
    pub default_investment: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            premium_pct: 7.16,
            scan_duration_ms: 5000,
            reveal_delay_ms: 1500,
            tick_ms: 50,
            default_investment: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Rolling cooldown window; 0 disables gating and allows re-runs.
    pub cooldown_hours: i64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { cooldown_hours: 24 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Freshness window for the persisted result.
    pub ttl_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_hours: 24 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub idle_period_ms: u64,
    pub scan_period_ms: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            idle_period_ms: 800,
            scan_period_ms: 150,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
}

impl StorageConfig {
    pub fn expanded_path(&self) -> String {
        shellexpand::tilde(&self.path).into_owned()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "gapfinder.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Outbound links surfaced in status payloads. Rendered for the caller,
/// never fetched.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LinksConfig {
    pub reference_venue: String,
    pub comparison_venue: String,
    pub contact: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            reference_venue: "https://www.bybit.com".to_string(),
            comparison_venue: "https://kvamdex.exchange".to_string(),
            contact: "https://t.me/kvamdex_support".to_string(),
        }
    }
}
