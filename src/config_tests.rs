//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;

    #[test]
    fn test_quote_config_defaults() {
        let config: QuoteConfig = toml::from_str("").unwrap();
        assert_eq!(config.endpoint, "https://api.bybit.com/v5/market/tickers");
        assert_eq!(config.category, "spot");
        assert_eq!(config.symbol, "TRXUSDT");
        assert_eq!(config.http_timeout_secs, 10);
    }

    #[test]
    fn test_scan_config_defaults() {
        let config: ScanConfig = toml::from_str("").unwrap();
        assert_eq!(config.premium_pct, 7.16);
        assert_eq!(config.scan_duration_ms, 5000);
        assert_eq!(config.reveal_delay_ms, 1500);
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.default_investment, 1000);
    }

    #[test]
    fn test_gate_and_cache_defaults() {
        let gate: GateConfig = toml::from_str("").unwrap();
        let cache: CacheConfig = toml::from_str("").unwrap();
        assert_eq!(gate.cooldown_hours, 24);
        assert_eq!(cache.ttl_hours, 24);
    }

    #[test]
    fn test_ticker_config_defaults() {
        let config: TickerConfig = toml::from_str("").unwrap();
        assert_eq!(config.idle_period_ms, 800);
        assert_eq!(config.scan_period_ms, 150);
    }

    #[test]
    fn test_scan_config_overrides() {
        let toml_str = r#"
premium_pct = 3.5
scan_duration_ms = 2000
"#;
        let config: ScanConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.premium_pct, 3.5);
        assert_eq!(config.scan_duration_ms, 2000);
        // Unset knobs fall back to defaults.
        assert_eq!(config.reveal_delay_ms, 1500);
        assert_eq!(config.tick_ms, 50);
    }

    #[test]
    fn test_gate_disabled_via_config() {
        let config: GateConfig = toml::from_str("cooldown_hours = 0").unwrap();
        assert_eq!(config.cooldown_hours, 0);
    }

    #[test]
    fn test_full_config_from_empty_input() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.path, "gapfinder.db");
        assert_eq!(config.scan.premium_pct, 7.16);
    }

    #[test]
    fn test_full_config_sections() {
        let toml_str = r#"
[quote]
symbol = "BTCUSDT"

[server]
port = 9000

[storage]
path = "/tmp/gap.db"

[links]
contact = "https://t.me/example"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.quote.symbol, "BTCUSDT");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.path, "/tmp/gap.db");
        assert_eq!(config.links.contact, "https://t.me/example");
        // Untouched sections keep defaults.
        assert_eq!(config.quote.category, "spot");
        assert_eq!(config.gate.cooldown_hours, 24);
    }

    #[test]
    fn test_storage_path_expansion() {
        let config = StorageConfig {
            path: "~/state/gap.db".to_string(),
        };
        let expanded = config.expanded_path();
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("state/gap.db"));
    }
}
