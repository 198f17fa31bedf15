//! Tests for core types

#[cfg(test)]
mod tests {
    use super::super::types::*;
    use chrono::Utc;

    #[test]
    fn test_investment_accepts_valid_amounts() {
        for value in [100, 200, 1000, 5500, 10_000] {
            let amount = InvestmentAmount::new(value).unwrap();
            assert_eq!(amount.get(), f64::from(value));
        }
    }

    #[test]
    fn test_investment_rejects_out_of_range() {
        assert!(InvestmentAmount::new(0).is_err());
        assert!(InvestmentAmount::new(99).is_err());
        assert!(InvestmentAmount::new(10_100).is_err());
    }

    #[test]
    fn test_investment_rejects_off_step_values() {
        assert!(InvestmentAmount::new(150).is_err());
        assert!(InvestmentAmount::new(1001).is_err());
        assert!(InvestmentAmount::new(9999).is_err());
    }

    #[test]
    fn test_investment_default() {
        assert_eq!(InvestmentAmount::default().get(), 1000.0);
    }

    #[test]
    fn test_persisted_result_json_shape() {
        let now = Utc::now();
        let result = PersistedResult {
            reference_price: 0.29,
            comparison_price: 0.310764,
            captured_at: now,
        };

        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["bybit"], 0.29);
        assert_eq!(json["kvamdex"], 0.310764);
        assert_eq!(json["timestamp"], now.timestamp_millis());
    }

    #[test]
    fn test_persisted_result_reads_legacy_record() {
        let raw = r#"{"bybit": 0.29, "kvamdex": 0.310764, "timestamp": 1724972400000}"#;
        let result: PersistedResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.reference_price, 0.29);
        assert_eq!(result.comparison_price, 0.310764);
        assert_eq!(result.captured_at.timestamp_millis(), 1_724_972_400_000);
    }

    #[test]
    fn test_quote_is_superseded_not_mutated() {
        let first = Quote {
            reference_price: 0.29,
            fetched_at: Utc::now(),
        };
        let second = Quote {
            reference_price: 0.31,
            fetched_at: Utc::now(),
        };
        assert_ne!(first, second);
        assert_eq!(first.reference_price, 0.29);
    }
}
