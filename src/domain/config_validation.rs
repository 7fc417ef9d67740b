//! Configuration validation.
//!
//! Checks every section before any network access happens.

use crate::domain::error::TurnscreenError;
use crate::ports::config_port::ConfigPort;

/// Sales-growth thresholds Finviz offers as screener filters.
pub const SALES_GROWTH_BUCKETS: [u32; 6] = [5, 10, 15, 20, 25, 30];

pub const SCREENER_SOURCES: [&str; 3] = ["finviz", "file", "csv"];
pub const FINANCIALS_SOURCES: [&str; 2] = ["yahoo", "csv"];
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
pub const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

pub const DEFAULT_SALES_GROWTH_PCT: i64 = 20;
pub const DEFAULT_LOOKBACK_YEARS: i64 = 4;
pub const MIN_LOOKBACK_YEARS: i64 = 3;
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TurnscreenError> {
    validate_thresholds(config)?;
    validate_screener(config)?;
    validate_financials(config)?;
    validate_output(config)?;
    validate_logging(config)?;
    Ok(())
}

pub fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), TurnscreenError> {
    let min_cagr = config.get_double("thresholds", "min_revenue_cagr", 0.20);
    if !min_cagr.is_finite() || min_cagr <= -1.0 {
        return Err(invalid(
            "thresholds",
            "min_revenue_cagr",
            "min_revenue_cagr must be greater than -1",
        ));
    }

    let min_cap = config.get_double("thresholds", "min_market_cap", 100_000_000.0);
    if !min_cap.is_finite() || min_cap < 0.0 {
        return Err(invalid(
            "thresholds",
            "min_market_cap",
            "min_market_cap must be non-negative",
        ));
    }

    let max_cap = config.get_double("thresholds", "max_market_cap", 100_000_000_000.0);
    if !max_cap.is_finite() || max_cap <= min_cap {
        return Err(invalid(
            "thresholds",
            "max_market_cap",
            "max_market_cap must be greater than min_market_cap",
        ));
    }

    let breakeven = config.get_double("thresholds", "max_breakeven_loss", 20_000_000.0);
    if !breakeven.is_finite() || breakeven < 0.0 {
        return Err(invalid(
            "thresholds",
            "max_breakeven_loss",
            "max_breakeven_loss must be non-negative",
        ));
    }
    Ok(())
}

fn validate_screener(config: &dyn ConfigPort) -> Result<(), TurnscreenError> {
    let source = config
        .get_string("screener", "source")
        .unwrap_or_else(|| "finviz".to_string());

    match source.as_str() {
        "finviz" => {
            let pct = config.get_int("screener", "min_sales_growth_pct", DEFAULT_SALES_GROWTH_PCT);
            let in_bucket = u32::try_from(pct).is_ok_and(|p| SALES_GROWTH_BUCKETS.contains(&p));
            if !in_bucket {
                return Err(invalid(
                    "screener",
                    "min_sales_growth_pct",
                    &format!("must be one of {:?}", SALES_GROWTH_BUCKETS),
                ));
            }
            Ok(())
        }
        "file" => require_non_empty(config, "screener", "path"),
        "csv" => {
            if non_empty(config, "screener", "data_dir") || non_empty(config, "financials", "data_dir") {
                Ok(())
            } else {
                Err(missing("screener", "data_dir"))
            }
        }
        other => Err(invalid(
            "screener",
            "source",
            &format!("unknown source '{}', expected one of {:?}", other, SCREENER_SOURCES),
        )),
    }
}

fn validate_financials(config: &dyn ConfigPort) -> Result<(), TurnscreenError> {
    let source = config
        .get_string("financials", "source")
        .unwrap_or_else(|| "yahoo".to_string());

    match source.as_str() {
        "yahoo" => {
            let lookback = config.get_int("financials", "lookback_years", DEFAULT_LOOKBACK_YEARS);
            if lookback < MIN_LOOKBACK_YEARS {
                return Err(invalid(
                    "financials",
                    "lookback_years",
                    &format!("lookback_years must be at least {}", MIN_LOOKBACK_YEARS),
                ));
            }
            if config.get_int("financials", "timeout_secs", DEFAULT_TIMEOUT_SECS) <= 0 {
                return Err(invalid(
                    "financials",
                    "timeout_secs",
                    "timeout_secs must be positive",
                ));
            }
            if config.get_int("financials", "request_delay_ms", 0) < 0 {
                return Err(invalid(
                    "financials",
                    "request_delay_ms",
                    "request_delay_ms must be non-negative",
                ));
            }
            Ok(())
        }
        "csv" => require_non_empty(config, "financials", "data_dir"),
        other => Err(invalid(
            "financials",
            "source",
            &format!("unknown source '{}', expected one of {:?}", other, FINANCIALS_SOURCES),
        )),
    }
}

fn validate_output(config: &dyn ConfigPort) -> Result<(), TurnscreenError> {
    let csv_path = config.get_string("output", "csv_path");
    let xlsx_path = config.get_string("output", "xlsx_path");

    for (key, value) in [("csv_path", &csv_path), ("xlsx_path", &xlsx_path)] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(invalid("output", key, "path must not be empty"));
        }
    }

    if let (Some(a), Some(b)) = (&csv_path, &xlsx_path) {
        if a.trim() == b.trim() {
            return Err(invalid(
                "output",
                "xlsx_path",
                "csv_path and xlsx_path must differ",
            ));
        }
    }
    Ok(())
}

fn validate_logging(config: &dyn ConfigPort) -> Result<(), TurnscreenError> {
    if let Some(level) = config.get_string("logging", "level") {
        if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            return Err(invalid(
                "logging",
                "level",
                &format!("expected one of {:?}", LOG_LEVELS),
            ));
        }
    }
    if let Some(format) = config.get_string("logging", "format") {
        if !LOG_FORMATS.contains(&format.to_lowercase().as_str()) {
            return Err(invalid(
                "logging",
                "format",
                &format!("expected one of {:?}", LOG_FORMATS),
            ));
        }
    }
    Ok(())
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> bool {
    config
        .get_string(section, key)
        .is_some_and(|v| !v.trim().is_empty())
}

fn require_non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), TurnscreenError> {
    if non_empty(config, section, key) {
        Ok(())
    } else {
        Err(missing(section, key))
    }
}

fn missing(section: &str, key: &str) -> TurnscreenError {
    TurnscreenError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> TurnscreenError {
    TurnscreenError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockConfig {
        values: HashMap<(String, String), String>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                values: HashMap::new(),
            }
        }

        fn set(mut self, section: &str, key: &str, value: &str) -> Self {
            self.values
                .insert((section.to_string(), key.to_string()), value.to_string());
            self
        }
    }

    impl ConfigPort for MockConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.values
                .get(&(section.to_string(), key.to_string()))
                .cloned()
        }

        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
    }

    fn assert_invalid(result: Result<(), TurnscreenError>, expected_key: &str) {
        match result {
            Err(TurnscreenError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected ConfigInvalid for {expected_key}, got {other:?}"),
        }
    }

    #[test]
    fn empty_config_uses_valid_defaults() {
        assert!(validate_config(&MockConfig::new()).is_ok());
    }

    #[test]
    fn cagr_floor_must_exceed_minus_one() {
        let config = MockConfig::new().set("thresholds", "min_revenue_cagr", "-1.0");
        assert_invalid(validate_config(&config), "min_revenue_cagr");
    }

    #[test]
    fn market_cap_bounds_ordered() {
        let config = MockConfig::new()
            .set("thresholds", "min_market_cap", "5e9")
            .set("thresholds", "max_market_cap", "1e9");
        assert_invalid(validate_config(&config), "max_market_cap");
    }

    #[test]
    fn negative_market_cap_floor_rejected() {
        let config = MockConfig::new().set("thresholds", "min_market_cap", "-1");
        assert_invalid(validate_config(&config), "min_market_cap");
    }

    #[test]
    fn negative_breakeven_rejected() {
        let config = MockConfig::new().set("thresholds", "max_breakeven_loss", "-5");
        assert_invalid(validate_config(&config), "max_breakeven_loss");
    }

    #[test]
    fn growth_bucket_must_be_supported() {
        let config = MockConfig::new().set("screener", "min_sales_growth_pct", "22");
        assert_invalid(validate_config(&config), "min_sales_growth_pct");

        let config = MockConfig::new().set("screener", "min_sales_growth_pct", "25");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_sources_rejected() {
        let config = MockConfig::new().set("screener", "source", "bloomberg");
        assert_invalid(validate_config(&config), "source");

        let config = MockConfig::new().set("financials", "source", "sec");
        assert_invalid(validate_config(&config), "source");
    }

    #[test]
    fn file_screener_requires_path() {
        let config = MockConfig::new().set("screener", "source", "file");
        assert!(matches!(
            validate_config(&config),
            Err(TurnscreenError::ConfigMissing { key, .. }) if key == "path"
        ));
    }

    #[test]
    fn csv_screener_falls_back_to_financials_dir() {
        let config = MockConfig::new()
            .set("screener", "source", "csv")
            .set("financials", "source", "csv")
            .set("financials", "data_dir", "/data");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn csv_financials_requires_data_dir() {
        let config = MockConfig::new().set("financials", "source", "csv");
        assert!(matches!(
            validate_config(&config),
            Err(TurnscreenError::ConfigMissing { key, .. }) if key == "data_dir"
        ));
    }

    #[test]
    fn lookback_must_cover_three_years() {
        let config = MockConfig::new().set("financials", "lookback_years", "2");
        assert_invalid(validate_config(&config), "lookback_years");
    }

    #[test]
    fn output_paths_must_differ() {
        let config = MockConfig::new()
            .set("output", "csv_path", "out.dat")
            .set("output", "xlsx_path", "out.dat");
        assert_invalid(validate_config(&config), "xlsx_path");
    }

    #[test]
    fn logging_values_checked() {
        let config = MockConfig::new().set("logging", "level", "loud");
        assert_invalid(validate_config(&config), "level");

        let config = MockConfig::new().set("logging", "format", "xml");
        assert_invalid(validate_config(&config), "format");

        let config = MockConfig::new()
            .set("logging", "level", "DEBUG")
            .set("logging", "format", "json");
        assert!(validate_config(&config).is_ok());
    }
}
