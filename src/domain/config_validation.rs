//! Configuration validation.
//!
//! Validates fetch and backtest config fields before any network call.

use crate::domain::error::BacktestError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_fetch_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    if config.get_string("fetch", "base_url").is_none() {
        return Err(BacktestError::ConfigMissing {
            section: "fetch".to_string(),
            key: "base_url".to_string(),
        });
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_symbols(config)?;
    validate_dates(config)?;
    validate_initial_cash(config)?;
    validate_ema_period(config)?;
    validate_rates(config)?;
    validate_lot_size(config)?;
    Ok(())
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let symbols = config
        .get_string("backtest", "symbols")
        .or_else(|| config.get_string("backtest", "symbol"));
    match symbols {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(BacktestError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbols".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    // Dates are optional; when absent the pipeline defaults to the last
    // 365 days. When present they must parse and be ordered.
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(BacktestError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must not be after end_date".to_string(),
            });
        }
    }
    Ok(())
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, BacktestError> {
    match config.get_string("backtest", key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map(Some).map_err(|_| {
            BacktestError::ConfigInvalid {
                section: "backtest".to_string(),
                key: key.to_string(),
                reason: "invalid date format (expected YYYY-MM-DD)".to_string(),
            }
        }),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let value = config.get_double("backtest", "initial_cash", 1_000_000_000.0);
    if value <= 0.0 {
        return Err(BacktestError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_cash".to_string(),
            reason: "initial_cash must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_ema_period(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let value = config.get_int("backtest", "ema_period", 20);
    if value < 1 {
        return Err(BacktestError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "ema_period".to_string(),
            reason: "ema_period must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_rates(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    for key in ["fee_pct", "tax_pct", "friction_pct"] {
        let value = config.get_double("backtest", key, 0.0);
        if !(0.0..1.0).contains(&value) {
            return Err(BacktestError::ConfigInvalid {
                section: "backtest".to_string(),
                key: key.to_string(),
                reason: format!("{key} must be a fraction in [0, 1)"),
            });
        }
    }
    Ok(())
}

fn validate_lot_size(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let value = config.get_int("backtest", "lot_size", 100);
    if value < 1 {
        return Err(BacktestError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "lot_size".to_string(),
            reason: "lot_size must be at least 1".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        let config = adapter(
            "[fetch]\nbase_url = https://example.test/bars\n\
             [backtest]\nsymbols = ACB, GAS\nstart_date = 2023-09-20\n\
             end_date = 2024-09-20\ninitial_cash = 1000000000\nema_period = 20\n\
             fee_pct = 0.0015\ntax_pct = 0.001\nfriction_pct = 0.0015\nlot_size = 100\n",
        );
        assert!(validate_fetch_config(&config).is_ok());
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn missing_base_url_rejected() {
        let config = adapter("[backtest]\nsymbols = ACB\n");
        assert!(matches!(
            validate_fetch_config(&config),
            Err(BacktestError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn missing_symbols_rejected() {
        let config = adapter("[backtest]\nema_period = 20\n");
        assert!(matches!(
            validate_backtest_config(&config),
            Err(BacktestError::ConfigMissing { ref key, .. }) if key == "symbols"
        ));
    }

    #[test]
    fn single_symbol_key_accepted() {
        let config = adapter("[backtest]\nsymbol = ACB\n");
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn bad_date_rejected() {
        let config = adapter("[backtest]\nsymbols = ACB\nstart_date = 20-09-2023\n");
        assert!(matches!(
            validate_backtest_config(&config),
            Err(BacktestError::ConfigInvalid { ref key, .. }) if key == "start_date"
        ));
    }

    #[test]
    fn reversed_dates_rejected() {
        let config = adapter(
            "[backtest]\nsymbols = ACB\nstart_date = 2024-09-20\nend_date = 2023-09-20\n",
        );
        assert!(validate_backtest_config(&config).is_err());
    }

    #[test]
    fn zero_ema_period_rejected() {
        let config = adapter("[backtest]\nsymbols = ACB\nema_period = 0\n");
        assert!(matches!(
            validate_backtest_config(&config),
            Err(BacktestError::ConfigInvalid { ref key, .. }) if key == "ema_period"
        ));
    }

    #[test]
    fn rate_of_one_or_more_rejected() {
        let config = adapter("[backtest]\nsymbols = ACB\nfee_pct = 1.0\n");
        assert!(validate_backtest_config(&config).is_err());
    }

    #[test]
    fn negative_lot_size_rejected() {
        let config = adapter("[backtest]\nsymbols = ACB\nlot_size = -100\n");
        assert!(validate_backtest_config(&config).is_err());
    }
}
