//! TCBS stock-insight HTTP data adapter.
//!
//! Fetches daily close-price history from the TCBS bars-long-term endpoint.
//! Transport failures and non-200 statuses are retried per the configured
//! [`RetryPolicy`]; individual malformed records are skipped with a warning
//! so one bad row never discards a whole series.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::adapters::retry::RetryPolicy;
use crate::domain::error::BacktestError;
use crate::domain::price_bar::{sort_bars, PriceBar};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

/// Environment variable holding the TCBS API key. Checked before the
/// config file so secrets stay out of version-controlled configs.
pub const API_KEY_ENV: &str = "TCBS_API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_DELAY: Duration = Duration::from_secs(5);
const MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RESOLUTION: &str = "D";

#[derive(Debug, Deserialize)]
struct BarsResponse {
    #[serde(default)]
    data: Vec<BarRecord>,
}

/// One raw record. The endpoint has shipped two field layouts over time:
/// `tradingDate`/`close` and the terse `t`/`p` (unix seconds, price).
#[derive(Debug, Deserialize)]
struct BarRecord {
    #[serde(rename = "tradingDate")]
    trading_date: Option<String>,
    t: Option<i64>,
    close: Option<f64>,
    p: Option<f64>,
}

pub struct TcbsAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    resolution: String,
    api_key: String,
    retry: RetryPolicy,
}

impl TcbsAdapter {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, BacktestError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BacktestError::Http {
                reason: format!("client setup failed: {e}"),
            })?;
        Ok(TcbsAdapter {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            resolution: DEFAULT_RESOLUTION.to_string(),
            api_key: api_key.to_string(),
            retry: RetryPolicy::fixed(MAX_ATTEMPTS, RETRY_DELAY),
        })
    }

    /// Build an adapter from the `[fetch]` config section. The API key is
    /// read from [`API_KEY_ENV`] first and the config file second.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BacktestError> {
        let base_url =
            config
                .get_string("fetch", "base_url")
                .ok_or_else(|| BacktestError::ConfigMissing {
                    section: "fetch".into(),
                    key: "base_url".into(),
                })?;
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| config.get_string("fetch", "api_key"))
            .ok_or_else(|| BacktestError::ConfigMissing {
                section: "fetch".into(),
                key: "api_key".into(),
            })?;
        let mut adapter = Self::new(&base_url, &api_key)?;
        if let Some(resolution) = config.get_string("fetch", "resolution") {
            adapter.resolution = resolution;
        }
        Ok(adapter)
    }

    /// Replace the retry policy. Tests use this to drop the delay.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn request_url(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> String {
        let from_ts = day_start(from).and_utc().timestamp();
        let to_ts = day_end(to).and_utc().timestamp();
        format!(
            "{}?ticker={}&type=stock&resolution={}&from={}&to={}",
            self.base_url, symbol, self.resolution, from_ts, to_ts
        )
    }

    fn fetch_body(&self, url: &str) -> Result<BarsResponse, BacktestError> {
        self.retry.run(|| {
            let response = self
                .client
                .get(url)
                .header("X-Fiin-Key", &self.api_key)
                .header("Accept", "application/json")
                .send()
                .map_err(|e| BacktestError::Http {
                    reason: e.to_string(),
                })?;
            let status = response.status();
            if status != reqwest::StatusCode::OK {
                return Err(BacktestError::Http {
                    reason: format!("status {status}"),
                });
            }
            response
                .json::<BarsResponse>()
                .map_err(|e| BacktestError::MalformedResponse {
                    reason: e.to_string(),
                })
        })
    }
}

impl DataPort for TcbsAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceBar>, BacktestError> {
        let url = self.request_url(symbol, from, to);
        debug!(symbol, %url, "fetching history");

        let body = match self.fetch_body(&url) {
            Ok(body) => body,
            Err(err) => {
                warn!(symbol, error = %err, "all fetch attempts failed");
                return Err(BacktestError::NoData {
                    symbol: symbol.to_string(),
                });
            }
        };

        let window = day_start(from)..=day_end(to);
        let mut bars = Vec::with_capacity(body.data.len());
        for record in &body.data {
            match parse_record(record) {
                Some(bar) if window.contains(&bar.timestamp) => bars.push(bar),
                Some(_) => {}
                None => warn!(symbol, ?record, "skipping malformed record"),
            }
        }
        sort_bars(&mut bars);
        debug!(symbol, bars = bars.len(), "history fetched");
        Ok(bars)
    }
}

fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

fn day_end(date: NaiveDate) -> NaiveDateTime {
    day_start(date) + chrono::Duration::seconds(86_399)
}

fn parse_record(record: &BarRecord) -> Option<PriceBar> {
    let timestamp = match (&record.trading_date, record.t) {
        (Some(raw), _) => parse_trading_date(raw)?,
        (None, Some(unix)) => DateTime::from_timestamp(unix, 0)?.naive_utc(),
        (None, None) => return None,
    };
    let close = record.close.or(record.p)?;
    if !close.is_finite() {
        return None;
    }
    Some(PriceBar::new(timestamp, close))
}

fn parse_trading_date(raw: &str) -> Option<NaiveDateTime> {
    // "2024-01-02T00:00:00.000Z" with or without the fractional part,
    // falling back to a bare date.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.fZ")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(day_start)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn request_url_carries_query_params() {
        let adapter = TcbsAdapter::new("https://example.com/bars-long-term", "k").unwrap();
        let url = adapter.request_url("FPT", date(2024, 1, 1), date(2024, 1, 31));
        assert!(url.starts_with("https://example.com/bars-long-term?ticker=FPT"));
        assert!(url.contains("&type=stock&resolution=D&"));
        assert!(url.contains(&format!("&from={}", day_start(date(2024, 1, 1)).and_utc().timestamp())));
        assert!(url.contains(&format!("&to={}", day_end(date(2024, 1, 31)).and_utc().timestamp())));
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let adapter = TcbsAdapter::new("https://example.com/bars/", "k").unwrap();
        let url = adapter.request_url("ACB", date(2024, 1, 1), date(2024, 1, 2));
        assert!(url.starts_with("https://example.com/bars?ticker=ACB"));
    }

    #[test]
    fn parses_trading_date_layout() {
        let record = BarRecord {
            trading_date: Some("2024-03-15T00:00:00.000Z".into()),
            t: None,
            close: Some(101.5),
            p: None,
        };
        let bar = parse_record(&record).unwrap();
        assert_eq!(bar.timestamp.date(), date(2024, 3, 15));
        assert_eq!(bar.close, 101.5);
    }

    #[test]
    fn parses_terse_layout() {
        let record = BarRecord {
            trading_date: None,
            t: Some(1_704_153_600), // 2024-01-02 00:00:00 UTC
            close: None,
            p: Some(88.0),
        };
        let bar = parse_record(&record).unwrap();
        assert_eq!(bar.timestamp.date(), date(2024, 1, 2));
        assert_eq!(bar.close, 88.0);
    }

    #[test]
    fn bad_timestamp_or_missing_price_is_skipped() {
        let bad_date = BarRecord {
            trading_date: Some("not-a-date".into()),
            t: None,
            close: Some(10.0),
            p: None,
        };
        assert!(parse_record(&bad_date).is_none());

        let no_price = BarRecord {
            trading_date: Some("2024-01-02T00:00:00Z".into()),
            t: None,
            close: None,
            p: None,
        };
        assert!(parse_record(&no_price).is_none());
    }

    #[test]
    fn non_finite_close_is_skipped() {
        let record = BarRecord {
            trading_date: Some("2024-01-02T00:00:00Z".into()),
            t: None,
            close: Some(f64::NAN),
            p: None,
        };
        assert!(parse_record(&record).is_none());
    }

    #[test]
    fn bare_date_string_parses_to_midnight() {
        let parsed = parse_trading_date("2024-06-01").unwrap();
        assert_eq!(parsed, day_start(date(2024, 6, 1)));
    }
}
