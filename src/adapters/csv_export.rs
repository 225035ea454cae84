//! CSV export of fetched price series.

use std::path::Path;

use crate::domain::error::BacktestError;
use crate::domain::price_bar::PriceBar;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write `timestamp,close` rows, one per bar, header included.
pub fn write_history<P: AsRef<Path>>(bars: &[PriceBar], path: P) -> Result<(), BacktestError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_io)?;
    writer.write_record(["timestamp", "close"]).map_err(csv_io)?;
    for bar in bars {
        writer
            .write_record([
                bar.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                bar.close.to_string(),
            ])
            .map_err(csv_io)?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_io(err: csv::Error) -> BacktestError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => BacktestError::Io(io),
        other => BacktestError::MalformedResponse {
            reason: format!("csv write failed: {other:?}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar::new(
            NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            close,
        )
    }

    #[test]
    fn writes_header_and_rows() {
        let file = NamedTempFile::new().unwrap();
        write_history(&[bar(2, 101.5), bar(3, 99.0)], file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "timestamp,close");
        assert_eq!(lines[1], "2024-01-02 00:00:00,101.5");
        assert_eq!(lines[2], "2024-01-03 00:00:00,99");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_series_writes_header_only() {
        let file = NamedTempFile::new().unwrap();
        write_history(&[], file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content.trim(), "timestamp,close");
    }

    #[test]
    fn unwritable_path_surfaces_io_error() {
        let result = write_history(&[bar(2, 10.0)], "/nonexistent/dir/out.csv");
        assert!(matches!(result, Err(BacktestError::Io(_))));
    }
}
