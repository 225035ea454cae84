//! Domain error types.

/// Top-level error type for emacross.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("http request failed: {reason}")]
    Http { reason: String },

    #[error("no historical data for {symbol}")]
    NoData { symbol: String },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid transaction: {reason}")]
    InvalidTransaction { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. } => 2,
            BacktestError::Http { .. } | BacktestError::MalformedResponse { .. } => 3,
            BacktestError::InvalidTransaction { .. } => 4,
            BacktestError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
