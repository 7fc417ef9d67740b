//! Domain error types.

/// Top-level error type for turnscreen.
#[derive(Debug, thiserror::Error)]
pub enum TurnscreenError {
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

    #[error("screener unavailable: {reason}")]
    ScreenerUnavailable { reason: String },

    #[error("fetch failed for {ticker}: {reason}")]
    Fetch { ticker: String, reason: String },

    #[error("malformed financial data for {ticker}: {reason}")]
    MalformedData { ticker: String, reason: String },

    #[error("incomplete history for {ticker}: have {years} fiscal years, need {required}")]
    IncompleteHistory {
        ticker: String,
        years: usize,
        required: usize,
    },

    #[error("failed to render {format} output: {reason}")]
    Render { format: String, reason: String },

    #[error("export to {path} failed: {reason}")]
    Export { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TurnscreenError {
    /// True for errors scoped to a single ticker; the run skips the ticker and carries on.
    pub fn is_per_ticker(&self) -> bool {
        matches!(
            self,
            TurnscreenError::Fetch { .. }
                | TurnscreenError::MalformedData { .. }
                | TurnscreenError::IncompleteHistory { .. }
        )
    }
}

impl From<&TurnscreenError> for std::process::ExitCode {
    fn from(err: &TurnscreenError) -> Self {
        let code: u8 = match err {
            TurnscreenError::Io(_)
            | TurnscreenError::Render { .. }
            | TurnscreenError::Export { .. } => 1,
            TurnscreenError::ConfigParse { .. }
            | TurnscreenError::ConfigMissing { .. }
            | TurnscreenError::ConfigInvalid { .. } => 2,
            TurnscreenError::ScreenerUnavailable { .. } => 3,
            TurnscreenError::Fetch { .. }
            | TurnscreenError::MalformedData { .. }
            | TurnscreenError::IncompleteHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
