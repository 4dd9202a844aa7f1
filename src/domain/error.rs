//! Domain error types.

/// Top-level error type for coinsignal.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("missing columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("insufficient data for {stage}: have {rows} rows, need {minimum}")]
    InsufficientData {
        stage: String,
        rows: usize,
        minimum: usize,
    },

    #[error("timestamps must be strictly ascending (violation at row {index})")]
    InvalidTimestamps { index: usize },

    #[error("price at row {index} must be finite and positive, got {value}")]
    InvalidPrice { index: usize, value: f64 },

    #[error("advisory provider failed: {reason}")]
    Advisory { reason: String },

    #[error("price feed error: {reason}")]
    Feed { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignalError {
    pub fn missing_columns(missing: &[&str]) -> Self {
        SignalError::MissingColumns {
            missing: missing.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn insufficient(stage: &str, rows: usize, minimum: usize) -> Self {
        SignalError::InsufficientData {
            stage: stage.to_string(),
            rows,
            minimum,
        }
    }
}

impl SignalError {
    /// Process exit status for this error family.
    pub fn exit_status(&self) -> u8 {
        match self {
            SignalError::Io(_) => 1,
            SignalError::ConfigParse { .. } | SignalError::ConfigInvalid { .. } => 2,
            SignalError::Feed { .. } => 3,
            SignalError::Advisory { .. } => 4,
            SignalError::MissingColumns { .. }
            | SignalError::InsufficientData { .. }
            | SignalError::InvalidTimestamps { .. }
            | SignalError::InvalidPrice { .. } => 5,
        }
    }
}

impl From<&SignalError> for std::process::ExitCode {
    fn from(err: &SignalError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
