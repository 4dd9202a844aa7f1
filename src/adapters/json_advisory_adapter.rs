//! Advisory provider backed by a pre-computed JSON response file.

use crate::domain::advisory::{Advice, AdvisoryRequest};
use crate::domain::error::SignalError;
use crate::ports::advisory_port::AdvisoryPort;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Reads `{"strategy":[{"trend":..,"strategy":..,"target":[..]}]}` on every
/// call. A missing or malformed file is an advisory failure, which the caller
/// answers with the rule-based fallback.
pub struct JsonAdvisoryAdapter {
    path: PathBuf,
}

impl JsonAdvisoryAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl AdvisoryPort for JsonAdvisoryAdapter {
    fn advise(&self, request: &AdvisoryRequest) -> Result<Advice, SignalError> {
        let text = fs::read_to_string(&self.path).map_err(|e| SignalError::Advisory {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let advice: Advice = serde_json::from_str(&text).map_err(|e| SignalError::Advisory {
            reason: format!("invalid advisory response: {}", e),
        })?;
        debug!(coin = %request.coin, notes = advice.notes.len(), "loaded advisory response");
        Ok(advice)
    }
}
