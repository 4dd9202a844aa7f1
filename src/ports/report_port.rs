//! Report generation port trait.

use crate::domain::analysis::Analysis;
use crate::domain::error::SignalError;
use std::path::Path;

/// Port for persisting a finished analysis.
pub trait ReportPort {
    fn write(&self, analysis: &Analysis, output_path: &Path) -> Result<(), SignalError>;
}
