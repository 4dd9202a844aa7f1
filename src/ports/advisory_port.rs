//! Advisory provider port trait.

use crate::domain::advisory::{Advice, AdvisoryRequest};
use crate::domain::error::SignalError;

/// An optional external collaborator producing advice for the latest row.
///
/// Retry and timeout policy belong to the implementation; callers never retry.
pub trait AdvisoryPort {
    fn advise(&self, request: &AdvisoryRequest) -> Result<Advice, SignalError>;
}
