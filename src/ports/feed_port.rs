//! Price feed port trait.

use crate::domain::error::SignalError;
use crate::domain::price::PricePoint;

/// Source of one asset's historical price series.
///
/// Points come back in source order; the core validates ordering itself.
pub trait PriceFeedPort {
    fn fetch_prices(&self, coin: &str) -> Result<Vec<PricePoint>, SignalError>;
}
