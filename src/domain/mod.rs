//! Core domain types and logic.

pub mod advisory;
pub mod analysis;
pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod fibonacci;
pub mod indicator;
pub mod indicator_engine;
pub mod price;
pub mod signal;
pub mod summary;
