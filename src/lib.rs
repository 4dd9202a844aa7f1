//! coinsignal: indicator, signal, and backtest engine for a daily crypto price series.
//!
//! Hexagonal architecture: pure computation in [`domain`], collaborator traits in
//! [`ports`], concrete I/O implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
