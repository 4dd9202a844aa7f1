//! Concrete adapter implementations for ports.

pub mod csv_export_adapter;
pub mod csv_feed_adapter;
pub mod file_config_adapter;
pub mod json_advisory_adapter;
pub mod markdown_report_adapter;
