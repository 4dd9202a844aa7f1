//! Collaborator traits implemented by [`crate::adapters`].

pub mod advisory_port;
pub mod config_port;
pub mod feed_port;
pub mod report_port;
