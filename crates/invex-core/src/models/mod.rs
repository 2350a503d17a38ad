//! Data models: extraction records and configuration.

pub mod config;
pub mod record;
