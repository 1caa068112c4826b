//! CLI configuration shared by every command.

pub(crate) mod db;
pub(crate) mod logging;

pub(crate) use db::DatabaseConfig;
pub(crate) use logging::{LogFormat, LoggingConfig};
