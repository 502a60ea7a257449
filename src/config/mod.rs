//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ClientConfig, DatabaseConfig)
//! - [`locale`]: Timestamp rendering (LocaleConfig)
//! - [`logging`]: Text log destination and templates (LoggingConfig)
//! - [`validation`]: Startup checks returning every problem found

mod defaults;
mod locale;
mod logging;
mod types;
pub mod validation;

pub use locale::{LocaleConfig, parse_utc_offset};
pub use logging::LoggingConfig;
pub use types::{ClientConfig, Config, ConfigError, DatabaseConfig, DebugConfig, StateConfig};
pub use validation::{ValidationError, validate};
