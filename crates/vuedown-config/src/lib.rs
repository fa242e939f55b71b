pub mod config;
pub mod error;

pub use config::{Config, PluginSpec};
pub use error::ConfigError;
