//! Configuration management for the Remi Discord bot
//!
//! All configuration comes from environment variables; there is no config
//! file. See [`loader::ConfigLoader`] for the recognized variables.

pub mod loader;
pub mod settings;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::Config;
