//! Configuration for the Chime runtime.
//!
//! Settings come from built-in defaults, an optional TOML file and `CHIME_*`
//! environment variables. See [`ConfigLoader`] for the merge order.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ChimeConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, ServerConfig, SlackConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
