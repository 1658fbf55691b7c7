//! Shared configuration library for Propex.
//!
//! Centralizes environment-driven config loading and validation so the
//! gateway and the listing server agree on defaults and managed keys (the
//! JWT secret above all, which both sides must share).

pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    AmqpConfig, AuthConfig, Config, ConfigMetadata, DatabaseConfig, GatewayConfig, GatewayRoute,
    RedisConfig, ServerConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
