//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → TOML file, if given (loader.rs)
//!     → environment overrides (loader.rs)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable, passed down explicitly)
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, ConfigError};
pub use schema::ClientConfig;
pub use validation::{validate_config, ConfigValidationError};
