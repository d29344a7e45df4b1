//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → KernelConfig (validated, immutable)
//!     → readers.rs (ConfigReader / SettingsReader views)
//!     → shared via Arc with the kernel and the HTTP host
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Route loading consumes the narrow reader traits, never the schema

pub mod loader;
pub mod readers;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use readers::{ConfigReader, SettingsReader};
pub use schema::{KernelConfig, KernelSection, ListenerConfig, ObservabilityConfig};
