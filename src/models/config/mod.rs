//! Configuration loading and validation.
//!
//! The relay is driven by a single JSON document describing both chains, the
//! signing key and the relay rules. See [`RelayConfig`].

use std::path::Path;

mod error;
mod relay_config;

pub use error::ConfigError;
pub use relay_config::{ChainConfig, RelayConfig, SecretValue};

/// Common interface for loading configuration files
pub trait ConfigLoader: Sized {
	/// Loads, resolves and validates a configuration file
	fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	/// Checks the configuration for structural problems
	fn validate(&self) -> Result<(), ConfigError>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}
}
