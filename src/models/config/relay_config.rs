//! Relay configuration loading and validation.
//!
//! The document describes the public and private chains, the key the relay signs
//! with, polling behaviour and the relay rules. ABIs may be inlined or read from
//! compiled artifact files; relative `abi_path` values resolve against the
//! directory of the configuration file.

use alloy::{
	json_abi::JsonAbi,
	primitives::{Address, B256},
	signers::local::PrivateKeySigner,
};
use serde::Deserialize;
use std::{
	fmt,
	path::{Path, PathBuf},
	str::FromStr,
	time::Duration,
};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
	models::{
		config::{error::ConfigError, ConfigLoader},
		ChainEndpoint, ContractBinding, ContractTag, RelayRule,
	},
	utils::constants::{
		DEFAULT_GAS_LIMIT, DEFAULT_POLL_INTERVAL_MS, DEFAULT_RECEIPT_TIMEOUT_MS,
	},
};

fn default_gas_limit() -> u64 {
	DEFAULT_GAS_LIMIT
}

fn default_poll_interval_ms() -> u64 {
	DEFAULT_POLL_INTERVAL_MS
}

fn default_receipt_timeout_ms() -> u64 {
	DEFAULT_RECEIPT_TIMEOUT_MS
}

/// A secret configuration value, wiped from memory on drop
///
/// Values of the form `${NAME}` are read from the environment variable `NAME`
/// when resolved.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}

	/// Returns the secret, expanding an environment variable reference
	pub fn resolve(&self) -> Result<Zeroizing<String>, ConfigError> {
		let raw = self.0.trim();
		match raw.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
			Some(var) => std::env::var(var).map(Zeroizing::new).map_err(|_| {
				ConfigError::validation_error(format!(
					"environment variable '{}' referenced by a secret is not set",
					var
				))
			}),
			None => Ok(Zeroizing::new(raw.to_string())),
		}
	}

	/// Parses the secret as a hex-encoded secp256k1 private key
	pub fn to_signer(&self) -> Result<PrivateKeySigner, ConfigError> {
		let resolved = self.resolve()?;
		let key = B256::from_str(resolved.trim())
			.map_err(|_| ConfigError::validation_error("signing_key is not a 32-byte hex value"))?;
		PrivateKeySigner::from_bytes(&key).map_err(|e| {
			ConfigError::validation_error(format!("signing_key is not a valid private key: {}", e))
		})
	}
}

impl fmt::Debug for SecretValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretValue(REDACTED)")
	}
}

/// One side of the relay: where to connect and which contract to talk to
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
	pub rpc_url: String,
	/// Overrides the transport inferred from the URL scheme
	#[serde(default)]
	pub transport: Option<crate::models::TransportKind>,
	pub contract_address: Address,
	/// Inline ABI, either a bare array or a compiled artifact with an `abi` key
	#[serde(default)]
	pub abi: Option<serde_json::Value>,
	/// Path to an ABI or compiled artifact file
	#[serde(default)]
	pub abi_path: Option<PathBuf>,
	#[serde(default = "default_gas_limit")]
	pub gas_limit: u64,
	/// Fixed legacy gas price; queried from the node when absent
	#[serde(default)]
	pub gas_price_wei: Option<u128>,
}

impl ChainConfig {
	/// The RPC endpoint for this chain
	pub fn endpoint(&self) -> Result<ChainEndpoint, ConfigError> {
		let mut endpoint =
			ChainEndpoint::from_url(self.rpc_url.clone()).map_err(ConfigError::validation_error)?;
		if let Some(transport) = self.transport {
			endpoint.transport = transport;
		}
		Ok(endpoint)
	}

	/// Reads and parses the contract ABI
	///
	/// # Arguments
	/// * `base_dir` - Directory relative `abi_path` values are resolved against
	pub fn load_abi(&self, base_dir: Option<&Path>) -> Result<JsonAbi, ConfigError> {
		let value = match (&self.abi, &self.abi_path) {
			(Some(abi), None) => abi.clone(),
			(None, Some(path)) => {
				let path = match base_dir {
					Some(dir) if path.is_relative() => dir.join(path),
					_ => path.clone(),
				};
				let file = std::fs::File::open(&path).map_err(|e| {
					ConfigError::file_error(format!(
						"failed to open ABI file {}: {}",
						path.display(),
						e
					))
				})?;
				serde_json::from_reader(file)?
			}
			_ => {
				return Err(ConfigError::validation_error(
					"exactly one of 'abi' or 'abi_path' must be set",
				))
			}
		};

		let abi = match value {
			serde_json::Value::Object(mut artifact) => match artifact.remove("abi") {
				Some(abi) => abi,
				None => {
					return Err(ConfigError::parse_error(
						"ABI object does not contain an 'abi' field",
					))
				}
			},
			other => other,
		};

		serde_json::from_value(abi)
			.map_err(|e| ConfigError::parse_error(format!("invalid ABI: {}", e)))
	}

	fn validate(&self, tag: ContractTag) -> Result<(), ConfigError> {
		self.endpoint().map_err(|e| {
			ConfigError::validation_error(format!("{} chain: {}", tag, e))
		})?;

		if self.abi.is_some() == self.abi_path.is_some() {
			return Err(ConfigError::validation_error(format!(
				"{} chain: exactly one of 'abi' or 'abi_path' must be set",
				tag
			)));
		}

		if self.gas_limit == 0 {
			return Err(ConfigError::validation_error(format!(
				"{} chain: gas_limit must be greater than 0",
				tag
			)));
		}

		if self.gas_price_wei == Some(0) {
			return Err(ConfigError::validation_error(format!(
				"{} chain: gas_price_wei must be greater than 0 when set",
				tag
			)));
		}

		Ok(())
	}
}

/// Complete relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
	pub public: ChainConfig,
	pub private: ChainConfig,
	/// Key used to sign transactions on both chains
	pub signing_key: SecretValue,
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	#[serde(default = "default_receipt_timeout_ms")]
	pub receipt_timeout_ms: u64,
	/// First block to watch on the public chain; latest when absent
	#[serde(default)]
	pub from_block: Option<u64>,
	pub rules: Vec<RelayRule>,
	/// Directory of the file the configuration was loaded from
	#[serde(skip)]
	pub base_dir: Option<PathBuf>,
}

impl RelayConfig {
	/// Parses and validates a configuration delivered as a JSON value
	pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigError> {
		let config: RelayConfig = serde_json::from_value(value)?;
		config.validate()?;
		Ok(config)
	}

	pub fn chain(&self, tag: ContractTag) -> &ChainConfig {
		match tag {
			ContractTag::Public => &self.public,
			ContractTag::Private => &self.private,
		}
	}

	/// Builds the contract binding for one side of the relay
	pub fn binding(&self, tag: ContractTag) -> Result<ContractBinding, ConfigError> {
		let chain = self.chain(tag);
		let abi = chain.load_abi(self.base_dir.as_deref())?;
		Ok(ContractBinding::new(tag, chain.contract_address, abi))
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn receipt_timeout(&self) -> Duration {
		Duration::from_millis(self.receipt_timeout_ms)
	}
}

impl ConfigLoader for RelayConfig {
	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		if !Self::is_json_file(path) {
			return Err(ConfigError::file_error(format!(
				"configuration file must be a .json file: {}",
				path.display()
			)));
		}

		let file = std::fs::File::open(path)?;
		let mut config: RelayConfig = serde_json::from_reader(file)?;
		config.base_dir = path.parent().map(Path::to_path_buf);

		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		self.public.validate(ContractTag::Public)?;
		self.private.validate(ContractTag::Private)?;

		if self.signing_key.is_empty() {
			return Err(ConfigError::validation_error("signing_key must not be empty"));
		}

		if self.poll_interval_ms == 0 {
			return Err(ConfigError::validation_error(
				"poll_interval_ms must be greater than 0",
			));
		}

		if self.receipt_timeout_ms < self.poll_interval_ms {
			return Err(ConfigError::validation_error(
				"receipt_timeout_ms must be at least poll_interval_ms",
			));
		}

		if self.rules.is_empty() {
			return Err(ConfigError::validation_error(
				"at least one relay rule is required",
			));
		}

		for rule in &self.rules {
			if rule.event_name.trim().is_empty() {
				return Err(ConfigError::validation_error(
					"relay rule event_name must not be empty",
				));
			}
			if rule.target_method.name.trim().is_empty() {
				return Err(ConfigError::validation_error(format!(
					"relay rule '{}' has an empty target method name",
					rule.event_name
				)));
			}
			if let Some(callback) = &rule.callback {
				let blank_event = callback
					.event_name
					.as_deref()
					.is_some_and(|name| name.trim().is_empty());
				if blank_event || callback.method.trim().is_empty() {
					return Err(ConfigError::validation_error(format!(
						"relay rule '{}' has an incomplete callback",
						rule.event_name
					)));
				}
			}
		}

		Ok(())
	}
}
