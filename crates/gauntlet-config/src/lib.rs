//! Configuration module for the Gauntlet receiver.
//!
//! Configuration is read from a TOML file. `${VAR}` and `${VAR:-default}`
//! placeholders are substituted from the environment before parsing, so
//! relayer keys can stay out of the file. Parsed configurations are
//! validated before they are handed to the builder.

#[cfg(any(test, feature = "testing"))]
pub mod builders {
	pub mod config;
}

use alloy_primitives::Address;
use gauntlet_types::DEFAULT_DOMAIN_NAME;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Receiver identity and signing domain.
	pub receiver: ReceiverConfig,
	/// Storage backend for the custody and fill ledgers.
	pub storage: StorageConfig,
	/// Signing account, needed only to build messages.
	pub account: Option<AccountConfig>,
}

/// Receiver identity and authorization settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReceiverConfig {
	/// Administrator of the receiver.
	pub admin: Address,
	/// Account under which the receiver custodies funds.
	pub address: Address,
	/// Chain the receiver executes on; bound into the signing domain.
	pub chain_id: u64,
	/// EIP-712 domain name relayers sign under.
	#[serde(default = "default_domain_name")]
	pub domain_name: String,
	/// Protocol version the receiver runs.
	#[serde(default)]
	pub version: u32,
	/// Bridge endpoint allowed to deliver messages. Unrestricted when unset.
	pub endpoint: Option<Address>,
	/// Refuse a second fill for an auction id already paid out.
	#[serde(default)]
	pub replay_protection: bool,
}

fn default_domain_name() -> String {
	DEFAULT_DOMAIN_NAME.to_string()
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for account management.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of account implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads, resolves and validates a configuration file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Validates the configuration.
	///
	/// - receiver admin and custody address are non-zero, chain id is set
	/// - domain name is non-empty
	/// - primary storage (and account, if present) refer to a configured implementation
	fn validate(&self) -> Result<(), ConfigError> {
		let receiver = &self.receiver;
		if receiver.admin == Address::ZERO {
			return Err(ConfigError::Validation(
				"Receiver admin cannot be the zero address".into(),
			));
		}
		if receiver.address == Address::ZERO {
			return Err(ConfigError::Validation(
				"Receiver address cannot be the zero address".into(),
			));
		}
		if receiver.chain_id == 0 {
			return Err(ConfigError::Validation(
				"Receiver chain_id must be greater than 0".into(),
			));
		}
		if receiver.domain_name.is_empty() {
			return Err(ConfigError::Validation(
				"Receiver domain_name cannot be empty".into(),
			));
		}

		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		if let Some(account) = &self.account {
			if !account.implementations.contains_key(&account.primary) {
				return Err(ConfigError::Validation(format!(
					"Primary account '{}' not found in implementations",
					account.primary
				)));
			}
		}

		Ok(())
	}
}

/// Parses TOML after environment resolution and validates the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const MINIMAL: &str = r#"
[receiver]
admin = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
chain_id = 31337

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("GAUNTLET_TEST_HOST", "localhost");
		std::env::set_var("GAUNTLET_TEST_PORT", "8545");

		let input = "rpc = \"http://${GAUNTLET_TEST_HOST}:${GAUNTLET_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "rpc = \"http://localhost:8545\"");

		std::env::remove_var("GAUNTLET_TEST_HOST");
		std::env::remove_var("GAUNTLET_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${GAUNTLET_MISSING_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let err = resolve_env_vars("value = \"${GAUNTLET_MISSING_VAR}\"").unwrap_err();
		assert!(err.to_string().contains("GAUNTLET_MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_defaults() {
		let config: Config = MINIMAL.parse().unwrap();
		assert_eq!(config.receiver.chain_id, 31337);
		assert_eq!(config.receiver.domain_name, "RelayerCartel");
		assert_eq!(config.receiver.version, 0);
		assert!(config.receiver.endpoint.is_none());
		assert!(!config.receiver.replay_protection);
		assert!(config.account.is_none());
	}

	#[test]
	fn test_account_key_from_env() {
		let config_str = format!(
			"{}\n[account]\nprimary = \"local\"\n[account.implementations.local]\nprivate_key = \"${{GAUNTLET_TEST_KEY:-0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d}}\"\n",
			MINIMAL
		);
		let config: Config = config_str.parse().unwrap();
		let account = config.account.unwrap();
		let key = account.implementations["local"]
			.get("private_key")
			.and_then(|v| v.as_str())
			.unwrap()
			.to_string();
		assert!(key.starts_with("0x59c6"));
	}

	#[test]
	fn test_zero_chain_id_rejected() {
		let config_str = MINIMAL.replace("chain_id = 31337", "chain_id = 0");
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("chain_id")));
	}

	#[test]
	fn test_unknown_primary_storage_rejected() {
		let config_str = MINIMAL.replace("primary = \"memory\"", "primary = \"redis\"");
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("redis"));
	}

	#[test]
	fn test_unknown_primary_account_rejected() {
		let config_str = format!(
			"{}\n[account]\nprimary = \"kms\"\n[account.implementations.local]\nprivate_key = \"0x00\"\n",
			MINIMAL
		);
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("kms"));
	}

	#[test]
	fn test_malformed_address_is_parse_error() {
		let config_str = MINIMAL.replace(
			"0x5FbDB2315678afecb367f032d93F642f64180aa3",
			"0x5FbDB231",
		);
		assert!(matches!(
			config_str.parse::<Config>(),
			Err(ConfigError::Parse(_))
		));
	}

	#[tokio::test]
	async fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			"{}",
			MINIMAL.replace("chain_id = 31337", "chain_id = 10\nreplay_protection = true")
		)
		.unwrap();

		let config = Config::from_file(file.path()).await.unwrap();
		assert_eq!(config.receiver.chain_id, 10);
		assert!(config.receiver.replay_protection);
	}

	#[tokio::test]
	async fn test_from_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let result = Config::from_file(dir.path().join("missing.toml")).await;
		assert!(matches!(result, Err(ConfigError::Io(_))));
	}
}
