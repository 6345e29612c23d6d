//! Configuration builder for tests and local development.
//!
//! Produces a [`Config`] backed by in-memory storage, so receiver tests do
//! not need to write TOML.

use crate::{AccountConfig, Config, ReceiverConfig, StorageConfig};
use alloy_primitives::Address;
use gauntlet_types::DEFAULT_DOMAIN_NAME;
use std::collections::HashMap;

/// Builder for creating `Config` instances with a fluent API.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	admin: Address,
	address: Address,
	chain_id: u64,
	domain_name: String,
	version: u32,
	endpoint: Option<Address>,
	replay_protection: bool,
	account_key: Option<String>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a builder for a version 0 receiver on chain 31337.
	pub fn new() -> Self {
		Self {
			admin: Address::repeat_byte(0xad),
			address: Address::repeat_byte(0x5e),
			chain_id: 31337,
			domain_name: DEFAULT_DOMAIN_NAME.to_string(),
			version: 0,
			endpoint: None,
			replay_protection: false,
			account_key: None,
		}
	}

	pub fn admin(mut self, admin: Address) -> Self {
		self.admin = admin;
		self
	}

	/// Sets the custody address of the receiver.
	pub fn address(mut self, address: Address) -> Self {
		self.address = address;
		self
	}

	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = chain_id;
		self
	}

	pub fn domain_name(mut self, name: impl Into<String>) -> Self {
		self.domain_name = name.into();
		self
	}

	/// Sets the protocol version the receiver runs.
	pub fn version(mut self, version: u32) -> Self {
		self.version = version;
		self
	}

	/// Restricts delivery to a single bridge endpoint.
	pub fn endpoint(mut self, endpoint: Address) -> Self {
		self.endpoint = Some(endpoint);
		self
	}

	pub fn replay_protection(mut self, enabled: bool) -> Self {
		self.replay_protection = enabled;
		self
	}

	/// Adds a `local` account section holding the given hex key.
	pub fn account_key(mut self, private_key: impl Into<String>) -> Self {
		self.account_key = Some(private_key.into());
		self
	}

	/// Builds the `Config` with the configured values.
	pub fn build(self) -> Config {
		let mut storage_implementations = HashMap::new();
		storage_implementations.insert(
			"memory".to_string(),
			toml::Value::Table(toml::map::Map::new()),
		);

		let account = self.account_key.map(|key| {
			let mut table = toml::map::Map::new();
			table.insert("private_key".to_string(), toml::Value::String(key));
			let mut implementations = HashMap::new();
			implementations.insert("local".to_string(), toml::Value::Table(table));
			AccountConfig {
				primary: "local".to_string(),
				implementations,
			}
		});

		Config {
			receiver: ReceiverConfig {
				admin: self.admin,
				address: self.address,
				chain_id: self.chain_id,
				domain_name: self.domain_name,
				version: self.version,
				endpoint: self.endpoint,
				replay_protection: self.replay_protection,
			},
			storage: StorageConfig {
				primary: "memory".to_string(),
				implementations: storage_implementations,
			},
			account,
		}
	}
}
