//! Builder pattern for constructing receivers.
//!
//! Composes a [`Gauntlet`] from configuration and factory maps, so storage
//! backends and signing accounts stay pluggable.

use crate::engine::{event_bus::EventBus, Gauntlet};
use gauntlet_account::{AccountError, AccountInterface, AccountService};
use gauntlet_config::Config;
use gauntlet_custody::CustodyService;
use gauntlet_storage::{StorageError, StorageInterface, StorageService};
use gauntlet_types::ConfigSchema;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Buffered events per subscriber before slow receivers start lagging.
const EVENT_BUS_CAPACITY: usize = 1000;

/// Errors that can occur during receiver construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions for each pluggable component, keyed by
/// implementation name.
pub struct GauntletFactories<SF, AF> {
	pub storage_factories: HashMap<String, SF>,
	pub account_factories: HashMap<String, AF>,
}

/// Builder for constructing a [`Gauntlet`] with pluggable implementations.
pub struct GauntletBuilder {
	config: Config,
}

impl GauntletBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the receiver using the factory for each configured component.
	pub async fn build<SF, AF>(
		self,
		factories: GauntletFactories<SF, AF>,
	) -> Result<Gauntlet, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		AF: Fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>,
	{
		// Storage backs both the custody ledger and the fill ledger
		let storage_config = &self.config.storage;
		let primary_storage = &storage_config.primary;
		let storage_factory = factories
			.storage_factories
			.get(primary_storage)
			.ok_or_else(|| {
				BuilderError::MissingComponent(format!(
					"No factory registered for storage '{}'",
					primary_storage
				))
			})?;
		let storage_table = storage_config
			.implementations
			.get(primary_storage)
			.ok_or_else(|| {
				BuilderError::Config(format!(
					"Primary storage '{}' has no configuration",
					primary_storage
				))
			})?;
		let storage_backend = match storage_factory(storage_table) {
			Ok(backend) => backend,
			Err(e) => {
				tracing::error!(
					component = "storage",
					implementation = %primary_storage,
					error = %e,
					"Failed to create storage implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create storage implementation '{}': {}",
					primary_storage, e
				)));
			},
		};
		// Validate the configuration using the backend's schema
		if let Err(e) = storage_backend.config_schema().validate(storage_table) {
			tracing::error!(
				component = "storage",
				implementation = %primary_storage,
				error = %e,
				"Invalid configuration for storage implementation"
			);
			return Err(BuilderError::Config(format!(
				"Invalid configuration for storage implementation '{}': {}",
				primary_storage, e
			)));
		}
		tracing::info!(component = "storage", implementation = %primary_storage, "Loaded");

		let storage = Arc::new(StorageService::new(storage_backend));
		let custody = Arc::new(CustodyService::new(storage.clone()));

		let account = match &self.config.account {
			Some(account_config) => {
				let primary = &account_config.primary;
				let factory = factories.account_factories.get(primary).ok_or_else(|| {
					BuilderError::MissingComponent(format!(
						"No factory registered for account '{}'",
						primary
					))
				})?;
				let table = account_config.implementations.get(primary).ok_or_else(|| {
					BuilderError::Config(format!(
						"Primary account '{}' has no configuration",
						primary
					))
				})?;
				let implementation = factory(table).map_err(|e| {
					tracing::error!(
						component = "account",
						implementation = %primary,
						error = %e,
						"Failed to create account implementation"
					);
					BuilderError::Config(format!(
						"Failed to create account implementation '{}': {}",
						primary, e
					))
				})?;
				implementation.config_schema().validate(table).map_err(|e| {
					tracing::error!(
						component = "account",
						implementation = %primary,
						error = %e,
						"Invalid configuration for account implementation"
					);
					BuilderError::Config(format!(
						"Invalid configuration for account implementation '{}': {}",
						primary, e
					))
				})?;

				let service = AccountService::new(implementation);
				let address = service.get_address().await.map_err(|e| {
					BuilderError::Config(format!("Failed to get relayer address: {}", e))
				})?;
				tracing::info!(component = "account", implementation = %primary, %address, "Loaded");
				Some(Arc::new(service))
			},
			None => None,
		};

		let receiver = &self.config.receiver;
		tracing::info!(
			address = %receiver.address,
			chain_id = receiver.chain_id,
			version = receiver.version,
			replay_protection = receiver.replay_protection,
			"Built receiver"
		);

		Ok(Gauntlet::new(
			self.config,
			storage,
			custody,
			account,
			EventBus::new(EVENT_BUS_CAPACITY),
		))
	}
}
