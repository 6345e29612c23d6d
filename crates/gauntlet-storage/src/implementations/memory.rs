//! In-memory storage backend.
//!
//! Ledgers live in a `HashMap` behind a read-write lock and are lost on
//! restart. Suitable for tests, the CLI and single-process deployments.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use gauntlet_types::{ConfigSchema, Schema, ValidationError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage implementation.
pub struct MemoryStorage {
	/// The in-memory store protected by a read-write lock.
	store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		store.get(key).cloned().ok_or(StorageError::NotFound)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store.contains_key(key))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStorageSchema)
	}
}

/// Configuration schema for MemoryStorage.
pub struct MemoryStorageSchema;

impl ConfigSchema for MemoryStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Memory storage has no configuration
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Factory function to create a memory storage backend from configuration.
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	MemoryStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;
	tracing::debug!("Created in-memory storage backend");
	Ok(Box::new(MemoryStorage::new()))
}

/// Registry for the memory storage implementation.
pub struct Registry;

impl gauntlet_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_basic_operations() {
		let storage = MemoryStorage::new();

		storage
			.set_bytes("balances:0xabc", b"100".to_vec())
			.await
			.unwrap();
		assert_eq!(
			storage.get_bytes("balances:0xabc").await.unwrap(),
			b"100".to_vec()
		);
		assert!(storage.exists("balances:0xabc").await.unwrap());

		storage
			.set_bytes("balances:0xabc", b"0".to_vec())
			.await
			.unwrap();
		assert_eq!(
			storage.get_bytes("balances:0xabc").await.unwrap(),
			b"0".to_vec()
		);

		storage.delete("balances:0xabc").await.unwrap();
		assert!(!storage.exists("balances:0xabc").await.unwrap());
		assert!(matches!(
			storage.get_bytes("balances:0xabc").await,
			Err(StorageError::NotFound)
		));
	}

	#[test]
	fn test_factory_requires_table() {
		let not_a_table = toml::Value::Integer(1);
		assert!(matches!(
			create_storage(&not_a_table),
			Err(StorageError::Configuration(_))
		));

		let empty: toml::Value = toml::Value::Table(Default::default());
		assert!(create_storage(&empty).is_ok());
	}
}
