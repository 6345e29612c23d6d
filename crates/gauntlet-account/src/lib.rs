//! Account management module for relayers.
//!
//! A relayer that wins an auction signs the `(auction id, expiry)` pair under
//! the receiver's EIP-712 domain and ships it, together with the payout
//! recipient, as the bridge message. This crate provides the signing
//! accounts and the service that assembles those messages.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use gauntlet_types::{
	AuctionMessage, AuthorizationDomain, ConfigSchema, ImplementationRegistry, RawSignature,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Error that occurs when the implementation table is malformed.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for signing accounts.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Returns the configuration schema for this account implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Retrieves the address associated with this account.
	async fn address(&self) -> Result<Address, AccountError>;

	/// Signs the EIP-712 `auction` struct for `(auction_id, expiry)`.
	///
	/// Returns the 65-byte `r ‖ s ‖ v` signature with `v` in `{27, 28}`.
	async fn sign_auction(
		&self,
		domain: &AuthorizationDomain,
		auction_id: u32,
		expiry: u32,
	) -> Result<RawSignature, AccountError>;
}

/// Type alias for account factory functions.
pub type AccountFactory = fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>;

/// Registry trait for account implementations.
pub trait AccountRegistry: ImplementationRegistry<Factory = AccountFactory> {}

/// Get all registered account implementations.
pub fn get_all_implementations() -> Vec<(&'static str, AccountFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Service that signs auctions and builds bridge messages.
pub struct AccountService {
	/// The underlying account implementation.
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	pub async fn get_address(&self) -> Result<Address, AccountError> {
		self.implementation.address().await
	}

	pub async fn sign_auction(
		&self,
		domain: &AuthorizationDomain,
		auction_id: u32,
		expiry: u32,
	) -> Result<RawSignature, AccountError> {
		self.implementation
			.sign_auction(domain, auction_id, expiry)
			.await
	}

	/// Signs the auction and encodes the 93-byte bridge message.
	pub async fn build_message(
		&self,
		domain: &AuthorizationDomain,
		auction_id: u32,
		expiry: u32,
		recipient: Address,
	) -> Result<Bytes, AccountError> {
		let signature = self.sign_auction(domain, auction_id, expiry).await?;
		let message = gauntlet_codec::encode(&AuctionMessage {
			auction_id,
			expiry,
			recipient,
			signature,
		});

		tracing::debug!(
			auction_id,
			expiry,
			%recipient,
			chain_id = domain.chain_id,
			"Built auction message"
		);
		Ok(message)
	}
}
