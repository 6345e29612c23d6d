//! Receiver engine.
//!
//! [`Gauntlet`] is the receiving end of a bridged auction fill. It holds the
//! receiver's configuration, its custody ledger and event bus, and routes
//! deliveries through the [`FillHandler`].

pub mod event_bus;

use crate::handlers::{fill::FILLS_NAMESPACE, FillHandler};
use alloy_primitives::{Address, Bytes, U256};
use gauntlet_account::{AccountError, AccountService};
use gauntlet_auth::AuthError;
use gauntlet_codec::CodecError;
use gauntlet_config::Config;
use gauntlet_custody::{CustodyError, CustodyService};
use gauntlet_storage::{StorageError, StorageService};
use gauntlet_types::{
	AuctionMessage, Authorization, AuthorizationDomain, FillReceipt, InboundDelivery,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while handling a delivery.
///
/// Authorization failures are forwarded unchanged so their messages
/// match the reasons relayers see on-chain.
#[derive(Debug, Error)]
pub enum ReceiverError {
	#[error("Only endpoint: {0} is not the trusted endpoint")]
	UntrustedEndpoint(Address),
	#[error(transparent)]
	Codec(#[from] CodecError),
	#[error(transparent)]
	Auth(#[from] AuthError),
	#[error("Auction {0} already filled")]
	AuctionAlreadyFilled(u32),
	#[error("Custody error: {0}")]
	Custody(#[from] CustodyError),
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	#[error("Account error: {0}")]
	Account(#[from] AccountError),
	#[error("No signing account configured")]
	NoAccount,
}

/// The fill receiver.
#[derive(Clone)]
pub struct Gauntlet {
	pub(crate) config: Config,
	pub(crate) storage: Arc<StorageService>,
	pub(crate) custody: Arc<CustodyService>,
	/// Relayer account used to sign messages; absent on pure receivers.
	pub(crate) account: Option<Arc<AccountService>>,
	pub(crate) event_bus: event_bus::EventBus,
	pub(crate) fill_handler: Arc<FillHandler>,
}

impl Gauntlet {
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		custody: Arc<CustodyService>,
		account: Option<Arc<AccountService>>,
		event_bus: event_bus::EventBus,
	) -> Self {
		let fill_handler = Arc::new(FillHandler::new(
			config.receiver.clone(),
			custody.clone(),
			storage.clone(),
			event_bus.clone(),
		));
		Self {
			config,
			storage,
			custody,
			account,
			event_bus,
			fill_handler,
		}
	}

	pub fn admin(&self) -> Address {
		self.config.receiver.admin
	}

	/// Custody account funds are paid out of.
	pub fn address(&self) -> Address {
		self.config.receiver.address
	}

	/// The signing domain relayers must use for this receiver.
	pub fn domain(&self) -> AuthorizationDomain {
		let receiver = &self.config.receiver;
		AuthorizationDomain::new(
			receiver.domain_name.clone(),
			receiver.version,
			receiver.chain_id,
		)
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn event_bus(&self) -> &event_bus::EventBus {
		&self.event_bus
	}

	/// Credits `amount` of `token` to the receiver and returns the new balance.
	pub async fn deposit(&self, token: Address, amount: U256) -> Result<U256, ReceiverError> {
		Ok(self.custody.deposit(self.address(), token, amount).await?)
	}

	pub async fn balance_of(&self, holder: Address, token: Address) -> Result<U256, ReceiverError> {
		Ok(self.custody.balance_of(holder, token).await?)
	}

	/// Authorizes and pays out a delivery from the bridge.
	///
	/// `caller` is the account triggering the payout and `now` the current
	/// UNIX time. On success the receiver's balance of `delivery.token`
	/// has moved to the message recipient.
	pub async fn handle_message(
		&self,
		delivery: &InboundDelivery,
		caller: Address,
		now: u32,
	) -> Result<FillReceipt, ReceiverError> {
		self.fill_handler.handle(delivery, caller, now).await
	}

	/// Checks a message against this receiver without paying out or
	/// publishing events.
	pub fn verify(
		&self,
		message: &AuctionMessage,
		caller: Address,
		designated_signer: Address,
		now: u32,
	) -> Result<Authorization, ReceiverError> {
		self.fill_handler
			.verify(message, caller, designated_signer, now)
	}

	/// Whether a fill for `auction_id` has been recorded.
	///
	/// Always false when replay protection is disabled.
	pub async fn is_filled(&self, auction_id: u32) -> Result<bool, ReceiverError> {
		Ok(self
			.storage
			.exists(FILLS_NAMESPACE, &auction_id.to_string())
			.await?)
	}

	/// Address of the configured signing account.
	pub async fn signer_address(&self) -> Result<Address, ReceiverError> {
		let account = self.account.as_ref().ok_or(ReceiverError::NoAccount)?;
		Ok(account.get_address().await?)
	}

	/// Signs `(auction_id, expiry)` with the configured account under this
	/// receiver's domain and encodes the bridge message.
	pub async fn sign_message(
		&self,
		auction_id: u32,
		expiry: u32,
		recipient: Address,
	) -> Result<Bytes, ReceiverError> {
		let account = self.account.as_ref().ok_or(ReceiverError::NoAccount)?;
		Ok(account
			.build_message(&self.domain(), auction_id, expiry, recipient)
			.await?)
	}
}
