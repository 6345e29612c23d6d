//! Fill handler for inbound bridge deliveries.
//!
//! Runs a delivered message through endpoint trust, decoding,
//! authorization, the optional replay ledger and finally the payout.

use crate::engine::{event_bus::EventBus, ReceiverError};
use alloy_primitives::Address;
use gauntlet_auth::AuthorizationGate;
use gauntlet_config::ReceiverConfig;
use gauntlet_custody::CustodyService;
use gauntlet_storage::StorageService;
use gauntlet_types::{
	AuctionMessage, Authorization, CallContext, FillReceipt, GauntletEvent, InboundDelivery,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

/// Storage namespace of the consumed-auction ledger.
pub const FILLS_NAMESPACE: &str = "fills";

/// Handler that authorizes and pays out inbound fills.
pub struct FillHandler {
	receiver: ReceiverConfig,
	gate: AuthorizationGate,
	custody: Arc<CustodyService>,
	storage: Arc<StorageService>,
	event_bus: EventBus,
	/// Held from the replay check until the payout settles.
	fill_lock: Mutex<()>,
}

impl FillHandler {
	pub fn new(
		receiver: ReceiverConfig,
		custody: Arc<CustodyService>,
		storage: Arc<StorageService>,
		event_bus: EventBus,
	) -> Self {
		Self {
			gate: AuthorizationGate::new(receiver.domain_name.clone()),
			receiver,
			custody,
			storage,
			event_bus,
			fill_lock: Mutex::new(()),
		}
	}

	/// Builds the call context for this receiver's chain and version.
	pub fn context(&self, caller: Address, designated_signer: Address, now: u32) -> CallContext {
		CallContext {
			caller,
			designated_signer,
			now,
			chain_id: self.receiver.chain_id,
			version: self.receiver.version,
		}
	}

	/// Authorizes a decoded message without paying out.
	pub fn verify(
		&self,
		message: &AuctionMessage,
		caller: Address,
		designated_signer: Address,
		now: u32,
	) -> Result<Authorization, ReceiverError> {
		let ctx = self.context(caller, designated_signer, now);
		Ok(self.gate.authorize(message, &ctx)?)
	}

	/// Handles a delivery. Every failure is published as
	/// [`GauntletEvent::FillRejected`] before it is returned.
	#[instrument(skip_all, fields(endpoint = %delivery.endpoint, caller = %caller, now = now))]
	pub async fn handle(
		&self,
		delivery: &InboundDelivery,
		caller: Address,
		now: u32,
	) -> Result<FillReceipt, ReceiverError> {
		match self.process(delivery, caller, now).await {
			Ok(receipt) => Ok(receipt),
			Err(e) => {
				tracing::warn!(error = %e, "Rejected fill");
				self.event_bus
					.publish(GauntletEvent::FillRejected {
						reason: e.to_string(),
					})
					.ok();
				Err(e)
			},
		}
	}

	async fn process(
		&self,
		delivery: &InboundDelivery,
		caller: Address,
		now: u32,
	) -> Result<FillReceipt, ReceiverError> {
		if let Some(trusted) = self.receiver.endpoint {
			if delivery.endpoint != trusted {
				return Err(ReceiverError::UntrustedEndpoint(delivery.endpoint));
			}
		}

		let message = gauntlet_codec::decode(&delivery.message)?;
		let authorization = self.verify(&message, caller, delivery.designated_signer, now)?;

		tracing::info!(
			auction_id = authorization.auction_id,
			signer = %authorization.signer,
			path = ?authorization.path,
			"Verified signature"
		);
		self.event_bus.publish(GauntletEvent::SignatureVerified).ok();

		let _guard = self.fill_lock.lock().await;

		let fill_id = message.auction_id.to_string();
		if self.receiver.replay_protection
			&& self.storage.exists(FILLS_NAMESPACE, &fill_id).await?
		{
			return Err(ReceiverError::AuctionAlreadyFilled(message.auction_id));
		}

		let receipt = FillReceipt {
			auction_id: message.auction_id,
			token: delivery.token,
			amount: delivery.amount,
			recipient: message.recipient,
			expiry: message.expiry,
			fill_completed: delivery.fill_completed,
			path: authorization.path,
		};

		// Recorded before the payout and removed again if the payout fails
		if self.receiver.replay_protection {
			self.storage
				.store(FILLS_NAMESPACE, &fill_id, &receipt)
				.await?;
		}

		if let Err(e) = self
			.custody
			.transfer(
				self.receiver.address,
				delivery.token,
				message.recipient,
				delivery.amount,
			)
			.await
		{
			if self.receiver.replay_protection {
				if let Err(remove) = self.storage.remove(FILLS_NAMESPACE, &fill_id).await {
					tracing::error!(
						auction_id = message.auction_id,
						error = %remove,
						"Failed to roll back fill record"
					);
				}
			}
			return Err(e.into());
		}

		self.event_bus
			.publish(GauntletEvent::FillExecuted {
				auction_id: message.auction_id,
				recipient: message.recipient,
				expiry: message.expiry,
			})
			.ok();

		tracing::info!(
			auction_id = receipt.auction_id,
			recipient = %receipt.recipient,
			amount = %receipt.amount,
			fill_completed = receipt.fill_completed,
			"Executed fill"
		);
		Ok(receipt)
	}
}
