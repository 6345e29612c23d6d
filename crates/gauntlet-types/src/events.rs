//! Event types published by the receiver.
//!
//! Events flow through the receiver's event bus so observers (logs, the CLI,
//! tests) can follow a fill without reaching into the engine.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Events emitted while handling an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GauntletEvent {
	/// The message signature recovered to the designated signer and the
	/// expiry policy admitted the caller.
	///
	/// Published before the payout. A later failure in the same call
	/// follows it with [`GauntletEvent::FillRejected`] rather than
	/// retracting it.
	SignatureVerified,
	/// Funds were released to the recipient.
	FillExecuted {
		auction_id: u32,
		recipient: Address,
		expiry: u32,
	},
	/// The message was refused. Ledger writes made during the call were
	/// rolled back, so nothing was paid out and the auction is unrecorded.
	FillRejected { reason: String },
}
