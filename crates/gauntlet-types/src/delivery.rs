//! Types exchanged with the bridge transport and the payout collaborator.

use crate::AuthorizationPath;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A call delivered by the bridge endpoint after a fill.
///
/// `token`, `amount` and `fill_completed` are not inspected by the
/// authorization logic and flow through to the payout untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundDelivery {
	/// Immediate sender of the call (the bridge endpoint contract).
	pub endpoint: Address,
	/// Token released by the payout.
	pub token: Address,
	/// Amount released by the payout.
	pub amount: U256,
	/// Whether the bridge reports the fill as complete.
	pub fill_completed: bool,
	/// Relayer that executed the fill.
	pub designated_signer: Address,
	/// The 93-byte auction message.
	pub message: Bytes,
}

/// Record of a completed payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReceipt {
	pub auction_id: u32,
	pub token: Address,
	pub amount: U256,
	pub recipient: Address,
	pub expiry: u32,
	pub fill_completed: bool,
	pub path: AuthorizationPath,
}
