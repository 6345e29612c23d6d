//! Auction message and authorization types.
//!
//! An auction winner (the relayer) signs the `(auction id, expiry)` pair
//! under a fixed EIP-712 domain. The bridge forwards that signature together
//! with the payout recipient as a fixed 93-byte message which is decoded into
//! an [`AuctionMessage`] and checked against a [`CallContext`].

use alloy_primitives::{Address, FixedBytes};
use serde::{Deserialize, Serialize};

/// Width of the big-endian auction id field.
pub const AUCTION_ID_LENGTH: usize = 4;
/// Width of the big-endian expiry field.
pub const EXPIRY_LENGTH: usize = 4;
/// Width of the raw recipient address field.
pub const RECIPIENT_LENGTH: usize = 20;
/// Width of the `r ‖ s ‖ v` signature field.
pub const SIGNATURE_LENGTH: usize = 65;
/// Total length of a wire message.
pub const MESSAGE_LENGTH: usize =
	AUCTION_ID_LENGTH + EXPIRY_LENGTH + RECIPIENT_LENGTH + SIGNATURE_LENGTH;

/// Domain name relayers sign under.
pub const DEFAULT_DOMAIN_NAME: &str = "RelayerCartel";
/// The only protocol version accepted by the authorization gate.
pub const SUPPORTED_VERSION: u32 = 0;

/// A 65-byte `r ‖ s ‖ v` signature as carried on the wire.
pub type RawSignature = FixedBytes<SIGNATURE_LENGTH>;

/// Decoded form of the message delivered by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionMessage {
	/// Auction round identifier.
	pub auction_id: u32,
	/// UNIX timestamp at which the fill opens to any caller.
	pub expiry: u32,
	/// Destination of the payout.
	pub recipient: Address,
	/// Signature over `(auction_id, expiry)`.
	pub signature: RawSignature,
}

/// EIP-712 domain the auction tuple is signed under.
///
/// There is no `verifyingContract` member; replay across chains and
/// protocol versions is prevented by `chain_id` and `version` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDomain {
	pub name: String,
	pub version: u32,
	pub chain_id: u64,
}

impl AuthorizationDomain {
	/// Creates a domain with an explicit name, version and chain.
	pub fn new(name: impl Into<String>, version: u32, chain_id: u64) -> Self {
		Self {
			name: name.into(),
			version,
			chain_id,
		}
	}

	/// Creates the default `RelayerCartel` domain at the supported version.
	pub fn relayer_cartel(chain_id: u64) -> Self {
		Self::new(DEFAULT_DOMAIN_NAME, SUPPORTED_VERSION, chain_id)
	}
}

/// Per-invocation context the authorization gate decides against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
	/// Account triggering the payout.
	pub caller: Address,
	/// Relayer asserted by the transport as the fill executor.
	pub designated_signer: Address,
	/// Current UNIX timestamp from the caller's clock.
	pub now: u32,
	/// Chain the receiver executes on.
	pub chain_id: u64,
	/// Protocol version the receiver runs.
	pub version: u32,
}

/// Which branch of the expiry policy admitted the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationPath {
	/// Before expiry, called by the designated signer.
	Designated,
	/// At or after expiry, any caller.
	Fallback,
}

/// Successful outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
	/// Address recovered from the signature.
	pub signer: Address,
	pub auction_id: u32,
	pub expiry: u32,
	pub recipient: Address,
	pub path: AuthorizationPath,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_message_length_matches_layout() {
		assert_eq!(MESSAGE_LENGTH, 93);
	}

	#[test]
	fn test_relayer_cartel_domain() {
		let domain = AuthorizationDomain::relayer_cartel(31337);
		assert_eq!(domain.name, "RelayerCartel");
		assert_eq!(domain.version, 0);
		assert_eq!(domain.chain_id, 31337);
	}

	#[test]
	fn test_authorization_path_serializes_snake_case() {
		let json = serde_json::to_string(&AuthorizationPath::Fallback).unwrap();
		assert_eq!(json, "\"fallback\"");
	}
}
