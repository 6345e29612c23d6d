//! Wire codec for auction messages delivered by the bridge.
//!
//! ## Message Format
//!
//! A message is exactly 93 bytes with fixed offsets:
//! ```text
//! [0, 4)    auction id   big-endian uint32
//! [4, 8)    expiry       big-endian uint32
//! [8, 28)   recipient    raw 20-byte address
//! [28, 93)  signature    r (32) ‖ s (32) ‖ v (1)
//! ```
//!
//! The layout is shared with the relayers that build messages and is not
//! negotiable. Decoding never truncates or pads: any other length is
//! rejected outright.

use alloy_primitives::{Address, Bytes};
use gauntlet_types::{
	without_0x_prefix, AuctionMessage, RawSignature, AUCTION_ID_LENGTH, EXPIRY_LENGTH,
	MESSAGE_LENGTH, RECIPIENT_LENGTH,
};
use thiserror::Error;

const EXPIRY_OFFSET: usize = AUCTION_ID_LENGTH;
const RECIPIENT_OFFSET: usize = EXPIRY_OFFSET + EXPIRY_LENGTH;
const SIGNATURE_OFFSET: usize = RECIPIENT_OFFSET + RECIPIENT_LENGTH;

/// Errors that can occur while decoding a message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
	/// The message is not exactly [`MESSAGE_LENGTH`] bytes long.
	#[error("Malformed message: expected {expected} bytes, got {actual}")]
	MalformedMessage { expected: usize, actual: usize },
	/// A hex-encoded message could not be parsed.
	#[error("Invalid hex format: {0}")]
	InvalidHex(String),
}

/// Decodes a raw 93-byte message.
pub fn decode(raw: &[u8]) -> Result<AuctionMessage, CodecError> {
	if raw.len() != MESSAGE_LENGTH {
		return Err(CodecError::MalformedMessage {
			expected: MESSAGE_LENGTH,
			actual: raw.len(),
		});
	}

	let auction_id = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
	let expiry = u32::from_be_bytes([
		raw[EXPIRY_OFFSET],
		raw[EXPIRY_OFFSET + 1],
		raw[EXPIRY_OFFSET + 2],
		raw[EXPIRY_OFFSET + 3],
	]);
	let recipient = Address::from_slice(&raw[RECIPIENT_OFFSET..SIGNATURE_OFFSET]);
	let signature = RawSignature::from_slice(&raw[SIGNATURE_OFFSET..MESSAGE_LENGTH]);

	Ok(AuctionMessage {
		auction_id,
		expiry,
		recipient,
		signature,
	})
}

/// Encodes a message into its 93-byte wire form.
pub fn encode(message: &AuctionMessage) -> Bytes {
	let mut out = Vec::with_capacity(MESSAGE_LENGTH);
	out.extend_from_slice(&message.auction_id.to_be_bytes());
	out.extend_from_slice(&message.expiry.to_be_bytes());
	out.extend_from_slice(message.recipient.as_slice());
	out.extend_from_slice(message.signature.as_slice());
	Bytes::from(out)
}

/// Decodes a hex message with or without a `0x` prefix.
pub fn decode_hex(hex_str: &str) -> Result<AuctionMessage, CodecError> {
	let bytes = hex::decode(without_0x_prefix(hex_str.trim()))
		.map_err(|e| CodecError::InvalidHex(e.to_string()))?;
	decode(&bytes)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	fn sample_message() -> AuctionMessage {
		let mut signature = [0u8; 65];
		for (i, byte) in signature.iter_mut().enumerate() {
			*byte = i as u8;
		}
		signature[64] = 27;
		AuctionMessage {
			auction_id: 42,
			expiry: 1_700_000_060,
			recipient: address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
			signature: RawSignature::from(signature),
		}
	}

	#[test]
	fn test_round_trip() {
		let message = sample_message();
		let encoded = encode(&message);
		assert_eq!(encoded.len(), MESSAGE_LENGTH);
		assert_eq!(decode(&encoded).unwrap(), message);

		let extremes = AuctionMessage {
			auction_id: u32::MAX,
			expiry: 0,
			recipient: Address::ZERO,
			signature: RawSignature::ZERO,
		};
		assert_eq!(decode(&encode(&extremes)).unwrap(), extremes);
	}

	#[test]
	fn test_field_offsets() {
		let encoded = encode(&sample_message());
		// auction id 42 and expiry are big-endian and zero-padded to four bytes
		assert_eq!(&encoded[0..4], &[0, 0, 0, 42]);
		assert_eq!(&encoded[4..8], &1_700_000_060u32.to_be_bytes());
		assert_eq!(
			&encoded[8..28],
			address!("70997970C51812dc3A010C7d01b50e0d17dc79C8").as_slice()
		);
		assert_eq!(encoded[28], 0);
		assert_eq!(encoded[92], 27);
	}

	#[test]
	fn test_length_guard() {
		for len in [0usize, 1, 92, 94, 1000] {
			let raw = vec![0u8; len];
			assert_eq!(
				decode(&raw),
				Err(CodecError::MalformedMessage {
					expected: 93,
					actual: len
				}),
				"length {} must be rejected",
				len
			);
		}
		assert!(decode(&[0u8; 93]).is_ok());
	}

	#[test]
	fn test_trailing_byte_is_not_ignored() {
		let mut raw = encode(&sample_message()).to_vec();
		raw.push(0);
		assert!(matches!(
			decode(&raw),
			Err(CodecError::MalformedMessage { actual: 94, .. })
		));
	}

	#[test]
	fn test_decode_hex() {
		let message = sample_message();
		let hex_str = format!("0x{}", hex::encode(encode(&message)));
		assert_eq!(decode_hex(&hex_str).unwrap(), message);
		assert_eq!(decode_hex(&hex_str[2..]).unwrap(), message);
		assert!(matches!(decode_hex("0xzz"), Err(CodecError::InvalidHex(_))));
		assert!(matches!(
			decode_hex("0x00"),
			Err(CodecError::MalformedMessage { actual: 1, .. })
		));
	}
}
