//! EIP-712 utilities for the auction authorization scheme.
//!
//! These helpers provide:
//! - Domain hash computation for the `{name, version, chainId}` domain
//! - Struct hash computation for `auction(uint32 id,uint32 expiry)`
//! - Final digest computation (0x1901 || domainHash || structHash)
//! - A minimal ABI encoder for the static field types involved
//!
//! The type strings and field order are fixed by the relayers that sign
//! auction results and must not change.

use crate::AuthorizationDomain;
use alloy_primitives::{keccak256, B256, U256};

/// Domain type string. The domain carries no `verifyingContract`.
pub const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version,uint256 chainId)";
/// Primary type signed by the auction winner.
pub const AUCTION_TYPE: &str = "auction(uint32 id,uint32 expiry)";

/// Compute EIP-712 domain hash
/// (keccak256(abi.encode(typeHash, keccak256(name), keccak256(version), chainId))).
///
/// `version` is the decimal string form of the protocol version, e.g. `"0"`.
pub fn compute_domain_hash(name: &str, version: &str, chain_id: u64) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(DOMAIN_TYPE.as_bytes()));
	enc.push_string(name);
	enc.push_string(version);
	enc.push_u256(U256::from(chain_id));
	keccak256(enc.finish())
}

/// Compute the struct hash of an `auction` value.
pub fn compute_auction_struct_hash(auction_id: u32, expiry: u32) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(AUCTION_TYPE.as_bytes()));
	enc.push_u32(auction_id);
	enc.push_u32(expiry);
	keccak256(enc.finish())
}

/// Compute the final EIP-712 digest: keccak256(0x1901 || domainHash || structHash).
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Compute the digest a relayer signs for `(auction_id, expiry)` under `domain`.
pub fn compute_auction_signing_hash(
	domain: &AuthorizationDomain,
	auction_id: u32,
	expiry: u32,
) -> B256 {
	let domain_hash =
		compute_domain_hash(&domain.name, &domain.version.to_string(), domain.chain_id);
	compute_final_digest(&domain_hash, &compute_auction_struct_hash(auction_id, expiry))
}

/// Minimal ABI encoder for static types used in EIP-712 struct hashing.
///
/// Every value occupies one left-padded 32-byte word; dynamic `string`
/// members are encoded as the keccak256 of their UTF-8 bytes.
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Default for Eip712AbiEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_string(&mut self, s: &str) {
		self.push_b256(&keccak256(s.as_bytes()));
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u32(&mut self, v: u32) {
		let mut word = [0u8; 32];
		word[28..].copy_from_slice(&v.to_be_bytes());
		self.buf.extend_from_slice(&word);
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}
