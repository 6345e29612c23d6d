//! Utility functions shared across the receiver crates.

pub mod eip712;
pub mod formatting;
pub mod helpers;

pub use eip712::{
	compute_auction_signing_hash, compute_auction_struct_hash, compute_domain_hash,
	compute_final_digest, Eip712AbiEncoder, AUCTION_TYPE, DOMAIN_TYPE,
};
pub use formatting::{truncate_id, without_0x_prefix};
pub use helpers::current_timestamp;
