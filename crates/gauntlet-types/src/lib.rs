//! Common types module for the Gauntlet fill receiver.
//!
//! This module defines the core data types shared by the codec, the
//! authorization gate and the receiver engine. Keeping them in one crate
//! lets every component agree on the wire message, the signing domain and
//! the call context without depending on each other.

/// Auction message, signing domain and call context types.
pub mod auction;
/// Inbound bridge delivery and fill receipt types.
pub mod delivery;
/// Event types published by the receiver.
pub mod events;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Redacting wrapper for private keys.
pub mod secret_string;
/// Utility functions for EIP-712 encoding and formatting.
pub mod utils;
/// Configuration validation types for implementation-specific tables.
pub mod validation;

// Re-export all types for convenient access
pub use alloy_primitives::{Address, Bytes, B256, U256};
pub use auction::*;
pub use delivery::*;
pub use events::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use utils::{current_timestamp, truncate_id, without_0x_prefix};
pub use validation::*;
