//! Authorization gate for bridged auction fills.
//!
//! The gate decides whether a decoded [`AuctionMessage`] may release funds
//! for a given [`CallContext`]:
//!
//! 1. the protocol version must be supported,
//! 2. the signature over `(auction id, expiry)` must recover to the
//!    designated signer under the `{name, version, chainId}` EIP-712 domain,
//! 3. before expiry only the designated signer may call; from the expiry
//!    timestamp on, anyone may.
//!
//! The gate holds no state across calls. Replay protection belongs to the
//! transport or to the receiver wrapping the gate.

use alloy_primitives::{Address, B256};
use gauntlet_types::{
	truncate_id, utils::compute_auction_signing_hash, AuctionMessage, Authorization,
	AuthorizationDomain, AuthorizationPath, CallContext, RawSignature, DEFAULT_DOMAIN_NAME,
	SUPPORTED_VERSION,
};
use thiserror::Error;

pub mod recovery;

pub use recovery::EcdsaRecovery;

/// Reasons an authorization check fails.
///
/// Display strings match the revert reasons relayers already watch for.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
	/// The call runs under a protocol version other than the supported one.
	#[error("Unsupported version: {0}")]
	UnsupportedVersion(u32),
	/// The signature is unrecoverable or was produced by another account.
	#[error("Invalid signature")]
	InvalidSignature,
	/// The caller is not the designated signer and the auction has not expired.
	#[error("Unauthorized caller {caller} before expiry")]
	Unauthorized { caller: Address },
}

/// Errors that can occur while recovering a signer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecoveryError {
	/// The `v` byte is neither 27 nor 28.
	#[error("Invalid recovery id: {0}")]
	InvalidV(u8),
	/// The signature is malleable.
	#[error("Signature s value is in the upper half of the curve order")]
	HighS,
	/// No public key could be recovered from the signature.
	#[error("Unrecoverable signature: {0}")]
	Unrecoverable(String),
}

/// Recovers the address that signed a digest.
///
/// The gate is generic over this trait so tests and alternative signature
/// schemes can supply their own primitive.
#[cfg_attr(test, mockall::automock)]
pub trait SignerRecovery: Send + Sync {
	fn recover(&self, digest: &B256, signature: &RawSignature) -> Result<Address, RecoveryError>;
}

/// Stateless authorization check over decoded auction messages.
#[derive(Debug, Clone)]
pub struct AuthorizationGate<R = EcdsaRecovery> {
	domain_name: String,
	recovery: R,
}

impl AuthorizationGate<EcdsaRecovery> {
	/// Creates a gate for the given domain name using secp256k1 recovery.
	pub fn new(domain_name: impl Into<String>) -> Self {
		Self::with_recovery(domain_name, EcdsaRecovery)
	}
}

impl Default for AuthorizationGate<EcdsaRecovery> {
	fn default() -> Self {
		Self::new(DEFAULT_DOMAIN_NAME)
	}
}

impl<R: SignerRecovery> AuthorizationGate<R> {
	/// Creates a gate with an injected recovery primitive.
	pub fn with_recovery(domain_name: impl Into<String>, recovery: R) -> Self {
		Self {
			domain_name: domain_name.into(),
			recovery,
		}
	}

	pub fn domain_name(&self) -> &str {
		&self.domain_name
	}

	/// The signing domain bound to the context's chain and version.
	pub fn domain(&self, ctx: &CallContext) -> AuthorizationDomain {
		AuthorizationDomain::new(self.domain_name.clone(), ctx.version, ctx.chain_id)
	}

	/// The EIP-712 digest the message signature must cover.
	pub fn digest(&self, message: &AuctionMessage, ctx: &CallContext) -> B256 {
		compute_auction_signing_hash(&self.domain(ctx), message.auction_id, message.expiry)
	}

	/// Checks a message against the call context.
	///
	/// Version is checked before any hashing. Recovery failure and a
	/// signer other than `ctx.designated_signer` both yield
	/// [`AuthError::InvalidSignature`].
	pub fn authorize(
		&self,
		message: &AuctionMessage,
		ctx: &CallContext,
	) -> Result<Authorization, AuthError> {
		if ctx.version != SUPPORTED_VERSION {
			return Err(AuthError::UnsupportedVersion(ctx.version));
		}

		let digest = self.digest(message, ctx);
		let signer = match self.recovery.recover(&digest, &message.signature) {
			Ok(signer) => signer,
			Err(e) => {
				tracing::debug!(
					auction_id = message.auction_id,
					signature = %truncate_id(&message.signature.to_string()),
					error = %e,
					"Signature recovery failed"
				);
				return Err(AuthError::InvalidSignature);
			},
		};

		if signer != ctx.designated_signer {
			tracing::debug!(
				auction_id = message.auction_id,
				recovered = %signer,
				designated = %ctx.designated_signer,
				"Signature recovered to a different signer"
			);
			return Err(AuthError::InvalidSignature);
		}

		let path = if ctx.now < message.expiry {
			if ctx.caller != ctx.designated_signer {
				return Err(AuthError::Unauthorized { caller: ctx.caller });
			}
			AuthorizationPath::Designated
		} else {
			AuthorizationPath::Fallback
		};

		Ok(Authorization {
			signer,
			auction_id: message.auction_id,
			expiry: message.expiry,
			recipient: message.recipient,
			path,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use alloy_signer::SignerSync;
	use alloy_signer_local::PrivateKeySigner;

	const CHAIN_ID: u64 = 31337;
	const NOW: u32 = 1_700_000_000;

	fn relayer() -> PrivateKeySigner {
		"0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
			.parse()
			.unwrap()
	}

	fn outsider() -> PrivateKeySigner {
		"0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a"
			.parse()
			.unwrap()
	}

	fn recipient() -> Address {
		address!("90F79bf6EB2c4f870365E785982E1f101E93b906")
	}

	fn signed_message(
		signer: &PrivateKeySigner,
		domain: &AuthorizationDomain,
		auction_id: u32,
		expiry: u32,
	) -> AuctionMessage {
		let digest = compute_auction_signing_hash(domain, auction_id, expiry);
		let signature = signer.sign_hash_sync(&digest).unwrap();
		AuctionMessage {
			auction_id,
			expiry,
			recipient: recipient(),
			signature: RawSignature::from(signature.as_bytes()),
		}
	}

	fn context(caller: Address, now: u32) -> CallContext {
		CallContext {
			caller,
			designated_signer: relayer().address(),
			now,
			chain_id: CHAIN_ID,
			version: 0,
		}
	}

	fn default_message(expiry: u32) -> AuctionMessage {
		signed_message(
			&relayer(),
			&AuthorizationDomain::relayer_cartel(CHAIN_ID),
			42,
			expiry,
		)
	}

	#[test]
	fn test_designated_signer_before_expiry() {
		let gate = AuthorizationGate::default();
		let message = default_message(NOW + 60);

		let authorization = gate
			.authorize(&message, &context(relayer().address(), NOW))
			.unwrap();

		assert_eq!(authorization.signer, relayer().address());
		assert_eq!(authorization.auction_id, 42);
		assert_eq!(authorization.recipient, recipient());
		assert_eq!(authorization.path, AuthorizationPath::Designated);
	}

	#[test]
	fn test_wrong_signer_rejected_for_any_caller() {
		let gate = AuthorizationGate::default();
		let message = signed_message(
			&outsider(),
			&AuthorizationDomain::relayer_cartel(CHAIN_ID),
			42,
			NOW + 60,
		);

		for caller in [relayer().address(), outsider().address(), recipient()] {
			assert_eq!(
				gate.authorize(&message, &context(caller, NOW)),
				Err(AuthError::InvalidSignature)
			);
		}
		// Expiry does not rescue a foreign signature.
		assert_eq!(
			gate.authorize(&message, &context(recipient(), NOW + 60)),
			Err(AuthError::InvalidSignature)
		);
	}

	#[test]
	fn test_signature_bound_to_auction_expiry_and_chain() {
		let gate = AuthorizationGate::default();
		let message = default_message(NOW + 60);
		let ctx = context(relayer().address(), NOW);
		assert!(gate.authorize(&message, &ctx).is_ok());

		let other_auction = AuctionMessage {
			auction_id: 43,
			..message
		};
		assert_eq!(
			gate.authorize(&other_auction, &ctx),
			Err(AuthError::InvalidSignature)
		);

		let other_expiry = AuctionMessage {
			expiry: NOW + 61,
			..message
		};
		assert_eq!(
			gate.authorize(&other_expiry, &ctx),
			Err(AuthError::InvalidSignature)
		);

		let other_chain = CallContext {
			chain_id: CHAIN_ID + 1,
			..ctx
		};
		assert_eq!(
			gate.authorize(&message, &other_chain),
			Err(AuthError::InvalidSignature)
		);

		for index in [0usize, 40, 64] {
			let mut bytes = message.signature.0;
			bytes[index] ^= if index == 64 { 0x03 } else { 0x01 };
			let tampered = AuctionMessage {
				signature: RawSignature::from(bytes),
				..message
			};
			assert_eq!(
				gate.authorize(&tampered, &ctx),
				Err(AuthError::InvalidSignature),
				"flipping signature byte {} must fail",
				index
			);
		}
	}

	#[test]
	fn test_domain_name_is_bound() {
		let message = default_message(NOW + 60);
		let gate = AuthorizationGate::new("SomeOtherCartel");
		assert_eq!(
			gate.authorize(&message, &context(relayer().address(), NOW)),
			Err(AuthError::InvalidSignature)
		);
	}

	#[test]
	fn test_expiry_boundary() {
		let gate = AuthorizationGate::default();
		let expiry = NOW + 60;
		let message = default_message(expiry);

		assert!(gate
			.authorize(&message, &context(relayer().address(), expiry - 1))
			.is_ok());
		assert_eq!(
			gate.authorize(&message, &context(outsider().address(), expiry - 1)),
			Err(AuthError::Unauthorized {
				caller: outsider().address()
			})
		);

		let at_expiry = gate
			.authorize(&message, &context(outsider().address(), expiry))
			.unwrap();
		assert_eq!(at_expiry.path, AuthorizationPath::Fallback);

		let designated_at_expiry = gate
			.authorize(&message, &context(relayer().address(), expiry))
			.unwrap();
		assert_eq!(designated_at_expiry.path, AuthorizationPath::Fallback);
	}

	#[test]
	fn test_fallback_long_after_expiry() {
		let gate = AuthorizationGate::default();
		let message = default_message(NOW - 120);

		let authorization = gate
			.authorize(&message, &context(recipient(), NOW))
			.unwrap();
		assert_eq!(authorization.path, AuthorizationPath::Fallback);
		assert_eq!(authorization.expiry, NOW - 120);
	}

	#[test]
	fn test_unsupported_version_checked_before_recovery() {
		let mut recovery = MockSignerRecovery::new();
		recovery.expect_recover().never();
		let gate = AuthorizationGate::with_recovery(DEFAULT_DOMAIN_NAME, recovery);

		// Signed under version 1 and presented under version 1.
		let message = signed_message(
			&relayer(),
			&AuthorizationDomain::new(DEFAULT_DOMAIN_NAME, 1, CHAIN_ID),
			42,
			NOW + 60,
		);
		let ctx = CallContext {
			version: 1,
			..context(relayer().address(), NOW)
		};

		assert_eq!(
			gate.authorize(&message, &ctx),
			Err(AuthError::UnsupportedVersion(1))
		);
	}

	#[test]
	fn test_version_one_signature_rejected_by_real_recovery() {
		let gate = AuthorizationGate::default();
		let message = signed_message(
			&relayer(),
			&AuthorizationDomain::new(DEFAULT_DOMAIN_NAME, 1, CHAIN_ID),
			42,
			NOW + 60,
		);
		let ctx = CallContext {
			version: 1,
			..context(relayer().address(), NOW)
		};
		assert_eq!(
			gate.authorize(&message, &ctx),
			Err(AuthError::UnsupportedVersion(1))
		);
		// The same signature is meaningless under version 0.
		assert_eq!(
			gate.authorize(&message, &context(relayer().address(), NOW)),
			Err(AuthError::InvalidSignature)
		);
	}

	#[test]
	fn test_injected_recovery_receives_domain_digest() {
		let message = AuctionMessage {
			auction_id: 7,
			expiry: NOW + 10,
			recipient: recipient(),
			signature: RawSignature::ZERO,
		};
		let expected_digest = compute_auction_signing_hash(
			&AuthorizationDomain::relayer_cartel(CHAIN_ID),
			7,
			NOW + 10,
		);
		let designated = relayer().address();

		let mut recovery = MockSignerRecovery::new();
		recovery
			.expect_recover()
			.withf(move |digest, _| *digest == expected_digest)
			.times(1)
			.returning(move |_, _| Ok(designated));

		let gate = AuthorizationGate::with_recovery(DEFAULT_DOMAIN_NAME, recovery);
		assert!(gate
			.authorize(&message, &context(designated, NOW))
			.is_ok());
	}

	#[test]
	fn test_recovery_failure_reported_as_invalid_signature() {
		let mut recovery = MockSignerRecovery::new();
		recovery
			.expect_recover()
			.returning(|_, _| Err(RecoveryError::HighS));

		let gate = AuthorizationGate::with_recovery(DEFAULT_DOMAIN_NAME, recovery);
		assert_eq!(
			gate.authorize(
				&default_message(NOW + 60),
				&context(relayer().address(), NOW)
			),
			Err(AuthError::InvalidSignature)
		);
	}

	#[test]
	fn test_concurrent_fallback_callers() {
		let gate = AuthorizationGate::default();
		let message = default_message(NOW - 1);
		let callers = [outsider().address(), recipient(), relayer().address()];

		std::thread::scope(|scope| {
			let handles: Vec<_> = callers
				.iter()
				.map(|caller| {
					let gate = &gate;
					let message = &message;
					scope.spawn(move || gate.authorize(message, &context(*caller, NOW)))
				})
				.collect();
			for handle in handles {
				assert!(handle.join().unwrap().is_ok());
			}
		});
	}
}
