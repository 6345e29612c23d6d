//! secp256k1 signer recovery.
//!
//! Accepts exactly the signatures an on-chain `ECDSA.recover` accepts:
//! `v` must be 27 or 28 and `s` must lie in the lower half of the curve
//! order, so every authorization has a single valid encoding.

use crate::{RecoveryError, SignerRecovery};
use alloy_primitives::{uint, Address, Signature, B256, U256};
use gauntlet_types::RawSignature;

/// Half of the secp256k1 group order; larger `s` values are malleable.
pub const SECP256K1N_HALF: U256 =
	uint!(0x7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0_U256);

/// Recovers signers with secp256k1 public key recovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaRecovery;

impl SignerRecovery for EcdsaRecovery {
	fn recover(&self, digest: &B256, signature: &RawSignature) -> Result<Address, RecoveryError> {
		let bytes = signature.as_slice();

		let y_parity = match bytes[64] {
			27 => false,
			28 => true,
			v => return Err(RecoveryError::InvalidV(v)),
		};

		let r = U256::from_be_slice(&bytes[..32]);
		let s = U256::from_be_slice(&bytes[32..64]);
		if s > SECP256K1N_HALF {
			return Err(RecoveryError::HighS);
		}

		Signature::new(r, s, y_parity)
			.recover_address_from_prehash(digest)
			.map_err(|e| RecoveryError::Unrecoverable(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::keccak256;
	use alloy_signer::SignerSync;
	use alloy_signer_local::PrivateKeySigner;

	const SECP256K1N: U256 =
		uint!(0xfffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141_U256);

	fn signer() -> PrivateKeySigner {
		"0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
			.parse()
			.unwrap()
	}

	fn signed(digest: &B256) -> RawSignature {
		let signature = signer().sign_hash_sync(digest).unwrap();
		RawSignature::from(signature.as_bytes())
	}

	#[test]
	fn test_recovers_signer() {
		let digest = keccak256(b"auction");
		let recovered = EcdsaRecovery.recover(&digest, &signed(&digest)).unwrap();
		assert_eq!(recovered, signer().address());
	}

	#[test]
	fn test_rejects_v_outside_27_28() {
		let digest = keccak256(b"auction");
		for v in [0u8, 1, 29, 37] {
			let mut bytes = signed(&digest).0;
			bytes[64] = v;
			assert_eq!(
				EcdsaRecovery.recover(&digest, &RawSignature::from(bytes)),
				Err(RecoveryError::InvalidV(v))
			);
		}
	}

	#[test]
	fn test_rejects_malleable_high_s() {
		let digest = keccak256(b"auction");
		let mut bytes = signed(&digest).0;

		// (r, n - s, !v) is the same signature mirrored into the upper half.
		let s = U256::from_be_slice(&bytes[32..64]);
		bytes[32..64].copy_from_slice(&(SECP256K1N - s).to_be_bytes::<32>());
		bytes[64] = if bytes[64] == 27 { 28 } else { 27 };

		assert_eq!(
			EcdsaRecovery.recover(&digest, &RawSignature::from(bytes)),
			Err(RecoveryError::HighS)
		);
	}

	#[test]
	fn test_zero_signature_is_unrecoverable() {
		let mut bytes = [0u8; 65];
		bytes[64] = 27;
		assert!(matches!(
			EcdsaRecovery.recover(&keccak256(b"auction"), &RawSignature::from(bytes)),
			Err(RecoveryError::Unrecoverable(_))
		));
	}
}
