// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet signature verification.
//!
//! Login proofs are raw Ed25519 signatures over the challenge bytes,
//! shipped as hex alongside the hex public key. Verifying the signature
//! alone is not enough: anyone can sign with their own key. The key must
//! also hash into the claimed address, so the proof binds wallet, key
//! and challenge together.

use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use ed25519_dalek::{Signature, VerifyingKey};
use serde::Deserialize;
use utoipa::ToSchema;

/// Signature material as produced by a CIP-30 wallet's sign call.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DataSignature {
    /// Hex-encoded Ed25519 public key (32 bytes).
    pub key: String,
    /// Hex-encoded Ed25519 signature (64 bytes).
    pub signature: String,
}

/// Check a wallet's proof over `message` for `address`.
///
/// True only when the signature verifies under the supplied key and the
/// key's Blake2b-224 digest equals the address's credential bytes. Any
/// malformed input fails closed.
pub fn verify_wallet_signature(address: &str, message: &[u8], data: &DataSignature) -> bool {
    verify_inner(address, message, data).is_some()
}

fn verify_inner(address: &str, message: &[u8], data: &DataSignature) -> Option<()> {
    let key_bytes: [u8; 32] = hex::decode(&data.key).ok()?.try_into().ok()?;
    let verifying_key = VerifyingKey::from_bytes(&key_bytes).ok()?;

    let sig_bytes = hex::decode(&data.signature).ok()?;
    let signature = Signature::from_slice(&sig_bytes).ok()?;

    verifying_key.verify_strict(message, &signature).ok()?;

    if address_binds_key(address, &key_bytes) {
        Some(())
    } else {
        None
    }
}

/// Whether `address` carries the Blake2b-224 hash of `key_bytes` as its
/// leading credential.
///
/// Shelley address payloads are a header byte followed by a 28-byte
/// credential: the payment credential for payment-led forms, the stake
/// credential for stake (reward) addresses. One slice rule covers both.
fn address_binds_key(address: &str, key_bytes: &[u8; 32]) -> bool {
    let payload = match bech32::decode(address) {
        Ok((_hrp, payload)) => payload,
        Err(_) => return false,
    };
    if payload.len() < 29 {
        return false;
    }
    match blake2b_224(key_bytes) {
        Some(hash) => payload[1..29] == hash,
        None => false,
    }
}

fn blake2b_224(input: &[u8]) -> Option<[u8; 28]> {
    let mut hasher = Blake2bVar::new(28).ok()?;
    hasher.update(input);
    let mut out = [0u8; 28];
    hasher.finalize_variable(&mut out).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bech32::{Bech32, Hrp};
    use ed25519_dalek::{Signer, SigningKey};

    /// Deterministic key plus a bech32 address carrying its hash.
    fn test_wallet(seed: u8, header: u8, hrp: &str) -> (SigningKey, String) {
        let signing = SigningKey::from_bytes(&[seed; 32]);
        let hash = blake2b_224(signing.verifying_key().as_bytes()).unwrap();
        let mut payload = vec![header];
        payload.extend_from_slice(&hash);
        let address = bech32::encode::<Bech32>(Hrp::parse(hrp).unwrap(), &payload).unwrap();
        (signing, address)
    }

    fn proof(signing: &SigningKey, message: &[u8]) -> DataSignature {
        DataSignature {
            key: hex::encode(signing.verifying_key().as_bytes()),
            signature: hex::encode(signing.sign(message).to_bytes()),
        }
    }

    #[test]
    fn accepts_signature_from_bound_payment_address() {
        let (signing, address) = test_wallet(7, 0x60, "addr_test");
        let message = b"Sign in to Cardano Dashboard: 0123456789abcdef0123456789abcdef";
        assert!(verify_wallet_signature(&address, message, &proof(&signing, message)));
    }

    #[test]
    fn accepts_signature_from_bound_stake_address() {
        let (signing, address) = test_wallet(9, 0xe0, "stake_test");
        let message = b"challenge";
        assert!(verify_wallet_signature(&address, message, &proof(&signing, message)));
    }

    #[test]
    fn rejects_signature_over_different_message() {
        let (signing, address) = test_wallet(7, 0x60, "addr_test");
        let data = proof(&signing, b"challenge-a");
        assert!(!verify_wallet_signature(&address, b"challenge-b", &data));
    }

    #[test]
    fn rejects_key_not_bound_to_address() {
        // Valid signature, but the address belongs to someone else's key
        let (signing, _) = test_wallet(1, 0x60, "addr_test");
        let (_, other_address) = test_wallet(2, 0x60, "addr_test");
        let message = b"challenge";
        assert!(!verify_wallet_signature(&other_address, message, &proof(&signing, message)));
    }

    #[test]
    fn rejects_malformed_inputs() {
        let (signing, address) = test_wallet(7, 0x60, "addr_test");
        let message = b"challenge";
        let good = proof(&signing, message);

        let bad_key = DataSignature {
            key: "zz".repeat(32),
            ..good.clone()
        };
        assert!(!verify_wallet_signature(&address, message, &bad_key));

        let short_key = DataSignature {
            key: good.key[..60].to_string(),
            ..good.clone()
        };
        assert!(!verify_wallet_signature(&address, message, &short_key));

        let truncated_sig = DataSignature {
            signature: good.signature[..126].to_string(),
            ..good.clone()
        };
        assert!(!verify_wallet_signature(&address, message, &truncated_sig));

        assert!(!verify_wallet_signature("not-a-bech32-address", message, &good));
    }
}
