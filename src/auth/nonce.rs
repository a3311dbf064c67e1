// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login challenge generation.
//!
//! A challenge is a human-readable prefix followed by 32 hex characters
//! of CSPRNG output. Wallets display the whole string before signing, so
//! the prefix tells the holder what they are approving.

use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::ApiError;

/// Leading text of every login challenge.
pub const NONCE_PREFIX: &str = "Sign in to Cardano Dashboard: ";

/// Challenge lifetime. Expired challenges are rejected at verification,
/// never swept.
pub const NONCE_TTL_SECS: i64 = 5 * 60;

/// Random hex of `byte_len` bytes (twice as many output characters).
pub(crate) fn random_hex(byte_len: usize) -> Result<String, ApiError> {
    let mut bytes = vec![0u8; byte_len];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| ApiError::internal("Failed to generate random token"))?;
    Ok(hex::encode(bytes))
}

/// Build a fresh challenge string.
pub fn generate_nonce() -> Result<String, ApiError> {
    Ok(format!("{NONCE_PREFIX}{}", random_hex(16)?))
}

/// Expiry instant for a challenge issued at `now`.
pub fn nonce_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::seconds(NONCE_TTL_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_has_prefix_and_hex_tail() {
        let nonce = generate_nonce().unwrap();
        let tail = nonce.strip_prefix(NONCE_PREFIX).unwrap();
        assert_eq!(tail.len(), 32);
        assert!(tail.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn consecutive_nonces_differ() {
        let a = generate_nonce().unwrap();
        let b = generate_nonce().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn expiry_is_five_minutes_out() {
        let now = Utc::now();
        assert_eq!(nonce_expiry(now), now + Duration::seconds(300));
    }
}
