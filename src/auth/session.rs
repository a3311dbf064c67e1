// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed session tokens and their cookies.
//!
//! A token is `base64url(payload) . base64url(hmac-sha256(payload))`
//! over the server secret, where the payload records the wallet address
//! and issue time. Verification recomputes the tag in constant time and
//! enforces a server-side maximum age, so a stolen cookie stops working
//! even if the client ignores cookie expiry.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::error::AuthError;
use crate::config;
use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Cookie carrying the signed session token. Not readable from JS.
pub const SESSION_COOKIE: &str = "session";

/// Maximum session age (30 days), applied both as cookie `Max-Age` and
/// server-side against the payload's issue time.
pub const SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Serialize, Deserialize)]
struct SessionPayload {
    address: String,
    issued_at_ms: i64,
}

/// HMAC keys for issuing and verifying session tokens.
pub struct SessionKeys {
    secret: Vec<u8>,
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    /// Load the signing secret from `SESSION_SECRET`. Returns `None`
    /// when unset; the server must not start without it.
    pub fn from_env() -> Option<Self> {
        let secret = config::env_optional(config::SESSION_SECRET_ENV)?;
        Some(Self::new(secret.as_bytes()))
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::InvalidSession)
    }

    /// Issue a token for an address that just proved key ownership.
    pub fn issue(&self, address: &str, now: DateTime<Utc>) -> Result<String, ApiError> {
        let payload = serde_json::to_vec(&SessionPayload {
            address: address.to_string(),
            issued_at_ms: now.timestamp_millis(),
        })
        .map_err(|_| ApiError::internal("Failed to issue session"))?;

        let mut mac = self
            .mac()
            .map_err(|_| ApiError::internal("Failed to issue session"))?;
        mac.update(&payload);
        let tag = mac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            Base64UrlUnpadded::encode_string(&payload),
            Base64UrlUnpadded::encode_string(&tag)
        ))
    }

    /// Validate a token and return the wallet address it names.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let (payload_b64, tag_b64) = token.split_once('.').ok_or(AuthError::InvalidSession)?;
        let payload =
            Base64UrlUnpadded::decode_vec(payload_b64).map_err(|_| AuthError::InvalidSession)?;
        let tag = Base64UrlUnpadded::decode_vec(tag_b64).map_err(|_| AuthError::InvalidSession)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        // Constant-time comparison
        mac.verify_slice(&tag).map_err(|_| AuthError::InvalidSession)?;

        let payload: SessionPayload =
            serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidSession)?;

        let age_ms = now.timestamp_millis().saturating_sub(payload.issued_at_ms);
        if age_ms > SESSION_MAX_AGE_SECS * 1000 {
            return Err(AuthError::SessionExpired);
        }

        Ok(payload.address)
    }
}

/// `Set-Cookie` value installing a session token.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; Max-Age={SESSION_MAX_AGE_SECS}; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value removing the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
