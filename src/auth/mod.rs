// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Challenge-response wallet login for the dashboard API.
//!
//! ## Auth Flow
//!
//! 1. Frontend requests a challenge for an address (`POST /nonce`)
//! 2. The wallet extension signs the challenge with its Ed25519 key
//! 3. Server verifies (`POST /verify`):
//!    - signature over the exact challenge bytes
//!    - public key hashes into the claimed address
//!    - challenge is unexpired and consumed exactly once
//! 4. On success the response sets two cookies:
//!    - `session`: HMAC-signed token, `HttpOnly`
//!    - `csrf`: JS-readable half of the double-submit pair
//!
//! ## Security
//!
//! - Challenges are single-use and expire after five minutes
//! - Sessions expire server-side regardless of cookie lifetime
//! - Mutating requests must echo the CSRF cookie in `x-csrf-token`

pub mod csrf;
pub mod error;
pub mod extractor;
pub mod nonce;
pub mod session;
pub mod signature;

pub use error::AuthError;
pub use extractor::{Auth, AuthenticatedWallet, CsrfGuard, OptionalAuth};
pub use session::SessionKeys;
pub use signature::{verify_wallet_signature, DataSignature};
