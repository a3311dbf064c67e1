// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Double-submit CSRF protection.
//!
//! The login response sets a JS-readable `csrf` cookie alongside the
//! session cookie. Frontends echo its value in the `x-csrf-token`
//! header on every mutating request; the pair must match byte for byte.
//! Cross-origin scripts can neither read the cookie nor set the header,
//! which is the whole defense.

use axum::http::Method;

use super::nonce::random_hex;
use crate::error::ApiError;

/// JS-readable cookie half of the double-submit pair.
pub const CSRF_COOKIE: &str = "csrf";

/// Request header half of the double-submit pair.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Fresh CSRF token, 32 hex characters.
pub fn generate_csrf_token() -> Result<String, ApiError> {
    random_hex(16)
}

/// Whether a method mutates state and therefore needs the token pair.
pub fn requires_csrf(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// `Set-Cookie` value installing a CSRF token. Deliberately not
/// `HttpOnly`: the frontend must read it back.
pub fn csrf_cookie(token: &str) -> String {
    format!(
        "{CSRF_COOKIE}={token}; Path=/; Max-Age={}; SameSite=Lax",
        super::session::SESSION_MAX_AGE_SECS
    )
}

/// `Set-Cookie` value removing the CSRF cookie.
pub fn clear_csrf_cookie() -> String {
    format!("{CSRF_COOKIE}=; Path=/; Max-Age=0; SameSite=Lax")
}
