// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated wallets and CSRF enforcement.
//!
//! Use the `Auth` extractor in handlers to require a valid session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(wallet): Auth) -> impl IntoResponse {
//!     // wallet.address proved key ownership at login
//! }
//! ```
//!
//! Add `CsrfGuard` to mutating handlers to require the double-submit
//! token pair before anything else runs.

use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
};
use chrono::Utc;

use super::csrf::{requires_csrf, CSRF_COOKIE, CSRF_HEADER};
use super::session::SESSION_COOKIE;
use super::AuthError;
use crate::state::AppState;

/// The wallet a request is acting as, taken from its session cookie.
#[derive(Debug, Clone)]
pub struct AuthenticatedWallet {
    /// Bech32 address exactly as it proved key ownership at login.
    pub address: String,
}

/// Extractor that requires a verified session.
pub struct Auth(pub AuthenticatedWallet);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = cookie_value(&parts.headers, SESSION_COOKIE).ok_or(AuthError::MissingSession)?;
        let address = state.sessions.verify(&token, Utc::now())?;
        Ok(Auth(AuthenticatedWallet { address }))
    }
}

/// Optional variant for endpoints that report authentication state
/// instead of requiring it.
pub struct OptionalAuth(pub Option<AuthenticatedWallet>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(wallet)) => Ok(OptionalAuth(Some(wallet))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}

/// Extractor that enforces the CSRF double-submit pair on mutating
/// methods. Safe methods pass through untouched.
pub struct CsrfGuard;

impl FromRequestParts<AppState> for CsrfGuard {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        if !requires_csrf(&parts.method) {
            return Ok(CsrfGuard);
        }

        let header = parts
            .headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::CsrfMissing)?;
        let cookie = cookie_value(&parts.headers, CSRF_COOKIE).ok_or(AuthError::CsrfMissing)?;

        if header != cookie {
            return Err(AuthError::CsrfMismatch);
        }
        Ok(CsrfGuard)
    }
}

/// Find a cookie by name across all `Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let raw = match header.to_str() {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        for pair in raw.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}
