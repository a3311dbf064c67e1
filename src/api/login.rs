// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::header::{HeaderName, SET_COOKIE},
    response::AppendHeaders,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::csrf::{clear_csrf_cookie, csrf_cookie, generate_csrf_token},
    auth::nonce::{generate_nonce, nonce_expiry},
    auth::session::{clear_session_cookie, session_cookie},
    auth::{verify_wallet_signature, DataSignature, OptionalAuth},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NonceRequest {
    /// Bech32 address the wallet will sign as.
    pub address: String,
    #[serde(default)]
    pub wallet_name: Option<String>,
    #[serde(default)]
    pub network_id: Option<i32>,
    /// Client-supplied stake address hint, cached on the identity.
    #[serde(default)]
    pub stake_address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NonceResponse {
    /// Full challenge string the wallet must sign, prefix included.
    pub nonce: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    pub address: String,
    pub signature: DataSignature,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Issue a login challenge for an address.
///
/// Re-requesting silently replaces any outstanding challenge, so at
/// most one is valid per address at a time.
#[utoipa::path(
    post,
    path = "/nonce",
    request_body = NonceRequest,
    tag = "Auth",
    responses(
        (status = 200, body = NonceResponse),
        (status = 400, description = "Missing address")
    )
)]
pub async fn request_nonce(
    State(state): State<AppState>,
    Json(request): Json<NonceRequest>,
) -> Result<Json<NonceResponse>, ApiError> {
    let address = request.address.trim();
    if address.is_empty() {
        return Err(ApiError::bad_request("Address is required"));
    }

    let nonce = generate_nonce()?;
    state.db.upsert_login_nonce(
        address,
        &nonce,
        nonce_expiry(Utc::now()),
        request.wallet_name.as_deref(),
        request.network_id,
        request.stake_address.as_deref(),
    )?;

    tracing::debug!(address = %address, "Issued login challenge");
    Ok(Json(NonceResponse { nonce }))
}

/// Verify a signed challenge and start a session.
///
/// The challenge is consumed exactly once on success; a failed
/// signature leaves it intact so the wallet can retry signing.
#[utoipa::path(
    post,
    path = "/verify",
    request_body = VerifyRequest,
    tag = "Auth",
    responses(
        (status = 200, body = OkResponse, description = "Session and CSRF cookies set"),
        (status = 401, description = "Unknown, expired or already-consumed challenge, or bad signature")
    )
)]
pub async fn verify_signature(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<(AppendHeaders<[(HeaderName, String); 2]>, Json<OkResponse>), ApiError> {
    let now = Utc::now();
    let challenge_rejected = || ApiError::unauthenticated("Login challenge is invalid or expired");

    let identity = state
        .db
        .get_identity(&request.address)?
        .ok_or_else(challenge_rejected)?;
    let nonce = identity.nonce.ok_or_else(challenge_rejected)?;
    if !identity.nonce_expires_at.is_some_and(|exp| exp > now) {
        return Err(challenge_rejected());
    }

    if !verify_wallet_signature(&request.address, nonce.as_bytes(), &request.signature) {
        // Challenge stays valid until expiry; the wallet may retry
        return Err(ApiError::unauthenticated("Signature verification failed"));
    }

    // Compare-and-clear: a racing login with the same proof loses here
    if !state.db.consume_nonce(&request.address, &nonce, now)? {
        return Err(challenge_rejected());
    }

    let token = state.sessions.issue(&request.address, now)?;
    let csrf = generate_csrf_token()?;

    tracing::info!(address = %request.address, "Wallet login verified");
    Ok((
        AppendHeaders([
            (SET_COOKIE, session_cookie(&token)),
            (SET_COOKIE, csrf_cookie(&csrf)),
        ]),
        Json(OkResponse { ok: true }),
    ))
}

/// End the session by expiring both cookies.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    responses((status = 200, body = OkResponse, description = "Both cookies cleared"))
)]
pub async fn logout() -> (AppendHeaders<[(HeaderName, String); 2]>, Json<OkResponse>) {
    (
        AppendHeaders([
            (SET_COOKIE, clear_session_cookie()),
            (SET_COOKIE, clear_csrf_cookie()),
        ]),
        Json(OkResponse { ok: true }),
    )
}

/// Report whether the request carries a valid session.
#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    responses((status = 200, body = MeResponse))
)]
pub async fn me(OptionalAuth(wallet): OptionalAuth) -> Json<MeResponse> {
    match wallet {
        Some(wallet) => Json(MeResponse {
            authenticated: true,
            address: Some(wallet.address),
        }),
        None => Json(MeResponse {
            authenticated: false,
            address: None,
        }),
    }
}
