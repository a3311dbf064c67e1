// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::{Auth, CsrfGuard},
    chain::resolve_stake_address,
    error::ApiError,
    roles::reconcile::reconcile_wallet_roles,
    roles::{CallerIdentity, Principal, PrincipalParts, PrincipalType, Role, RoleEngine},
    state::AppState,
    storage::RoleRecord,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct RolesQuery {
    pub project_id: Uuid,
}

/// Grant and revoke share one body shape; the principal fields are
/// interpreted against `principal_type`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RoleMutationRequest {
    pub project_id: Uuid,
    pub role: Role,
    pub principal_type: PrincipalType,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub stake_address: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub policy_id: Option<String>,
    #[serde(default)]
    pub fingerprint: Option<String>,
    /// Units and fingerprints the caller claims to hold, matched against
    /// NFT-based owner grants when checking authority.
    #[serde(default)]
    pub nft_identifiers: Vec<String>,
}

impl RoleMutationRequest {
    fn principal_parts(&self) -> PrincipalParts {
        PrincipalParts {
            wallet_address: self.wallet_address.clone(),
            stake_address: self.stake_address.clone(),
            unit: self.unit.clone(),
            policy_id: self.policy_id.clone(),
            fingerprint: self.fingerprint.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReconcileResponse {
    /// Provisional records rewritten onto their fingerprint.
    pub updated: usize,
}

/// List every grant on a project.
///
/// Unknown project ids yield an empty list rather than 404; the grant
/// table is the only thing consulted here.
#[utoipa::path(
    get,
    path = "/roles",
    params(RolesQuery),
    tag = "Roles",
    responses(
        (status = 200, body = [RoleRecord]),
        (status = 401, description = "No valid session")
    )
)]
pub async fn list_roles(
    State(state): State<AppState>,
    _wallet: Auth,
    Query(query): Query<RolesQuery>,
) -> Result<Json<Vec<RoleRecord>>, ApiError> {
    let records = state.db.list_roles(query.project_id)?;
    Ok(Json(records))
}

/// Add an admin or editor grant. Owner-gated.
#[utoipa::path(
    post,
    path = "/roles",
    request_body = RoleMutationRequest,
    tag = "Roles",
    responses(
        (status = 201, body = RoleRecord),
        (status = 400, description = "Invalid principal, owner role requested, or grant limit reached"),
        (status = 403, description = "Caller does not own the project"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn grant_role(
    State(state): State<AppState>,
    Auth(wallet): Auth,
    _csrf: CsrfGuard,
    Json(request): Json<RoleMutationRequest>,
) -> Result<(StatusCode, Json<RoleRecord>), ApiError> {
    let engine = RoleEngine::new(&state.db);
    let project = engine.project(request.project_id)?;

    let caller = CallerIdentity::resolve(
        &state.indexer,
        &wallet.address,
        request.nft_identifiers.clone(),
    )
    .await;
    engine.require_owner(&project, &caller)?;

    let mut principal = Principal::parse(request.principal_type, request.principal_parts())?;
    // A payment-form grantee also matches through its stake key later,
    // provided the indexer can name it now. Failure just narrows matching.
    if let Principal::Wallet {
        payment_address: Some(payment),
        stake_address,
    } = &mut principal
    {
        if stake_address.is_none() {
            *stake_address = resolve_stake_address(&state.indexer, payment.as_str()).await;
        }
    }

    let record = engine.grant(&project, request.role, &principal, &wallet.address)?;
    tracing::info!(
        project_id = %project.id,
        role = %record.role,
        principal = %record.principal_key(),
        "Role granted"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// Remove the grant addressed by (project, role, principal). Owner-gated.
#[utoipa::path(
    delete,
    path = "/roles",
    request_body = RoleMutationRequest,
    tag = "Roles",
    responses(
        (status = 204, description = "Grant removed"),
        (status = 403, description = "Caller does not own the project"),
        (status = 404, description = "Project or grant not found")
    )
)]
pub async fn revoke_role(
    State(state): State<AppState>,
    Auth(wallet): Auth,
    _csrf: CsrfGuard,
    Json(request): Json<RoleMutationRequest>,
) -> Result<StatusCode, ApiError> {
    let engine = RoleEngine::new(&state.db);
    let project = engine.project(request.project_id)?;

    let caller = CallerIdentity::resolve(
        &state.indexer,
        &wallet.address,
        request.nft_identifiers.clone(),
    )
    .await;
    engine.require_owner(&project, &caller)?;

    // The storage key prefers the payment address, so no stake resolution
    // is needed to address the same row the grant wrote.
    let principal = Principal::parse(request.principal_type, request.principal_parts())?;
    engine.revoke(project.id, request.role, &principal)?;

    tracing::info!(
        project_id = %project.id,
        role = %request.role,
        principal = %principal.storage_key(),
        "Role revoked"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Rewrite the caller's provisional transaction-based grants onto the
/// asset fingerprints those transactions carried.
#[utoipa::path(
    post,
    path = "/roles-fingerprint",
    tag = "Roles",
    responses(
        (status = 200, body = ReconcileResponse),
        (status = 401, description = "No valid session"),
        (status = 502, description = "Chain indexer unavailable")
    )
)]
pub async fn reconcile_roles(
    State(state): State<AppState>,
    Auth(wallet): Auth,
    _csrf: CsrfGuard,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let caller = CallerIdentity::resolve(&state.indexer, &wallet.address, Vec::new()).await;
    let updated = reconcile_wallet_roles(&state.db, &state.indexer, &caller).await?;
    Ok(Json(ReconcileResponse { updated }))
}
