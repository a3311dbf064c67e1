// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{Auth, CsrfGuard},
    chain::{
        is_payment_address, is_stake_address, resolve_first_payment_address,
        resolve_stake_address,
    },
    error::ApiError,
    roles::principal::is_valid_txhash,
    roles::{CallerIdentity, Principal, PrincipalParts, PrincipalType, RoleEngine},
    state::AppState,
    storage::RoleRecord,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransferOwnerRequest {
    pub project_id: Uuid,
    pub new_owner_address: String,
    #[serde(default)]
    pub nft_identifiers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OwnerNftRequest {
    pub project_id: Uuid,
    /// Registers the asset itself as an owner principal.
    #[serde(default)]
    pub unit: Option<String>,
    /// Registers a provisional wallet principal to be upgraded to the
    /// minted asset's fingerprint by reconciliation.
    #[serde(default)]
    pub txhash: Option<String>,
    #[serde(default)]
    pub nft_identifiers: Vec<String>,
}

/// Add another owner to a project.
///
/// Transfers are append-only: the previous owner keeps matching through
/// `owner_address`, the new owner through the inserted record.
#[utoipa::path(
    post,
    path = "/owner",
    request_body = TransferOwnerRequest,
    tag = "Roles",
    responses(
        (status = 201, body = RoleRecord),
        (status = 400, description = "New owner address is malformed"),
        (status = 403, description = "Caller does not own the project"),
        (status = 404, description = "Project not found"),
        (status = 502, description = "Stake-form new owner could not be resolved")
    )
)]
pub async fn transfer_owner(
    State(state): State<AppState>,
    Auth(wallet): Auth,
    _csrf: CsrfGuard,
    Json(request): Json<TransferOwnerRequest>,
) -> Result<(StatusCode, Json<RoleRecord>), ApiError> {
    let engine = RoleEngine::new(&state.db);
    let project = engine.project(request.project_id)?;

    let mut caller = CallerIdentity::resolve(
        &state.indexer,
        &wallet.address,
        request.nft_identifiers.clone(),
    )
    .await;
    // A stake-key session gets one more chance to match owner records
    // that only carry a payment address.
    if is_stake_address(&wallet.address) {
        caller.extra_payment_address =
            resolve_first_payment_address(&state.indexer, &wallet.address).await;
    }
    engine.require_owner(&project, &caller)?;

    let new_owner = request.new_owner_address.trim();
    let principal = if is_stake_address(new_owner) {
        // Grants key on the payment address, so a stake-only owner row
        // must not be written when the indexer cannot name one.
        let payment = resolve_first_payment_address(&state.indexer, new_owner)
            .await
            .ok_or_else(|| {
                ApiError::bad_gateway("Could not resolve a payment address for the new owner")
            })?;
        Principal::Wallet {
            payment_address: Some(payment),
            stake_address: Some(new_owner.to_string()),
        }
    } else if is_payment_address(new_owner) {
        let stake = resolve_stake_address(&state.indexer, new_owner).await;
        Principal::Wallet {
            payment_address: Some(new_owner.to_string()),
            stake_address: stake,
        }
    } else {
        return Err(ApiError::bad_request("new_owner_address is not a valid address"));
    };

    let record = engine.add_owner(&project, &principal, None, &wallet.address)?;
    tracing::info!(
        project_id = %project.id,
        principal = %record.principal_key(),
        "Ownership transferred"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// Register an NFT as an additional owner principal.
///
/// Exactly one of `unit` or `txhash` selects the mode: a known asset is
/// recorded directly, a mint still in flight is recorded provisionally
/// under the caller's wallet until reconciliation upgrades it.
#[utoipa::path(
    post,
    path = "/owner-nft",
    request_body = OwnerNftRequest,
    tag = "Roles",
    responses(
        (status = 201, body = RoleRecord),
        (status = 400, description = "Neither or both of unit/txhash, or malformed values"),
        (status = 403, description = "Caller does not own the project"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn register_owner_nft(
    State(state): State<AppState>,
    Auth(wallet): Auth,
    _csrf: CsrfGuard,
    Json(request): Json<OwnerNftRequest>,
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

    let (principal, txhash) = match (request.unit, request.txhash) {
        (Some(unit), None) => {
            let principal = Principal::parse(
                PrincipalType::NftUnit,
                PrincipalParts {
                    unit: Some(unit),
                    ..Default::default()
                },
            )?;
            (principal, None)
        }
        (None, Some(txhash)) => {
            if !is_valid_txhash(&txhash) {
                return Err(ApiError::bad_request("txhash must be 64 hex characters"));
            }
            let principal = if is_stake_address(&wallet.address) {
                Principal::Wallet {
                    payment_address: None,
                    stake_address: Some(wallet.address.clone()),
                }
            } else {
                Principal::Wallet {
                    payment_address: Some(wallet.address.clone()),
                    stake_address: caller.stake_address.clone(),
                }
            };
            (principal, Some(txhash))
        }
        _ => {
            return Err(ApiError::bad_request("Provide exactly one of unit or txhash"));
        }
    };

    let record = engine.add_owner(&project, &principal, txhash, &wallet.address)?;
    tracing::info!(
        project_id = %project.id,
        principal = %record.principal_key(),
        provisional = record.txhash.is_some(),
        "Owner NFT registered"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedWallet, SessionKeys};
    use crate::chain::IndexerClient;
    use crate::storage::{AuthDatabase, StoredProject};
    use tempfile::TempDir;

    const OWNER: &str = "addr_test1qlocalowner";
    const POLICY: &str = "d5e6bf0500378d4f0da4e8dde6becec7621cd8cbf5cbb9b87013d4cc";

    fn test_state() -> (AppState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = AuthDatabase::open(&dir.path().join("test.redb")).unwrap();
        let indexer = IndexerClient::new("http://127.0.0.1:9", None).unwrap();
        let state = AppState::new(db, indexer, SessionKeys::new(b"test-secret"));
        (state, dir)
    }

    fn seeded_project(state: &AppState) -> Uuid {
        let id = Uuid::new_v4();
        state
            .db
            .insert_project(&StoredProject::new(id, OWNER))
            .unwrap();
        id
    }

    fn as_wallet(address: &str) -> Auth {
        Auth(AuthenticatedWallet {
            address: address.to_string(),
        })
    }

    #[tokio::test]
    async fn transfer_records_the_new_owner() {
        let (state, _dir) = test_state();
        let project_id = seeded_project(&state);

        let (status, Json(record)) = transfer_owner(
            State(state.clone()),
            as_wallet(OWNER),
            CsrfGuard,
            Json(TransferOwnerRequest {
                project_id,
                new_owner_address: "addr_test1qnewowner".to_string(),
                nft_identifiers: Vec::new(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(record.wallet_payment_address.as_deref(), Some("addr_test1qnewowner"));
        assert!(record.txhash.is_none());

        // Both the original and the new owner now pass the ownership gate
        let engine = RoleEngine::new(&state.db);
        let project = engine.project(project_id).unwrap();
        assert!(engine
            .is_owner(&project, &CallerIdentity::new(OWNER))
            .unwrap());
        assert!(engine
            .is_owner(&project, &CallerIdentity::new("addr_test1qnewowner"))
            .unwrap());
    }

    #[tokio::test]
    async fn non_owner_cannot_transfer() {
        let (state, _dir) = test_state();
        let project_id = seeded_project(&state);

        let err = transfer_owner(
            State(state),
            as_wallet("addr_test1qstranger"),
            CsrfGuard,
            Json(TransferOwnerRequest {
                project_id,
                new_owner_address: "addr_test1qnewowner".to_string(),
                nft_identifiers: Vec::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn stake_form_new_owner_needs_the_indexer() {
        // The test indexer is unreachable, so the required payment-address
        // resolution for a stake-form new owner fails upstream.
        let (state, _dir) = test_state();
        let project_id = seeded_project(&state);

        let err = transfer_owner(
            State(state),
            as_wallet(OWNER),
            CsrfGuard,
            Json(TransferOwnerRequest {
                project_id,
                new_owner_address: "stake_test1newownerstake".to_string(),
                nft_identifiers: Vec::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn malformed_new_owner_is_rejected() {
        let (state, _dir) = test_state();
        let project_id = seeded_project(&state);

        let err = transfer_owner(
            State(state),
            as_wallet(OWNER),
            CsrfGuard,
            Json(TransferOwnerRequest {
                project_id,
                new_owner_address: "not-an-address".to_string(),
                nft_identifiers: Vec::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn transfer_on_unknown_project_is_not_found() {
        let (state, _dir) = test_state();
        let err = transfer_owner(
            State(state),
            as_wallet(OWNER),
            CsrfGuard,
            Json(TransferOwnerRequest {
                project_id: Uuid::new_v4(),
                new_owner_address: "addr_test1qnewowner".to_string(),
                nft_identifiers: Vec::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unit_registration_creates_an_nft_owner() {
        let (state, _dir) = test_state();
        let project_id = seeded_project(&state);
        let unit = format!("{POLICY}537061636542756433303735");

        let (status, Json(record)) = register_owner_nft(
            State(state.clone()),
            as_wallet(OWNER),
            CsrfGuard,
            Json(OwnerNftRequest {
                project_id,
                unit: Some(unit.clone()),
                txhash: None,
                nft_identifiers: Vec::new(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(record.principal_type, PrincipalType::NftUnit);
        assert_eq!(record.unit.as_deref(), Some(unit.as_str()));

        // Any wallet presenting the unit now passes the ownership gate
        let engine = RoleEngine::new(&state.db);
        let project = engine.project(project_id).unwrap();
        let mut holder = CallerIdentity::new("addr_test1qsomeoneelse");
        holder.nft_identifiers = vec![unit];
        assert!(engine.is_owner(&project, &holder).unwrap());
    }

    #[tokio::test]
    async fn txhash_registration_is_provisional() {
        let (state, _dir) = test_state();
        let project_id = seeded_project(&state);
        let txhash = "ab".repeat(32);

        let (status, Json(record)) = register_owner_nft(
            State(state.clone()),
            as_wallet(OWNER),
            CsrfGuard,
            Json(OwnerNftRequest {
                project_id,
                unit: None,
                txhash: Some(txhash.clone()),
                nft_identifiers: Vec::new(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(record.principal_type, PrincipalType::Wallet);
        assert_eq!(record.wallet_payment_address.as_deref(), Some(OWNER));
        assert_eq!(record.txhash.as_deref(), Some(txhash.as_str()));
        assert!(record.fingerprint.is_none());
    }

    #[tokio::test]
    async fn exactly_one_of_unit_or_txhash() {
        let (state, _dir) = test_state();
        let project_id = seeded_project(&state);

        let neither = register_owner_nft(
            State(state.clone()),
            as_wallet(OWNER),
            CsrfGuard,
            Json(OwnerNftRequest {
                project_id,
                unit: None,
                txhash: None,
                nft_identifiers: Vec::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(neither.status, StatusCode::BAD_REQUEST);

        let both = register_owner_nft(
            State(state),
            as_wallet(OWNER),
            CsrfGuard,
            Json(OwnerNftRequest {
                project_id,
                unit: Some(POLICY.to_string()),
                txhash: Some("ab".repeat(32)),
                nft_identifiers: Vec::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(both.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_txhash_is_rejected() {
        let (state, _dir) = test_state();
        let project_id = seeded_project(&state);

        let err = register_owner_nft(
            State(state),
            as_wallet(OWNER),
            CsrfGuard,
            Json(OwnerNftRequest {
                project_id,
                unit: None,
                txhash: Some("deadbeef".to_string()),
                nft_identifiers: Vec::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
