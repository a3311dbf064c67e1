// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fingerprint reconciliation for provisional owner grants.
//!
//! An NFT minted in the same transaction as an ownership registration
//! has no fingerprint yet, so the grant is stored against the minting
//! wallet with the mint `txhash`. Once the transaction is indexed this
//! job looks the asset up and re-keys the grant onto its fingerprint.
//! Unresolvable records are left untouched and picked up on a later
//! run.

use std::collections::HashMap;

use super::engine::CallerIdentity;
use super::principal::{is_valid_fingerprint, is_valid_txhash};
use super::PrincipalType;
use crate::chain::types::{AssetEntry, TxInfo};
use crate::chain::IndexerClient;
use crate::error::ApiError;
use crate::storage::{AuthDatabase, RoleRecord};

/// Resolve fingerprints for the caller's provisional grants.
///
/// All pending mint references go out as one batched indexer lookup.
/// Returns the number of migrated records; zero candidates short-circuit
/// without touching the indexer.
pub async fn reconcile_wallet_roles(
    db: &AuthDatabase,
    indexer: &IndexerClient,
    caller: &CallerIdentity,
) -> Result<usize, ApiError> {
    let candidates: Vec<RoleRecord> = db
        .list_unreconciled_roles()?
        .into_iter()
        .filter(|r| r.txhash.as_deref().is_some_and(is_valid_txhash))
        .filter(|r| caller.matches_record(r))
        .collect();

    if candidates.is_empty() {
        return Ok(0);
    }

    let mut hashes: Vec<String> = candidates.iter().filter_map(|r| r.txhash.clone()).collect();
    hashes.sort();
    hashes.dedup();

    let infos = indexer.tx_info(&hashes).await.map_err(|err| {
        tracing::error!(error = %err, "Transaction lookup for reconciliation failed");
        ApiError::bad_gateway("Chain indexer unavailable")
    })?;
    let by_hash: HashMap<&str, &TxInfo> = infos.iter().map(|t| (t.tx_hash.as_str(), t)).collect();

    let mut updated = 0;
    for record in &candidates {
        let info = match record.txhash.as_deref().and_then(|h| by_hash.get(h)) {
            Some(info) => info,
            None => continue,
        };
        let fingerprint = match select_fingerprint(record, info) {
            Some(fingerprint) => fingerprint,
            None => continue,
        };

        let old_key = record.principal_key();
        let mut migrated = record.clone();
        migrated.principal_type = PrincipalType::NftFingerprint;
        migrated.fingerprint = Some(fingerprint);
        migrated.wallet_payment_address = None;
        migrated.stake_address = None;
        migrated.policy_id = None;
        db.migrate_role(&old_key, &migrated)?;
        updated += 1;
    }

    tracing::info!(updated, candidates = candidates.len(), "Reconciliation pass complete");
    Ok(updated)
}

/// Pick the fingerprint a record should migrate to.
///
/// Priority: an asset delivered to the record's own wallet beats the
/// mint list, which beats any other output. Within a list the first
/// well-formed fingerprint wins.
fn select_fingerprint(record: &RoleRecord, info: &TxInfo) -> Option<String> {
    if let Some(wallet) = record.wallet_payment_address.as_deref() {
        for output in &info.outputs {
            let to_wallet = output
                .payment_addr
                .as_ref()
                .and_then(|p| p.bech32.as_deref())
                == Some(wallet);
            if to_wallet {
                if let Some(fingerprint) = first_fingerprint(&output.asset_list) {
                    return Some(fingerprint);
                }
            }
        }
    }

    if let Some(fingerprint) = first_fingerprint(&info.assets_minted) {
        return Some(fingerprint);
    }

    info.outputs
        .iter()
        .find_map(|output| first_fingerprint(&output.asset_list))
}

fn first_fingerprint(assets: &[AssetEntry]) -> Option<String> {
    assets
        .iter()
        .filter_map(|asset| asset.fingerprint.as_deref())
        .find(|fp| is_valid_fingerprint(fp))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::types::{PaymentAddr, TxOutput};
    use crate::roles::{Principal, Role};
    use crate::storage::StoredProject;
    use uuid::Uuid;

    const FP_MINE: &str = "asset1aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const FP_MINTED: &str = "asset1bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const FP_OTHER: &str = "asset1cccccccccccccccccccccccccccccccccccccccc";

    fn provisional_record(wallet: &str, txhash: &str) -> RoleRecord {
        let principal = Principal::Wallet {
            payment_address: Some(wallet.to_string()),
            stake_address: None,
        };
        let mut record = RoleRecord::new(Uuid::new_v4(), Role::Owner, &principal, wallet);
        record.txhash = Some(txhash.to_string());
        record
    }

    fn asset(fingerprint: &str) -> AssetEntry {
        AssetEntry {
            policy_id: None,
            asset_name: None,
            fingerprint: Some(fingerprint.to_string()),
            quantity: Some("1".to_string()),
        }
    }

    fn output_to(address: &str, assets: Vec<AssetEntry>) -> TxOutput {
        TxOutput {
            payment_addr: Some(PaymentAddr {
                bech32: Some(address.to_string()),
            }),
            asset_list: assets,
        }
    }

    #[test]
    fn prefers_asset_delivered_to_own_wallet() {
        let record = provisional_record("addr1qminter", &"ab".repeat(32));
        let info = TxInfo {
            tx_hash: "ab".repeat(32),
            outputs: vec![
                output_to("addr1qother", vec![asset(FP_OTHER)]),
                output_to("addr1qminter", vec![asset(FP_MINE)]),
            ],
            assets_minted: vec![asset(FP_MINTED)],
        };
        assert_eq!(select_fingerprint(&record, &info).as_deref(), Some(FP_MINE));
    }

    #[test]
    fn falls_back_to_minted_then_any_output() {
        let record = provisional_record("addr1qminter", &"ab".repeat(32));

        let minted_only = TxInfo {
            tx_hash: "ab".repeat(32),
            outputs: vec![output_to("addr1qother", vec![asset(FP_OTHER)])],
            assets_minted: vec![asset(FP_MINTED)],
        };
        assert_eq!(
            select_fingerprint(&record, &minted_only).as_deref(),
            Some(FP_MINTED)
        );

        let outputs_only = TxInfo {
            tx_hash: "ab".repeat(32),
            outputs: vec![output_to("addr1qother", vec![asset(FP_OTHER)])],
            assets_minted: vec![],
        };
        assert_eq!(
            select_fingerprint(&record, &outputs_only).as_deref(),
            Some(FP_OTHER)
        );
    }

    #[test]
    fn skips_malformed_fingerprints() {
        let record = provisional_record("addr1qminter", &"ab".repeat(32));
        let info = TxInfo {
            tx_hash: "ab".repeat(32),
            outputs: vec![output_to(
                "addr1qminter",
                vec![asset("ASSET1UPPERCASE"), asset("asset1short"), asset(FP_MINE)],
            )],
            assets_minted: vec![],
        };
        assert_eq!(select_fingerprint(&record, &info).as_deref(), Some(FP_MINE));

        let nothing_valid = TxInfo {
            tx_hash: "ab".repeat(32),
            outputs: vec![output_to("addr1qminter", vec![asset("not-a-fingerprint")])],
            assets_minted: vec![],
        };
        assert_eq!(select_fingerprint(&record, &nothing_valid), None);
    }

    fn test_db() -> (AuthDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = AuthDatabase::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    fn dead_indexer() -> IndexerClient {
        IndexerClient::new("http://127.0.0.1:9", None).unwrap()
    }

    #[tokio::test]
    async fn no_candidates_short_circuits_without_indexer() {
        let (db, _dir) = test_db();
        db.insert_project(&StoredProject::new(Uuid::new_v4(), "addr1qalice")).unwrap();

        let caller = CallerIdentity::new("addr1qminter");
        let updated = reconcile_wallet_roles(&db, &dead_indexer(), &caller).await.unwrap();
        assert_eq!(updated, 0);
    }

    #[tokio::test]
    async fn candidates_of_other_wallets_are_ignored() {
        let (db, _dir) = test_db();
        db.upsert_role(&provisional_record("addr1qsomeoneelse", &"ab".repeat(32))).unwrap();

        // The record belongs to another wallet, so the pass has nothing
        // to resolve and never reaches the (dead) indexer.
        let caller = CallerIdentity::new("addr1qminter");
        let updated = reconcile_wallet_roles(&db, &dead_indexer(), &caller).await.unwrap();
        assert_eq!(updated, 0);
    }

    #[tokio::test]
    async fn indexer_failure_surfaces_as_bad_gateway() {
        let (db, _dir) = test_db();
        db.upsert_role(&provisional_record("addr1qminter", &"ab".repeat(32))).unwrap();

        let caller = CallerIdentity::new("addr1qminter");
        let err = reconcile_wallet_roles(&db, &dead_indexer(), &caller)
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn resolved_records_never_reenter_the_pass() {
        let (db, _dir) = test_db();
        let record = provisional_record("addr1qminter", &"ab".repeat(32));
        db.upsert_role(&record).unwrap();

        // Simulate a successful earlier pass
        let old_key = record.principal_key();
        let mut migrated = record.clone();
        migrated.principal_type = PrincipalType::NftFingerprint;
        migrated.fingerprint = Some(FP_MINE.to_string());
        migrated.wallet_payment_address = None;
        migrated.stake_address = None;
        db.migrate_role(&old_key, &migrated).unwrap();

        // Second run finds no candidates even with identifiers supplied
        let mut caller = CallerIdentity::new("addr1qminter");
        caller.nft_identifiers = vec![FP_MINE.to_string()];
        let updated = reconcile_wallet_roles(&db, &dead_indexer(), &caller).await.unwrap();
        assert_eq!(updated, 0);
    }
}
