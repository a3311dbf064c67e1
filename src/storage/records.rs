// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stored record types for the embedded database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::roles::{Principal, PrincipalType, Role};

/// One wallet-holder as seen by the login flow.
///
/// Upserted on every login attempt, keyed by `address`. Never hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletIdentity {
    /// Payment-form address, primary key.
    pub address: String,
    /// Stake address cached from a client-supplied login hint. The role
    /// engine's own resolutions are never written back here.
    pub stake_address: Option<String>,
    pub wallet_name: Option<String>,
    pub network_id: Option<i32>,
    /// Outstanding login challenge, if any. At most one per address.
    pub nonce: Option<String>,
    pub nonce_expires_at: Option<DateTime<Utc>>,
    /// Set when a signature over a challenge has been validated.
    pub verified_at: Option<DateTime<Utc>>,
}

impl WalletIdentity {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            stake_address: None,
            wallet_name: None,
            network_id: None,
            nonce: None,
            nonce_expires_at: None,
            verified_at: None,
        }
    }
}

/// One role grant on one project to one principal.
///
/// Exactly one principal field group is populated, consistent with
/// `principal_type`; constructing through [`Principal`] keeps that true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoleRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub role: Role,
    pub principal_type: PrincipalType,
    pub wallet_payment_address: Option<String>,
    pub stake_address: Option<String>,
    pub unit: Option<String>,
    pub policy_id: Option<String>,
    /// Canonical CIP-14 asset fingerprint.
    pub fingerprint: Option<String>,
    /// On-chain mint/transfer reference carried by provisional records
    /// until reconciliation resolves their fingerprint. Retained after
    /// migration as provenance.
    pub txhash: Option<String>,
    pub added_by_address: String,
    pub created_at: DateTime<Utc>,
}

impl RoleRecord {
    pub fn new(project_id: Uuid, role: Role, principal: &Principal, added_by_address: &str) -> Self {
        let mut record = Self {
            id: Uuid::new_v4(),
            project_id,
            role,
            principal_type: principal.principal_type(),
            wallet_payment_address: None,
            stake_address: None,
            unit: None,
            policy_id: None,
            fingerprint: None,
            txhash: None,
            added_by_address: added_by_address.to_string(),
            created_at: Utc::now(),
        };
        match principal {
            Principal::Wallet {
                payment_address,
                stake_address,
            } => {
                record.wallet_payment_address = payment_address.clone();
                record.stake_address = stake_address.clone();
            }
            Principal::NftUnit { unit } => record.unit = Some(unit.clone()),
            Principal::NftPolicy { policy_id } => record.policy_id = Some(policy_id.clone()),
            Principal::NftFingerprint { fingerprint } => {
                record.fingerprint = Some(fingerprint.clone())
            }
        }
        record
    }

    /// Principal identity string, the last segment of the record's
    /// composite store key. Mirrors [`Principal::storage_key`].
    pub fn principal_key(&self) -> String {
        match self.principal_type {
            PrincipalType::Wallet => {
                let id = self
                    .wallet_payment_address
                    .as_deref()
                    .or(self.stake_address.as_deref())
                    .unwrap_or_default();
                format!("wallet:{id}")
            }
            PrincipalType::NftUnit => format!("unit:{}", self.unit.as_deref().unwrap_or_default()),
            PrincipalType::NftPolicy => {
                format!("policy:{}", self.policy_id.as_deref().unwrap_or_default())
            }
            PrincipalType::NftFingerprint => format!(
                "fingerprint:{}",
                self.fingerprint.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// Project row as the dashboard CRUD layer writes it.
///
/// This core reads `id` for existence checks and `owner_address` as the
/// project's implicit owner grant; everything else about projects is out
/// of scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProject {
    pub id: Uuid,
    pub owner_address: String,
    pub created_at: DateTime<Utc>,
}

impl StoredProject {
    pub fn new(id: Uuid, owner_address: &str) -> Self {
        Self {
            id,
            owner_address: owner_address.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_populates_exactly_one_principal_group() {
        let project = Uuid::new_v4();
        let principal = Principal::NftUnit {
            unit: "d5e6bf0500378d4f0da4e8dde6becec7621cd8cbf5cbb9b87013d4cc".to_string(),
        };
        let record = RoleRecord::new(project, Role::Admin, &principal, "addr1qxck8m2lv");

        assert_eq!(record.principal_type, PrincipalType::NftUnit);
        assert!(record.unit.is_some());
        assert!(record.wallet_payment_address.is_none());
        assert!(record.stake_address.is_none());
        assert!(record.policy_id.is_none());
        assert!(record.fingerprint.is_none());
    }

    #[test]
    fn principal_key_matches_principal_storage_key() {
        let principal = Principal::Wallet {
            payment_address: Some("addr1qxck8m2lv".to_string()),
            stake_address: Some("stake1uxpdrerp".to_string()),
        };
        let record = RoleRecord::new(Uuid::new_v4(), Role::Editor, &principal, "addr1qgrantor");
        assert_eq!(record.principal_key(), principal.storage_key());
    }

    #[test]
    fn record_roundtrips_through_json() {
        let principal = Principal::NftFingerprint {
            fingerprint: "asset1ee85cnczcwg9fpwpaqp9h9c2awd0pcyfgxjy45".to_string(),
        };
        let record = RoleRecord::new(Uuid::new_v4(), Role::Owner, &principal, "addr1qgrantor");
        let bytes = serde_json::to_vec(&record).unwrap();
        let parsed: RoleRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, record);
    }
}
