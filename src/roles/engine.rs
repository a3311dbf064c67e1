// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role resolution and mutation.
//!
//! The engine answers one question, "does this caller hold that role on
//! this project", and mediates every change to the grant table. A
//! caller is more than an address: the same wallet may present as its
//! payment address, its stake address, or through NFTs it holds, and a
//! grant matches if any of those identities lines up with the record's
//! principal.

use uuid::Uuid;

use super::principal::Principal;
use super::Role;
use crate::chain::{is_stake_address, resolve_stake_address, IndexerClient};
use crate::error::ApiError;
use crate::storage::{AuthDatabase, RoleRecord, StoredProject};

/// Upper bound on admin/editor grants per project. Re-granting an
/// existing (project, role, principal) does not count against it.
pub const MAX_NON_OWNER_GRANTS: usize = 50;

/// Everything a caller can be matched against.
///
/// `nft_identifiers` is the caller's claim of held units and
/// fingerprints, trusted as supplied. `extra_payment_address` carries a
/// stake key's first resolved payment address on paths that resolve it.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub address: String,
    pub stake_address: Option<String>,
    pub extra_payment_address: Option<String>,
    pub nft_identifiers: Vec<String>,
}

impl CallerIdentity {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            stake_address: None,
            extra_payment_address: None,
            nft_identifiers: Vec::new(),
        }
    }

    /// Build the identity for a session address, asking the indexer for
    /// the payment key's stake counterpart. Indexer failures degrade to
    /// plain address matching rather than blocking the request.
    pub async fn resolve(
        indexer: &IndexerClient,
        address: &str,
        nft_identifiers: Vec<String>,
    ) -> Self {
        let mut identity = Self::new(address);
        identity.nft_identifiers = nft_identifiers;
        if !is_stake_address(address) {
            identity.stake_address = resolve_stake_address(indexer, address).await;
        }
        identity
    }

    fn payment_candidates(&self) -> Vec<&str> {
        let mut candidates = Vec::with_capacity(2);
        if !is_stake_address(&self.address) {
            candidates.push(self.address.as_str());
        }
        if let Some(extra) = self.extra_payment_address.as_deref() {
            candidates.push(extra);
        }
        candidates
    }

    fn stake_candidates(&self) -> Vec<&str> {
        let mut candidates = Vec::with_capacity(2);
        if is_stake_address(&self.address) {
            candidates.push(self.address.as_str());
        }
        if let Some(stake) = self.stake_address.as_deref() {
            candidates.push(stake);
        }
        candidates
    }

    /// Whether any of the caller's addresses equals `address`.
    pub fn matches_address(&self, address: &str) -> bool {
        self.payment_candidates().contains(&address) || self.stake_candidates().contains(&address)
    }

    /// Whether a grant's principal resolves to this caller.
    pub fn matches_record(&self, record: &RoleRecord) -> bool {
        match record.principal_type {
            super::PrincipalType::Wallet => {
                record
                    .wallet_payment_address
                    .as_deref()
                    .is_some_and(|a| self.payment_candidates().contains(&a))
                    || record
                        .stake_address
                        .as_deref()
                        .is_some_and(|s| self.stake_candidates().contains(&s))
            }
            super::PrincipalType::NftUnit => record
                .unit
                .as_deref()
                .is_some_and(|unit| self.nft_identifiers.iter().any(|id| id == unit)),
            super::PrincipalType::NftPolicy => record
                .policy_id
                .as_deref()
                .is_some_and(|policy| self.nft_identifiers.iter().any(|id| id.starts_with(policy))),
            super::PrincipalType::NftFingerprint => record
                .fingerprint
                .as_deref()
                .is_some_and(|fp| self.nft_identifiers.iter().any(|id| id == fp)),
        }
    }
}

/// Stateless facade over the grant table.
pub struct RoleEngine<'a> {
    db: &'a AuthDatabase,
}

impl<'a> RoleEngine<'a> {
    pub fn new(db: &'a AuthDatabase) -> Self {
        Self { db }
    }

    /// Load a project or fail with 404.
    pub fn project(&self, project_id: Uuid) -> Result<StoredProject, ApiError> {
        self.db
            .get_project(project_id)?
            .ok_or_else(|| ApiError::not_found("Project not found"))
    }

    /// Binary membership check for one role.
    ///
    /// The project's `owner_address` acts as an implicit owner grant, so
    /// a freshly created project is ownable before any record exists.
    pub fn has_role(
        &self,
        project: &StoredProject,
        role: Role,
        caller: &CallerIdentity,
    ) -> Result<bool, ApiError> {
        if role == Role::Owner && caller.matches_address(&project.owner_address) {
            return Ok(true);
        }
        let records = self.db.list_roles(project.id)?;
        Ok(records
            .iter()
            .filter(|r| r.role == role)
            .any(|r| caller.matches_record(r)))
    }

    pub fn is_owner(
        &self,
        project: &StoredProject,
        caller: &CallerIdentity,
    ) -> Result<bool, ApiError> {
        self.has_role(project, Role::Owner, caller)
    }

    /// Ownership gate for the mutation endpoints.
    pub fn require_owner(
        &self,
        project: &StoredProject,
        caller: &CallerIdentity,
    ) -> Result<(), ApiError> {
        if self.is_owner(project, caller)? {
            Ok(())
        } else {
            Err(ApiError::forbidden("Caller does not own this project"))
        }
    }

    /// Add an admin or editor grant.
    ///
    /// Upserts on the composite key, so repeating a grant yields a
    /// single row and bypasses the cap; only genuinely new grants count
    /// against [`MAX_NON_OWNER_GRANTS`].
    pub fn grant(
        &self,
        project: &StoredProject,
        role: Role,
        principal: &Principal,
        added_by: &str,
    ) -> Result<RoleRecord, ApiError> {
        if role == Role::Owner {
            return Err(ApiError::bad_request(
                "Owner grants go through the owner endpoints",
            ));
        }

        let existing = self
            .db
            .get_role(project.id, role, &principal.storage_key())?;
        if existing.is_none() && self.db.count_non_owner_roles(project.id)? >= MAX_NON_OWNER_GRANTS
        {
            return Err(ApiError::bad_request("Project grant limit reached"));
        }

        let record = RoleRecord::new(project.id, role, principal, added_by);
        self.db.upsert_role(&record)?;
        Ok(record)
    }

    /// Remove the exact grant addressed by (project, role, principal).
    pub fn revoke(
        &self,
        project_id: Uuid,
        role: Role,
        principal: &Principal,
    ) -> Result<(), ApiError> {
        let removed = self
            .db
            .delete_role(project_id, role, &principal.storage_key())?;
        if removed {
            Ok(())
        } else {
            Err(ApiError::not_found("Role grant not found"))
        }
    }

    /// Record an additional owner principal.
    ///
    /// Ownership accumulates: transfers and owner-NFT registrations add
    /// rows, nothing is displaced. `txhash` marks a provisional record
    /// awaiting fingerprint reconciliation.
    pub fn add_owner(
        &self,
        project: &StoredProject,
        principal: &Principal,
        txhash: Option<String>,
        added_by: &str,
    ) -> Result<RoleRecord, ApiError> {
        let mut record = RoleRecord::new(project.id, Role::Owner, principal, added_by);
        record.txhash = txhash;
        self.db.upsert_role(&record)?;
        Ok(record)
    }
}
