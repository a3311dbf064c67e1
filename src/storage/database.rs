// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded auth database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `wallet_identities`: address → serialized WalletIdentity
//! - `role_records`: composite key (project_id|role|principal_key) → serialized RoleRecord
//! - `projects`: project_id → serialized StoredProject

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use uuid::Uuid;

use super::records::{RoleRecord, StoredProject, WalletIdentity};
use crate::roles::{PrincipalType, Role};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary identity table: bech32 address → serialized WalletIdentity (JSON bytes).
const IDENTITIES: TableDefinition<&str, &[u8]> = TableDefinition::new("wallet_identities");

/// Role grants: composite key → serialized RoleRecord (JSON bytes).
/// Key format: `project_id|role|principal_key`, so one key per grant and
/// range scans by project prefix.
const ROLE_RECORDS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("role_records");

/// Projects: uuid string → serialized StoredProject (JSON bytes).
const PROJECTS: TableDefinition<&str, &[u8]> = TableDefinition::new("projects");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthDbError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type AuthDbResult<T> = Result<T, AuthDbError>;

// =============================================================================
// Role Key Helpers
// =============================================================================

/// Build the composite key for one role grant.
///
/// Format: `project_id|role|principal_key`. None of the segments can
/// contain `|`: uuids are hex-and-hyphen, roles are lowercase ascii and
/// principal keys are bech32/hex with a `:` tag.
fn make_role_key(project_id: Uuid, role: Role, principal_key: &str) -> Vec<u8> {
    let project = project_id.to_string();
    let role = role.to_string();
    let mut key = Vec::with_capacity(project.len() + 1 + role.len() + 1 + principal_key.len());
    key.extend_from_slice(project.as_bytes());
    key.push(b'|');
    key.extend_from_slice(role.as_bytes());
    key.push(b'|');
    key.extend_from_slice(principal_key.as_bytes());
    key
}

/// Build a prefix key for range scanning all grants of a project.
fn make_project_prefix(project_id: Uuid) -> Vec<u8> {
    let project = project_id.to_string();
    let mut prefix = Vec::with_capacity(project.len() + 1);
    prefix.extend_from_slice(project.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Build the upper bound for a project range scan (prefix with 0xFF bytes appended).
fn make_project_prefix_end(project_id: Uuid) -> Vec<u8> {
    let mut end = make_project_prefix(project_id);
    // Append enough 0xFF bytes to be past any valid key with this prefix
    end.extend_from_slice(&[0xFF; 20]);
    end
}

// =============================================================================
// AuthDatabase
// =============================================================================

/// Embedded ACID store for identities, role grants and project ownership.
pub struct AuthDatabase {
    db: Database,
}

impl AuthDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> AuthDbResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(IDENTITIES)?;
            let _ = write_txn.open_table(ROLE_RECORDS)?;
            let _ = write_txn.open_table(PROJECTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Cheap liveness probe used by the readiness endpoint.
    pub fn probe(&self) -> AuthDbResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(PROJECTS)?;
        Ok(())
    }

    // =========================================================================
    // Wallet Identities
    // =========================================================================

    /// Look up a wallet identity by its bech32 address.
    pub fn get_identity(&self, address: &str) -> AuthDbResult<Option<WalletIdentity>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(IDENTITIES)?;
        match table.get(address)? {
            Some(value) => {
                let identity: WalletIdentity = serde_json::from_slice(value.value())?;
                Ok(Some(identity))
            }
            None => Ok(None),
        }
    }

    /// Store a fresh login challenge for an address, creating the identity
    /// row if absent.
    ///
    /// Any outstanding challenge is silently replaced. Optional client
    /// hints overwrite stored values only when supplied; `verified_at`
    /// from a previous login always survives.
    pub fn upsert_login_nonce(
        &self,
        address: &str,
        nonce: &str,
        expires_at: DateTime<Utc>,
        wallet_name: Option<&str>,
        network_id: Option<i32>,
        stake_address: Option<&str>,
    ) -> AuthDbResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(IDENTITIES)?;

            let existing_bytes = table.get(address)?.map(|v| v.value().to_vec());
            let mut identity = match existing_bytes {
                Some(bytes) => serde_json::from_slice(&bytes)?,
                None => WalletIdentity::new(address),
            };

            identity.nonce = Some(nonce.to_string());
            identity.nonce_expires_at = Some(expires_at);
            if let Some(name) = wallet_name {
                identity.wallet_name = Some(name.to_string());
            }
            if let Some(id) = network_id {
                identity.network_id = Some(id);
            }
            if let Some(stake) = stake_address {
                identity.stake_address = Some(stake.to_string());
            }

            let json = serde_json::to_vec(&identity)?;
            table.insert(address, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Atomically consume a login challenge.
    ///
    /// Re-reads the identity inside the write transaction and only clears
    /// the nonce when it still equals `expected_nonce` and has not expired,
    /// so two racing logins with the same signed challenge cannot both
    /// succeed. Returns whether the challenge was consumed; on success the
    /// identity's `verified_at` is set to `now`.
    pub fn consume_nonce(
        &self,
        address: &str,
        expected_nonce: &str,
        now: DateTime<Utc>,
    ) -> AuthDbResult<bool> {
        let write_txn = self.db.begin_write()?;
        let consumed = {
            let mut table = write_txn.open_table(IDENTITIES)?;

            let existing_bytes = table.get(address)?.map(|v| v.value().to_vec());
            match existing_bytes {
                Some(bytes) => {
                    let mut identity: WalletIdentity = serde_json::from_slice(&bytes)?;
                    let live = identity.nonce.as_deref() == Some(expected_nonce)
                        && identity.nonce_expires_at.is_some_and(|exp| exp > now);
                    if live {
                        identity.nonce = None;
                        identity.nonce_expires_at = None;
                        identity.verified_at = Some(now);
                        let json = serde_json::to_vec(&identity)?;
                        table.insert(address, json.as_slice())?;
                    }
                    live
                }
                None => false,
            }
        };
        write_txn.commit()?;
        Ok(consumed)
    }

    // =========================================================================
    // Projects
    // =========================================================================

    /// Look up a project row by id.
    pub fn get_project(&self, project_id: Uuid) -> AuthDbResult<Option<StoredProject>> {
        let key = project_id.to_string();
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROJECTS)?;
        match table.get(key.as_str())? {
            Some(value) => {
                let project: StoredProject = serde_json::from_slice(value.value())?;
                Ok(Some(project))
            }
            None => Ok(None),
        }
    }

    /// Insert or replace a project row. Used by startup seeding; the
    /// dashboard CRUD surface normally owns this table.
    pub fn insert_project(&self, project: &StoredProject) -> AuthDbResult<()> {
        let key = project.id.to_string();
        let json = serde_json::to_vec(project)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PROJECTS)?;
            table.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // =========================================================================
    // Role Records
    // =========================================================================

    /// Insert or replace a role grant under its composite key.
    pub fn upsert_role(&self, record: &RoleRecord) -> AuthDbResult<()> {
        let key = make_role_key(record.project_id, record.role, &record.principal_key());
        let json = serde_json::to_vec(record)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ROLE_RECORDS)?;
            table.insert(key.as_slice(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a single grant by its key parts.
    pub fn get_role(
        &self,
        project_id: Uuid,
        role: Role,
        principal_key: &str,
    ) -> AuthDbResult<Option<RoleRecord>> {
        let key = make_role_key(project_id, role, principal_key);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ROLE_RECORDS)?;
        match table.get(key.as_slice())? {
            Some(value) => {
                let record: RoleRecord = serde_json::from_slice(value.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Remove a grant. Returns whether it existed.
    pub fn delete_role(
        &self,
        project_id: Uuid,
        role: Role,
        principal_key: &str,
    ) -> AuthDbResult<bool> {
        let key = make_role_key(project_id, role, principal_key);
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(ROLE_RECORDS)?;
            let removed = table.remove(key.as_slice())?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// All grants of a project, in key order.
    pub fn list_roles(&self, project_id: Uuid) -> AuthDbResult<Vec<RoleRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ROLE_RECORDS)?;

        let prefix = make_project_prefix(project_id);
        let prefix_end = make_project_prefix_end(project_id);

        let mut records = Vec::new();
        for entry in table.range(prefix.as_slice()..prefix_end.as_slice())? {
            let entry = entry?;
            let record: RoleRecord = serde_json::from_slice(entry.1.value())?;
            records.push(record);
        }
        Ok(records)
    }

    /// Number of non-owner grants on a project, for the grant cap.
    pub fn count_non_owner_roles(&self, project_id: Uuid) -> AuthDbResult<usize> {
        let records = self.list_roles(project_id)?;
        Ok(records.iter().filter(|r| r.role != Role::Owner).count())
    }

    /// Wallet-principal grants across all projects that still await
    /// fingerprint resolution: no fingerprint yet, mint reference
    /// present. Full scan; the table holds one row per grant.
    pub fn list_unreconciled_roles(&self) -> AuthDbResult<Vec<RoleRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ROLE_RECORDS)?;

        let mut records = Vec::new();
        for entry in table.iter()? {
            let entry = entry?;
            let record: RoleRecord = serde_json::from_slice(entry.1.value())?;
            if record.principal_type == PrincipalType::Wallet
                && record.fingerprint.is_none()
                && record.txhash.is_some()
            {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Re-key one grant from its current principal to a resolved
    /// fingerprint principal, in a single transaction.
    ///
    /// `migrated` must already carry the fingerprint fields; its old key
    /// segment is supplied separately because the record no longer knows it.
    pub fn migrate_role(
        &self,
        old_principal_key: &str,
        migrated: &RoleRecord,
    ) -> AuthDbResult<()> {
        let old_key = make_role_key(migrated.project_id, migrated.role, old_principal_key);
        let new_key = make_role_key(migrated.project_id, migrated.role, &migrated.principal_key());
        let json = serde_json::to_vec(migrated)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ROLE_RECORDS)?;
            table.remove(old_key.as_slice())?;
            table.insert(new_key.as_slice(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
