// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistent Storage Module
//!
//! Single-file embedded store for everything the auth core persists:
//! wallet identities (with their outstanding login challenges), role
//! grants and the project rows consulted for implicit ownership.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/dashboard-auth.redb
//!   wallet_identities   address → WalletIdentity
//!   role_records        project_id|role|principal_key → RoleRecord
//!   projects            project_id → StoredProject
//! ```

pub mod database;
pub mod records;

pub use database::{AuthDatabase, AuthDbError, AuthDbResult};
pub use records::{RoleRecord, StoredProject, WalletIdentity};
