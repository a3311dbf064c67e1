// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cardano Dashboard Auth - Wallet Login and Project Roles
//!
//! This crate provides the authentication and authorization core for the
//! governance dashboard: wallet challenge-response login (CIP-8 style
//! signatures over a server nonce), HMAC-signed cookie sessions with CSRF
//! protection, and per-project role grants resolvable to wallet addresses
//! or NFT holdings.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Login challenges, sessions, CSRF, signature checks
//! - `chain` - Cardano chain indexer client (Koios-shaped REST)
//! - `roles` - Role grants, ownership rules, fingerprint reconciliation
//! - `storage` - Embedded store (redb) for identities, projects and grants

pub mod api;
pub mod auth;
pub mod chain;
pub mod config;
pub mod error;
pub mod roles;
pub mod state;
pub mod storage;
