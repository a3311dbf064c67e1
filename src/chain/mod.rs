// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain indexer integration: the typed REST client and the address
//! normalizer built on top of it.

pub mod addresses;
pub mod client;
pub mod types;

pub use addresses::{
    is_payment_address, is_stake_address, resolve_first_payment_address, resolve_stake_address,
};
pub use client::{IndexerClient, IndexerError};
