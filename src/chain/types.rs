// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed chain-indexer response shapes.
//!
//! Every field the service reads is declared here with explicit optionals;
//! anything else in the indexer's responses is ignored at deserialization.
//! Nothing downstream touches untyped JSON.

use serde::Deserialize;

/// One entry of an `address_info` lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressInfo {
    pub address: String,
    #[serde(default)]
    pub stake_address: Option<String>,
}

/// One entry of an `account_addresses` lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountAddresses {
    pub stake_address: String,
    /// Payment addresses in indexer-returned order. Callers that need a
    /// single canonical address take the first one (policy choice, not a
    /// guaranteed canonical form).
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// One transaction from a `tx_info` lookup with asset detail requested.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TxInfo {
    pub tx_hash: String,
    #[serde(default)]
    pub outputs: Vec<TxOutput>,
    #[serde(default)]
    pub assets_minted: Vec<AssetEntry>,
}

/// A transaction output with its native assets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TxOutput {
    #[serde(default)]
    pub payment_addr: Option<PaymentAddr>,
    #[serde(default)]
    pub asset_list: Vec<AssetEntry>,
}

/// Output address wrapper as the indexer returns it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentAddr {
    #[serde(default)]
    pub bech32: Option<String>,
}

/// A native asset reference on an output or mint list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssetEntry {
    #[serde(default)]
    pub policy_id: Option<String>,
    #[serde(default)]
    pub asset_name: Option<String>,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
}
