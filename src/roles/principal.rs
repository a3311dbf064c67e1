// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role principals and their shape validation.
//!
//! A role record identifies its grantee by exactly one principal field
//! group. Building records through [`Principal`] makes that invariant hold
//! by construction: the variant carries only the fields its type allows.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::chain::addresses::{is_payment_address, is_stake_address};
use crate::error::ApiError;

/// Discriminant stored on every role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalType {
    /// A wallet, identified by payment and/or stake address.
    Wallet,
    /// A native asset identified by its raw unit (policy id + asset name).
    NftUnit,
    /// Any asset under a policy id.
    NftPolicy,
    /// A native asset identified by its CIP-14 fingerprint.
    NftFingerprint,
}

impl std::fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrincipalType::Wallet => write!(f, "wallet"),
            PrincipalType::NftUnit => write!(f, "nft_unit"),
            PrincipalType::NftPolicy => write!(f, "nft_policy"),
            PrincipalType::NftFingerprint => write!(f, "nft_fingerprint"),
        }
    }
}

/// Raw principal fields as they arrive on the wire, before validation.
#[derive(Debug, Clone, Default)]
pub struct PrincipalParts {
    pub wallet_address: Option<String>,
    pub stake_address: Option<String>,
    pub unit: Option<String>,
    pub policy_id: Option<String>,
    pub fingerprint: Option<String>,
}

/// A validated principal identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Wallet {
        payment_address: Option<String>,
        stake_address: Option<String>,
    },
    NftUnit {
        unit: String,
    },
    NftPolicy {
        policy_id: String,
    },
    NftFingerprint {
        fingerprint: String,
    },
}

impl Principal {
    /// Validate wire fields against the declared principal type.
    ///
    /// A wallet principal accepts a stake-form value in `wallet_address`
    /// and re-files it under the stake field; at least one of the two
    /// address fields must survive validation.
    pub fn parse(principal_type: PrincipalType, parts: PrincipalParts) -> Result<Self, ApiError> {
        match principal_type {
            PrincipalType::Wallet => {
                let mut payment = None;
                let mut stake = None;

                if let Some(addr) = parts.wallet_address {
                    if is_payment_address(&addr) {
                        payment = Some(addr);
                    } else if is_stake_address(&addr) {
                        stake = Some(addr);
                    } else {
                        return Err(ApiError::bad_request("wallet_address is not a valid address"));
                    }
                }

                if let Some(addr) = parts.stake_address {
                    if !is_stake_address(&addr) {
                        return Err(ApiError::bad_request("stake_address is not a stake address"));
                    }
                    stake = Some(addr);
                }

                if payment.is_none() && stake.is_none() {
                    return Err(ApiError::bad_request(
                        "wallet principal requires wallet_address or stake_address",
                    ));
                }

                Ok(Principal::Wallet {
                    payment_address: payment,
                    stake_address: stake,
                })
            }
            PrincipalType::NftUnit => {
                let unit = parts
                    .unit
                    .ok_or_else(|| ApiError::bad_request("nft_unit principal requires unit"))?;
                if !is_valid_unit(&unit) {
                    return Err(ApiError::bad_request("unit is not a valid policy+asset unit"));
                }
                Ok(Principal::NftUnit { unit })
            }
            PrincipalType::NftPolicy => {
                let policy_id = parts.policy_id.ok_or_else(|| {
                    ApiError::bad_request("nft_policy principal requires policy_id")
                })?;
                if !is_valid_policy_id(&policy_id) {
                    return Err(ApiError::bad_request("policy_id is not 56 hex characters"));
                }
                Ok(Principal::NftPolicy { policy_id })
            }
            PrincipalType::NftFingerprint => {
                let fingerprint = parts.fingerprint.ok_or_else(|| {
                    ApiError::bad_request("nft_fingerprint principal requires fingerprint")
                })?;
                if !is_valid_fingerprint(&fingerprint) {
                    return Err(ApiError::bad_request(
                        "fingerprint is not a canonical asset fingerprint",
                    ));
                }
                Ok(Principal::NftFingerprint { fingerprint })
            }
        }
    }

    pub fn principal_type(&self) -> PrincipalType {
        match self {
            Principal::Wallet { .. } => PrincipalType::Wallet,
            Principal::NftUnit { .. } => PrincipalType::NftUnit,
            Principal::NftPolicy { .. } => PrincipalType::NftPolicy,
            Principal::NftFingerprint { .. } => PrincipalType::NftFingerprint,
        }
    }

    /// Stable identity string used in the store's composite record key.
    ///
    /// Wallet principals key on the payment address when present, else the
    /// stake address, so re-grants of the same identity collapse onto one
    /// row regardless of which optional fields accompany them.
    pub fn storage_key(&self) -> String {
        match self {
            Principal::Wallet {
                payment_address,
                stake_address,
            } => {
                let id = payment_address
                    .as_deref()
                    .or(stake_address.as_deref())
                    .unwrap_or_default();
                format!("wallet:{id}")
            }
            Principal::NftUnit { unit } => format!("unit:{unit}"),
            Principal::NftPolicy { policy_id } => format!("policy:{policy_id}"),
            Principal::NftFingerprint { fingerprint } => format!("fingerprint:{fingerprint}"),
        }
    }
}

/// 56 hex nibbles.
pub fn is_valid_policy_id(value: &str) -> bool {
    value.len() == 56 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Policy id followed by a variable-length (byte-aligned) hex asset name.
pub fn is_valid_unit(value: &str) -> bool {
    if value.len() < 56 || value.len() > 56 + 64 {
        return false;
    }
    let (policy, asset_name) = value.split_at(56);
    is_valid_policy_id(policy)
        && asset_name.len() % 2 == 0
        && asset_name.chars().all(|c| c.is_ascii_hexdigit())
}

/// Canonical CIP-14 fingerprint shape: `asset1` + at least 10 of `[0-9a-z]`.
pub fn is_valid_fingerprint(value: &str) -> bool {
    match value.strip_prefix("asset1") {
        Some(rest) => {
            rest.len() >= 10
                && rest
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        }
        None => false,
    }
}

/// 64 hex characters, the well-formed transaction reference shape.
pub fn is_valid_txhash(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}
