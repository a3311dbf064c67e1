// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Address normalizer.
//!
//! Classifies Cardano address forms and interconverts them through the chain
//! indexer. Classification is purely lexical (human-readable prefix, no
//! checksum validation). Resolution is fail-open: any indexer failure yields
//! `None`, which callers must treat as "cannot verify, degrade gracefully"
//! and never as "not entitled". No caching here; each call may re-resolve.

use super::client::IndexerClient;

/// Lexical check for a stake (reward) address.
pub fn is_stake_address(value: &str) -> bool {
    value.starts_with("stake1") || value.starts_with("stake_test1")
}

/// Lexical check for a payment address.
pub fn is_payment_address(value: &str) -> bool {
    value.starts_with("addr1") || value.starts_with("addr_test1")
}

/// Resolve the stake address behind a payment address.
///
/// Identity on inputs that already are stake addresses.
pub async fn resolve_stake_address(indexer: &IndexerClient, value: &str) -> Option<String> {
    if is_stake_address(value) {
        return Some(value.to_string());
    }

    match indexer.address_info(&[value.to_string()]).await {
        Ok(infos) => infos.into_iter().next().and_then(|info| info.stake_address),
        Err(e) => {
            tracing::warn!(address = %value, error = %e, "stake address resolution failed");
            None
        }
    }
}

/// Resolve the first payment address associated with a stake address.
///
/// Identity on inputs that are not stake addresses. "First" is the
/// indexer-returned order, a policy choice rather than a canonical form.
pub async fn resolve_first_payment_address(
    indexer: &IndexerClient,
    value: &str,
) -> Option<String> {
    if !is_stake_address(value) {
        return Some(value.to_string());
    }

    match indexer.account_addresses(&[value.to_string()]).await {
        Ok(accounts) => accounts
            .into_iter()
            .next()
            .and_then(|account| account.addresses.into_iter().next()),
        Err(e) => {
            tracing::warn!(stake_address = %value, error = %e, "payment address resolution failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dead_indexer() -> IndexerClient {
        IndexerClient::new("http://127.0.0.1:9", None).unwrap()
    }

    #[test]
    fn stake_prefixes_classify_lexically() {
        assert!(is_stake_address("stake1uxpdrerp9wrxunfh6ukyv5267j70fzxgw0fr3z8zeac5vyqhf9jhy"));
        assert!(is_stake_address("stake_test1uqfu74w3wh4gfzu8m6e7j987h4lq9r3t7ef5gaw497uu85qsqfy2d"));
        assert!(!is_stake_address("addr1qxck8m2lv"));
        assert!(!is_stake_address("stakeholder"));
    }

    #[test]
    fn payment_prefixes_classify_lexically() {
        assert!(is_payment_address("addr1qxck8m2lv"));
        assert!(is_payment_address("addr_test1qz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3n0d3v"));
        assert!(!is_payment_address("stake1uxpdrerp"));
    }

    #[tokio::test]
    async fn stake_input_resolves_to_itself_without_indexer() {
        let stake = "stake1uxpdrerp9wrxunfh6ukyv5267j70fzxgw0fr3z8zeac5vyqhf9jhy";
        let resolved = resolve_stake_address(&dead_indexer(), stake).await;
        assert_eq!(resolved.as_deref(), Some(stake));
    }

    #[tokio::test]
    async fn payment_input_resolves_to_itself_without_indexer() {
        let addr = "addr1qxck8m2lv";
        let resolved = resolve_first_payment_address(&dead_indexer(), addr).await;
        assert_eq!(resolved.as_deref(), Some(addr));
    }

    #[tokio::test]
    async fn indexer_failure_degrades_to_none() {
        let resolved = resolve_stake_address(&dead_indexer(), "addr1qxck8m2lv").await;
        assert_eq!(resolved, None);

        let resolved = resolve_first_payment_address(
            &dead_indexer(),
            "stake1uxpdrerp9wrxunfh6ukyv5267j70fzxgw0fr3z8zeac5vyqhf9jhy",
        )
        .await;
        assert_eq!(resolved, None);
    }
}
