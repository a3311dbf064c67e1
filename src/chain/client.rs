// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Koios-style chain indexer REST client.
//!
//! All lookups are single POST request/response calls with a client-level
//! timeout and no retry; callers decide whether a failure degrades (address
//! resolution) or surfaces (reconciliation).

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use super::types::{AccountAddresses, AddressInfo, TxInfo};
use crate::config::{env_optional, env_or_default, KOIOS_API_KEY_ENV, KOIOS_BASE_URL_ENV};

const DEFAULT_BASE_URL: &str = "https://api.koios.rest/api/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error("indexer configuration invalid: {0}")]
    Config(String),

    #[error("indexer request failed: {0}")]
    Request(String),

    #[error("indexer returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("indexer response was invalid: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct IndexerClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl IndexerClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, IndexerError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| IndexerError::Config(format!("invalid base URL {base_url}: {e}")))?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IndexerError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: parsed.to_string().trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    pub fn from_env() -> Result<Self, IndexerError> {
        let base_url = env_or_default(KOIOS_BASE_URL_ENV, DEFAULT_BASE_URL);
        let api_key = env_optional(KOIOS_API_KEY_ENV);
        Self::new(&base_url, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Address detail for the given payment addresses.
    pub async fn address_info(
        &self,
        addresses: &[String],
    ) -> Result<Vec<AddressInfo>, IndexerError> {
        self.post_json("/address_info", &json!({ "_addresses": addresses }))
            .await
    }

    /// Payment addresses associated with the given stake addresses.
    pub async fn account_addresses(
        &self,
        stake_addresses: &[String],
    ) -> Result<Vec<AccountAddresses>, IndexerError> {
        self.post_json(
            "/account_addresses",
            &json!({ "_stake_addresses": stake_addresses }),
        )
        .await
    }

    /// Transaction detail (outputs + minted assets) for a batch of hashes.
    pub async fn tx_info(&self, tx_hashes: &[String]) -> Result<Vec<TxInfo>, IndexerError> {
        self.post_json(
            "/tx_info",
            &json!({ "_tx_hashes": tx_hashes, "_assets": true }),
        )
        .await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &Value,
    ) -> Result<T, IndexerError> {
        let mut request = self
            .http
            .post(self.endpoint(path))
            .header("Content-Type", "application/json")
            .json(payload);

        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| IndexerError::Request(format!("POST {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(IndexerError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| IndexerError::InvalidResponse(format!("POST {path} invalid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_malformed_base_url() {
        let result = IndexerClient::new("not a url", None);
        assert!(matches!(result, Err(IndexerError::Config(_))));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = IndexerClient::new("https://api.koios.rest/api/v1/", None).unwrap();
        assert_eq!(
            client.endpoint("/tx_info"),
            "https://api.koios.rest/api/v1/tx_info"
        );
    }

    #[tokio::test]
    async fn unreachable_indexer_surfaces_request_error() {
        let client = IndexerClient::new("http://127.0.0.1:9", None).unwrap();
        let result = client.address_info(&["addr1xyz".to_string()]).await;
        assert!(matches!(result, Err(IndexerError::Request(_))));
    }
}
