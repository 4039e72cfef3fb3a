use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    ledger::{AccountReader, LedgerClientConfig},
    models::{ArcadeError, BalanceCache, Result},
};

const SERVICE: &str = "algod";

/// Balance lookups against an Algorand node's REST API.
pub struct AlgodClient {
    http_client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Deserialize)]
struct AccountInformation {
    amount: u64,
}

impl AlgodClient {
    pub fn new(config: LedgerClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ArcadeError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url,
            api_token: config.api_token,
        })
    }

    fn upstream(message: String) -> ArcadeError {
        ArcadeError::Upstream {
            service: SERVICE.to_string(),
            message,
        }
    }
}

#[async_trait]
impl AccountReader for AlgodClient {
    async fn micro_algos(&self, address: &str) -> Result<u64> {
        let url = format!("{}/v2/accounts/{}", self.base_url, address);
        let mut request = self.http_client.get(&url);
        if let Some(token) = &self.api_token {
            request = request.header("X-Algo-API-Token", token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::upstream(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::upstream(format!("{} returned {}", url, status)));
        }

        let account: AccountInformation = response
            .json()
            .await
            .map_err(|e| Self::upstream(format!("Failed to parse response: {}", e)))?;

        debug!("Fetched balance for {}: {} microAlgos", address, account.amount);
        Ok(account.amount)
    }
}

/// Serves repeated balance lookups from a TTL cache.
pub struct CachedAccountReader<R> {
    inner: R,
    cache: BalanceCache,
}

impl<R: AccountReader> CachedAccountReader<R> {
    pub fn new(inner: R, cache: BalanceCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &BalanceCache {
        &self.cache
    }
}

#[async_trait]
impl<R: AccountReader> AccountReader for CachedAccountReader<R> {
    async fn micro_algos(&self, address: &str) -> Result<u64> {
        if let Some(cached) = self.cache.get(address) {
            return Ok(cached);
        }
        let amount = self.inner.micro_algos(address).await?;
        self.cache.set(address, amount);
        Ok(amount)
    }
}
