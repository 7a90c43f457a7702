//! JSON-RPC transport to the node.
//!
//! [`LedgerRpc`] is the seam the protocol depends on: one generic call with
//! a method name and an ordered parameter list. [`BitcoindRpc`] implements
//! it over HTTP with basic auth.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{LedgerError, Result};

/// Generic request/response call into the ledger node.
///
/// Implementations must be thread-safe (Send + Sync). Implementations do
/// not retry: a timeout or transport failure is returned to the caller,
/// which owns retry policy.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Invoke `method` with the given ordered parameters and return the
    /// result value, or a structured error.
    async fn call(&self, method: &str, params: Value) -> Result<Value>;
}

/// Connection settings for a node's JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Endpoint URL, e.g. `http://127.0.0.1:18443`.
    pub url: String,
    /// RPC basic-auth username.
    pub username: String,
    /// RPC basic-auth password.
    pub password: String,
    /// Wallet to address calls to, appended as `/wallet/<name>`.
    pub wallet: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl RpcConfig {
    /// Create a configuration with a 30 second timeout and no named wallet.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            wallet: None,
            timeout_secs: 30,
        }
    }

    /// Address calls to a named wallet.
    pub fn with_wallet(mut self, wallet: impl Into<String>) -> Self {
        self.wallet = Some(wallet.into());
        self
    }
}

/// JSON-RPC client for a Bitcoin Core style node.
///
/// Each instance owns its request-id counter; ids are unique per call and
/// carry no ordering meaning beyond that.
#[derive(Debug)]
pub struct BitcoindRpc {
    client: reqwest::Client,
    config: RpcConfig,
    next_id: AtomicU64,
}

impl BitcoindRpc {
    /// Create a client from configuration.
    pub fn new(config: RpcConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LedgerError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    fn endpoint(&self) -> String {
        match &self.config.wallet {
            Some(wallet) => format!("{}/wallet/{wallet}", self.config.url),
            None => self.config.url.clone(),
        }
    }
}

#[async_trait]
impl LedgerRpc for BitcoindRpc {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "1.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, id, "ledger rpc call");

        let resp = self
            .client
            .post(self.endpoint())
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Transport(format!("{method}: request timed out"))
                } else {
                    LedgerError::Transport(format!("{method}: {e}"))
                }
            })?;

        let status = resp.status();
        // Error statuses still carry a JSON-RPC error body, so parse first.
        let json: Value = resp.json().await.map_err(|_| {
            LedgerError::Transport(format!("{method}: HTTP {status} with unreadable body"))
        })?;

        if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown RPC error")
                .to_string();
            return Err(LedgerError::Rpc {
                method: method.to_string(),
                message,
            });
        }

        if !status.is_success() {
            return Err(LedgerError::Transport(format!("{method}: HTTP {status}")));
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| LedgerError::MalformedResponse {
                method: method.to_string(),
                reason: "response missing 'result' field".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_with_wallet() {
        let config = RpcConfig::new("http://127.0.0.1:18443", "user", "pass")
            .with_wallet("inscriptions");
        let client = BitcoindRpc::new(config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:18443/wallet/inscriptions"
        );
    }

    #[test]
    fn test_endpoint_without_wallet() {
        let config = RpcConfig::new("http://127.0.0.1:18443", "user", "pass");
        let client = BitcoindRpc::new(config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:18443");
    }

    #[test]
    fn test_request_ids_are_unique() {
        let config = RpcConfig::new("http://127.0.0.1:18443", "user", "pass");
        let client = BitcoindRpc::new(config).unwrap();

        let a = client.next_id.fetch_add(1, Ordering::Relaxed);
        let b = client.next_id.fetch_add(1, Ordering::Relaxed);
        assert_ne!(a, b);
    }
}
