// JSON-RPC client for the indexing service
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::ChainApi;
use crate::account::types::{BalanceInfo, RawTx};
use crate::error::{Result, WalletError};

pub struct RpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // Helper for sending requests
    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        debug!("rpc -> {} (id {})", method, id);

        let response = self.client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::Remote(format!("{} request failed: {}", method, e)))?;

        let body: Value = response.json().await
            .map_err(|e| WalletError::Remote(format!("{}: failed to parse response: {}", method, e)))?;

        extract_result(method, body)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value, field: Option<&str>) -> Result<T> {
        let result = self.send_request(method, params).await?;
        let value = match field {
            Some(name) => result
                .get(name)
                .cloned()
                .ok_or_else(|| WalletError::Remote(format!("{}: no '{}' field in response", method, name)))?,
            None => result,
        };
        serde_json::from_value(value)
            .map_err(|e| WalletError::Remote(format!("{}: unexpected response shape: {}", method, e)))
    }
}

/// Split a JSON-RPC envelope into its result or a remote error.
fn extract_result(method: &str, body: Value) -> Result<Value> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let message = error["message"].as_str().unwrap_or("Unknown error");
        return Err(WalletError::Remote(format!("{}: {}", method, message)));
    }
    match body.get("result") {
        Some(result) => Ok(result.clone()),
        None => Err(WalletError::Remote(format!("{}: response has no result", method))),
    }
}

#[async_trait]
impl ChainApi for RpcClient {
    async fn get_balance(&self, address: &str, min_conf: u64) -> Result<BalanceInfo> {
        self.call("getBalance", json!({ "address": address, "minConf": min_conf }), None).await
    }

    async fn get_tx_count(&self, address: &str) -> Result<u64> {
        self.call("getTransactionCount", json!({ "address": address }), Some("count")).await
    }

    async fn get_gas_price(&self) -> Result<Decimal> {
        self.call("getGasPrice", json!(null), Some("gasPrice")).await
    }

    async fn get_tx_history(&self, address: &str) -> Result<Vec<RawTx>> {
        self.call("getTransactions", json!({ "address": address }), Some("transactions")).await
    }

    async fn get_tx(&self, tx_id: &str, address: &str) -> Result<RawTx> {
        self.call("getTransaction", json!({ "txid": tx_id, "address": address }), None).await
    }

    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String> {
        self.call("sendRawTransaction", json!({ "rawTx": raw_tx_hex }), Some("txid")).await
    }
}
