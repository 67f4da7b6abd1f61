use std::time::Duration;

use ethers::types::U256;
use serde::{de::DeserializeOwned, Deserialize};

use super::http::{FetchGate, HttpRequest};
use crate::{
    error::{AppError, Result},
    models::WalletAddress,
    utils::{parse_hex_quantity, parse_hex_u64},
};

fn rpc_request(method: &str, params: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1
    })
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Base JSON-RPC client
#[derive(Clone)]
pub struct BaseRpcClient {
    gate: FetchGate,
    rpc_url: String,
    timeout: Duration,
}

impl BaseRpcClient {
    pub fn new(gate: FetchGate, rpc_url: String, timeout: Duration) -> Self {
        Self {
            gate,
            rpc_url,
            timeout,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T> {
        let request = HttpRequest::post_json(&self.rpc_url, rpc_request(method, params));
        let response: RpcResponse<T> = self.gate.fetch_json(method, request, self.timeout).await?;

        if let Some(error) = response.error {
            return Err(AppError::Rpc(format!(
                "{} failed ({}): {}",
                method, error.code, error.message
            )));
        }
        response
            .result
            .ok_or_else(|| AppError::Rpc(format!("{} returned no result", method)))
    }

    /// Native balance in base units
    pub async fn get_balance(&self, address: &WalletAddress) -> Result<U256> {
        let raw: String = self
            .call(
                "eth_getBalance",
                serde_json::json!([address.to_lower_hex(), "latest"]),
            )
            .await?;
        parse_hex_quantity(&raw)
    }

    /// Account nonce (number of transactions sent from the address)
    pub async fn get_transaction_count(&self, address: &WalletAddress) -> Result<u64> {
        let raw: String = self
            .call(
                "eth_getTransactionCount",
                serde_json::json!([address.to_lower_hex(), "latest"]),
            )
            .await?;
        parse_hex_u64(&raw)
    }

    /// Read-only contract call, returning the raw ABI-encoded bytes
    pub async fn eth_call(&self, to: &str, data: &str) -> Result<Vec<u8>> {
        let raw: String = self
            .call(
                "eth_call",
                serde_json::json!([{ "to": to, "data": data }, "latest"]),
            )
            .await?;
        let digits = raw.trim().trim_start_matches("0x");
        hex::decode(digits).map_err(|e| AppError::Parse(format!("eth_call result: {}", e)))
    }
}
