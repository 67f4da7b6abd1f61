use std::time::Duration;

use serde::Deserialize;

use super::http::{FetchGate, HttpRequest};
use crate::{
    config::Config,
    error::Result,
    models::WalletAddress,
    utils::join_url,
};

#[derive(Debug, Clone, Deserialize)]
pub struct TokenBalanceEntry {
    #[serde(default)]
    pub token: serde_json::Value,
}

impl TokenBalanceEntry {
    /// Contract address of the token. Newer Blockscout releases call the
    /// field `address_hash`, older ones `address`.
    pub fn contract_address(&self) -> Option<&str> {
        self.token
            .get("address_hash")
            .or_else(|| self.token.get("address"))
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Blockscout REST v2 client
#[derive(Clone)]
pub struct BlockscoutClient {
    gate: FetchGate,
    api_url: String,
    timeout: Duration,
}

impl BlockscoutClient {
    pub fn from_config(gate: FetchGate, config: &Config) -> Self {
        Self {
            gate,
            api_url: config.holdings_api_url.clone(),
            timeout: config.holdings_timeout(),
        }
    }

    /// GET /addresses/{address}/token-balances
    pub async fn token_balances(&self, address: &WalletAddress) -> Result<Vec<TokenBalanceEntry>> {
        let url = join_url(
            &self.api_url,
            &format!("addresses/{}/token-balances", address.to_lower_hex()),
        );
        self.gate
            .fetch_json("blockscout token-balances", HttpRequest::get(url), self.timeout)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_address_prefers_address_hash() {
        let entry: TokenBalanceEntry = serde_json::from_value(serde_json::json!({
            "token": { "address_hash": "0xAAA", "address": "0xBBB" },
            "value": "1"
        }))
        .unwrap();
        assert_eq!(entry.contract_address(), Some("0xAAA"));
    }

    #[test]
    fn contract_address_falls_back_to_legacy_field() {
        let entry: TokenBalanceEntry = serde_json::from_value(serde_json::json!({
            "token": { "address": "0xBBB" }
        }))
        .unwrap();
        assert_eq!(entry.contract_address(), Some("0xBBB"));
    }

    #[test]
    fn missing_token_has_no_contract() {
        let entry: TokenBalanceEntry =
            serde_json::from_value(serde_json::json!({ "value": "5" })).unwrap();
        assert_eq!(entry.contract_address(), None);
    }
}
