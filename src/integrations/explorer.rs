use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use super::http::{FetchGate, HttpRequest};
use crate::{
    config::Config,
    constants::EXPLORER_END_BLOCK,
    error::{AppError, Result},
    models::WalletAddress,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExplorerEnvelope {
    status: String,
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerTx {
    pub hash: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerTokenEntry {
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
}

/// Client for Etherscan-style `module=account` endpoints (Etherscan v2
/// multichain, Basescan, Blockscout's compatibility API).
#[derive(Clone)]
pub struct ExplorerClient {
    gate: FetchGate,
    label: &'static str,
    base_url: String,
    chain_id: Option<u64>,
    api_key: Option<String>,
    requires_key: bool,
    timeout: Duration,
}

impl ExplorerClient {
    /// Etherscan v2 API scoped to the configured chain. Needs an API key.
    pub fn etherscan(gate: FetchGate, config: &Config) -> Self {
        Self {
            gate,
            label: "explorer",
            base_url: config.explorer_api_url.clone(),
            chain_id: Some(config.explorer_chain_id),
            api_key: config.explorer_api_key.clone(),
            requires_key: true,
            timeout: config.explorer_timeout(),
        }
    }

    /// Keyless Etherscan-compatible endpoint used as the holdings fallback.
    pub fn holdings_fallback(gate: FetchGate, config: &Config) -> Self {
        Self {
            gate,
            label: "holdings fallback",
            base_url: config.holdings_fallback_api_url.clone(),
            chain_id: None,
            api_key: config.holdings_fallback_api_key.clone(),
            requires_key: false,
            timeout: config.holdings_timeout(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.requires_key || self.api_key.is_some()
    }

    fn account_url(&self, action: &str, extra: &[(&str, String)]) -> Result<String> {
        if !self.has_credentials() {
            return Err(AppError::MissingCredentials(self.label));
        }

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(chain_id) = self.chain_id {
            params.push(("chainid", chain_id.to_string()));
        }
        params.push(("module", "account".to_string()));
        params.push(("action", action.to_string()));
        params.extend(extra.iter().cloned());
        if let Some(key) = &self.api_key {
            params.push(("apikey", key.clone()));
        }

        let url = Url::parse_with_params(&self.base_url, &params)
            .map_err(|e| AppError::Internal(format!("Invalid {} URL: {}", self.label, e)))?;
        Ok(url.into())
    }

    async fn fetch_list<T: DeserializeOwned>(&self, action: &str, url: String) -> Result<Vec<T>> {
        let label = format!("{} {}", self.label, action);
        let envelope: ExplorerEnvelope = self
            .gate
            .fetch_json(&label, HttpRequest::get(url), self.timeout)
            .await?;
        parse_envelope(&label, envelope)
    }

    /// One page of normal transactions for `address`.
    pub async fn txlist(
        &self,
        address: &WalletAddress,
        sort: SortOrder,
        offset: u32,
    ) -> Result<Vec<ExplorerTx>> {
        let url = self.account_url(
            "txlist",
            &[
                ("address", address.to_lower_hex()),
                ("startblock", "0".to_string()),
                ("endblock", EXPLORER_END_BLOCK.to_string()),
                ("page", "1".to_string()),
                ("offset", offset.to_string()),
                ("sort", sort.as_str().to_string()),
            ],
        )?;
        self.fetch_list("txlist", url).await
    }

    /// Token balance list for `address`.
    pub async fn tokenlist(&self, address: &WalletAddress) -> Result<Vec<ExplorerTokenEntry>> {
        let url = self.account_url("tokenlist", &[("address", address.to_lower_hex())])?;
        self.fetch_list("tokenlist", url).await
    }
}

// `status == "0"` with an empty "No ... found" result is an empty list.
fn parse_envelope<T: DeserializeOwned>(label: &str, envelope: ExplorerEnvelope) -> Result<Vec<T>> {
    let empty_result = match &envelope.result {
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Null => true,
        _ => false,
    };

    if envelope.status != "1" {
        let message = envelope.message.to_ascii_lowercase();
        if empty_result && (message.starts_with("no ") || message == "ok") {
            return Ok(Vec::new());
        }
        let detail = match &envelope.result {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        return Err(AppError::ExternalApi(format!(
            "{}: {} ({})",
            label, envelope.message, detail
        )));
    }

    if envelope.result.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(envelope.result)
        .map_err(|e| AppError::Parse(format!("{} result: {}", label, e)))
}
