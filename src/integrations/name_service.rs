use std::fmt;
use std::time::Duration;

use ethers::abi::{self, ParamType, Token};
use ethers::utils::keccak256;

use super::base_rpc::BaseRpcClient;
use super::http::{FetchGate, HttpRequest};
use crate::{
    config::Config,
    constants::{BASE_REVERSE_NAMESPACE, RESOLVER_NAME_SELECTOR},
    error::{AppError, Result},
    models::WalletAddress,
    utils::join_url,
};

/// One independent name-resolution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// Basenames reverse record read through the Base L2 resolver contract.
    Basename,
    /// ENS reverse record through a public REST resolver.
    Ens,
    /// web3.bio universal profile search.
    Web3Bio,
}

impl NameSource {
    pub const ALL: [NameSource; 3] = [NameSource::Basename, NameSource::Ens, NameSource::Web3Bio];

    pub fn label(&self) -> &'static str {
        match self {
            NameSource::Basename => "basename",
            NameSource::Ens => "ens",
            NameSource::Web3Bio => "web3bio",
        }
    }
}

impl fmt::Display for NameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone)]
pub struct NameServiceClient {
    gate: FetchGate,
    rpc: BaseRpcClient,
    ens_api_url: String,
    web3bio_api_url: String,
    resolver_address: String,
    timeout: Duration,
}

impl NameServiceClient {
    pub fn from_config(gate: FetchGate, config: &Config) -> Self {
        let timeout = config.name_timeout();
        Self {
            rpc: BaseRpcClient::new(gate.clone(), config.base_rpc_url.clone(), timeout),
            gate,
            ens_api_url: config.ens_api_url.clone(),
            web3bio_api_url: config.web3bio_api_url.clone(),
            resolver_address: config.basename_resolver_address.clone(),
            timeout,
        }
    }

    /// `Ok(None)` means the source answered and has no name for the address.
    pub async fn lookup(&self, source: NameSource, address: &WalletAddress) -> Result<Option<String>> {
        let name = match source {
            NameSource::Basename => self.lookup_basename(address).await?,
            NameSource::Ens => self.lookup_ens(address).await?,
            NameSource::Web3Bio => self.lookup_web3bio(address).await?,
        };
        Ok(name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()))
    }

    async fn lookup_basename(&self, address: &WalletAddress) -> Result<Option<String>> {
        let calldata = basename_calldata(address);
        let bytes = self.rpc.eth_call(&self.resolver_address, &calldata).await?;
        decode_abi_string(&bytes)
    }

    async fn lookup_ens(&self, address: &WalletAddress) -> Result<Option<String>> {
        let url = join_url(&self.ens_api_url, &address.to_lower_hex());
        let payload: serde_json::Value = self
            .gate
            .fetch_json("ens lookup", HttpRequest::get(url), self.timeout)
            .await?;
        Ok(payload
            .get("name")
            .and_then(|value| value.as_str())
            .map(str::to_string))
    }

    async fn lookup_web3bio(&self, address: &WalletAddress) -> Result<Option<String>> {
        let url = join_url(&self.web3bio_api_url, &address.to_lower_hex());
        // web3.bio answers 404 for addresses without a profile
        let payload: Option<serde_json::Value> = self
            .gate
            .fetch_json_or_none("web3bio lookup", HttpRequest::get(url), self.timeout)
            .await?;
        Ok(payload.and_then(|payload| first_web3bio_identity(&payload)))
    }
}

/// ENS namehash (EIP-137).
pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&node);
        buf[32..].copy_from_slice(&label_hash);
        node = keccak256(buf);
    }
    node
}

/// Reverse node `<addr>.80002105.reverse` for Base primary names.
pub fn basename_reverse_node(address: &WalletAddress) -> [u8; 32] {
    let lower = address.to_lower_hex();
    let bare = lower.trim_start_matches("0x");
    namehash(&format!("{}.{}", bare, BASE_REVERSE_NAMESPACE))
}

fn basename_calldata(address: &WalletAddress) -> String {
    format!(
        "0x{}{}",
        RESOLVER_NAME_SELECTOR,
        hex::encode(basename_reverse_node(address))
    )
}

fn decode_abi_string(bytes: &[u8]) -> Result<Option<String>> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let tokens = abi::decode(&[ParamType::String], bytes)
        .map_err(|e| AppError::Parse(format!("resolver name(): {}", e)))?;
    match tokens.into_iter().next() {
        Some(Token::String(name)) => Ok(Some(name)),
        _ => Ok(None),
    }
}

fn first_web3bio_identity(payload: &serde_json::Value) -> Option<String> {
    let profiles = match payload {
        serde_json::Value::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };
    profiles
        .iter()
        .filter_map(|profile| profile.get("identity").and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|identity| !identity.is_empty() && !identity.starts_with("0x"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::http::testing::*;
    use std::sync::Arc;

    #[test]
    fn namehash_matches_eip137_vectors() {
        assert_eq!(namehash(""), [0u8; 32]);
        assert_eq!(
            hex::encode(namehash("eth")),
            "93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            hex::encode(namehash("foo.eth")),
            "de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn basename_calldata_uses_name_selector() {
        let address = WalletAddress::parse("0x000000000000000000000000000000000000dEaD").unwrap();
        let calldata = basename_calldata(&address);
        assert!(calldata.starts_with("0x691f3431"));
        assert_eq!(calldata.len(), 2 + 8 + 64);
    }

    #[test]
    fn decode_abi_string_reads_dynamic_string() {
        let encoded = abi::encode(&[Token::String("alice.base.eth".to_string())]);
        assert_eq!(
            decode_abi_string(&encoded).unwrap(),
            Some("alice.base.eth".to_string())
        );
        assert_eq!(decode_abi_string(&[]).unwrap(), None);
    }

    #[tokio::test]
    async fn web3bio_not_found_is_no_name() {
        let transport = Arc::new(StubTransport::new().route(
            &["web3.bio"],
            StubReply::Text(404, r#"{"error":"Not Found"}"#.to_string()),
        ));
        let client = NameServiceClient::from_config(gate(&transport), &Config::default());
        let address = WalletAddress::parse("0x000000000000000000000000000000000000dEaD").unwrap();

        let name = client.lookup(NameSource::Web3Bio, &address).await.unwrap();

        assert_eq!(name, None);
    }

    #[test]
    fn web3bio_skips_hex_identities() {
        let payload = serde_json::json!([
            { "identity": "0xabc", "platform": "ethereum" },
            { "identity": "alice.eth", "platform": "ens" }
        ]);
        assert_eq!(first_web3bio_identity(&payload), Some("alice.eth".to_string()));
        assert_eq!(first_web3bio_identity(&serde_json::json!({"error": "not found"})), None);
    }
}
