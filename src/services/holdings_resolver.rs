use std::collections::HashSet;

use crate::{
    error::Result,
    integrations::{blockscout::BlockscoutClient, explorer::ExplorerClient},
    models::{Resolution, WalletAddress},
};

/// Counts distinct token contracts an address holds.
pub struct HoldingsResolver {
    primary: BlockscoutClient,
    fallback: ExplorerClient,
}

impl HoldingsResolver {
    pub fn new(primary: BlockscoutClient, fallback: ExplorerClient) -> Self {
        Self { primary, fallback }
    }

    /// Blockscout token balances first, then the tokenlist fallback only if
    /// the primary failed. Both failing is `Undetermined`.
    pub async fn resolve(&self, address: &WalletAddress) -> Resolution<u64> {
        match self.from_primary(address).await {
            Ok(count) => return Resolution::Known(count),
            Err(err) => {
                tracing::debug!("token balances for {} unavailable: {}", address, err);
            }
        }

        match self.from_fallback(address).await {
            Ok(count) => Resolution::Known(count),
            Err(err) => {
                tracing::warn!("holdings for {} failed on both endpoints: {}", address, err);
                Resolution::Undetermined
            }
        }
    }

    async fn from_primary(&self, address: &WalletAddress) -> Result<u64> {
        let entries = self.primary.token_balances(address).await?;
        Ok(distinct_contracts(
            entries.iter().filter_map(|entry| entry.contract_address()),
        ))
    }

    async fn from_fallback(&self, address: &WalletAddress) -> Result<u64> {
        let entries = self.fallback.tokenlist(address).await?;
        Ok(distinct_contracts(
            entries.iter().map(|entry| entry.contract_address.as_str()),
        ))
    }
}

fn distinct_contracts<'a>(contracts: impl Iterator<Item = &'a str>) -> u64 {
    contracts
        .map(|contract| contract.trim().to_ascii_lowercase())
        .filter(|contract| !contract.is_empty())
        .collect::<HashSet<_>>()
        .len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::integrations::http::testing::*;
    use std::sync::Arc;

    const DEAD: &str = "0x000000000000000000000000000000000000dEaD";

    fn resolver(transport: &Arc<StubTransport>) -> HoldingsResolver {
        let config = Config::default();
        HoldingsResolver::new(
            BlockscoutClient::from_config(gate(transport), &config),
            ExplorerClient::holdings_fallback(gate(transport), &config),
        )
    }

    #[test]
    fn distinct_contracts_ignores_case_and_blanks() {
        let count = distinct_contracts(["0xAbC", "0xabc", " ", "0xdef"].into_iter());
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn primary_counts_distinct_contracts() {
        let transport = Arc::new(StubTransport::new().route(
            &["token-balances"],
            StubReply::ok(serde_json::json!([
                { "token": { "address_hash": "0xAAA" }, "value": "1" },
                { "token": { "address_hash": "0xaaa" }, "value": "1", "token_id": "7" },
                { "token": { "address_hash": "0xBBB" }, "value": "2" },
                { "value": "3" }
            ])),
        ));
        let address = WalletAddress::parse(DEAD).unwrap();

        let holdings = resolver(&transport).resolve(&address).await;

        assert_eq!(holdings, Resolution::Known(2));
        assert_eq!(transport.calls_matching("action=tokenlist"), 0);
    }

    #[tokio::test]
    async fn fallback_used_when_primary_fails() {
        let transport = Arc::new(
            StubTransport::new()
                .route(&["token-balances"], StubReply::Text(503, "unavailable".to_string()))
                .route(
                    &["action=tokenlist"],
                    StubReply::ok(serde_json::json!({
                        "status": "1",
                        "message": "OK",
                        "result": [
                            { "contractAddress": "0x111", "balance": "1" },
                            { "contractAddress": "0x222", "balance": "1" },
                            { "contractAddress": "0x333", "balance": "0" }
                        ]
                    })),
                ),
        );
        let address = WalletAddress::parse(DEAD).unwrap();

        let holdings = resolver(&transport).resolve(&address).await;

        assert_eq!(holdings, Resolution::Known(3));
    }

    #[tokio::test(start_paused = true)]
    async fn both_failing_is_undetermined() {
        let transport = Arc::new(
            StubTransport::new()
                .route(&["token-balances"], StubReply::Hang)
                .route(&["action=tokenlist"], StubReply::Fail("refused".to_string())),
        );
        let address = WalletAddress::parse(DEAD).unwrap();

        let holdings = resolver(&transport).resolve(&address).await;

        assert_eq!(holdings, Resolution::Undetermined);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn empty_wallet_is_known_zero() {
        let transport = Arc::new(
            StubTransport::new().route(&["token-balances"], StubReply::ok(serde_json::json!([]))),
        );
        let address = WalletAddress::parse(DEAD).unwrap();

        let holdings = resolver(&transport).resolve(&address).await;

        assert_eq!(holdings, Resolution::Known(0));
    }
}
