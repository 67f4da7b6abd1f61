use ethers::types::U256;

use crate::{
    constants::{BALANCE_DISPLAY_DECIMALS, NATIVE_TOKEN_DECIMALS, NATIVE_TOKEN_SYMBOL},
    integrations::base_rpc::BaseRpcClient,
    models::{Balance, Resolution, WalletAddress},
    utils::format_units_fixed,
};

pub fn balance_from_wei(wei: U256) -> Balance {
    Balance {
        amount: format_units_fixed(wei, NATIVE_TOKEN_DECIMALS, BALANCE_DISPLAY_DECIMALS),
        unit: NATIVE_TOKEN_SYMBOL.to_string(),
    }
}

/// Native ETH balance on Base via `eth_getBalance`.
pub struct BalanceResolver {
    rpc: BaseRpcClient,
}

impl BalanceResolver {
    pub fn new(rpc: BaseRpcClient) -> Self {
        Self { rpc }
    }

    /// Never fails: any RPC, timeout or parse error yields `Undetermined`.
    pub async fn resolve(&self, address: &WalletAddress) -> Resolution<Balance> {
        match self.rpc.get_balance(address).await {
            Ok(wei) => Resolution::Known(balance_from_wei(wei)),
            Err(err) => {
                if err.is_transient() {
                    tracing::debug!("balance for {} unavailable: {}", address, err);
                } else {
                    tracing::warn!("balance for {} failed: {}", address, err);
                }
                Resolution::Undetermined
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::http::testing::*;
    use std::sync::Arc;
    use std::time::Duration;

    const DEAD: &str = "0x000000000000000000000000000000000000dEaD";

    fn resolver(transport: &Arc<StubTransport>) -> BalanceResolver {
        BalanceResolver::new(BaseRpcClient::new(
            gate(transport),
            "https://rpc.test".to_string(),
            Duration::from_secs(5),
        ))
    }

    #[test]
    fn zero_wei_renders_four_decimals() {
        assert_eq!(balance_from_wei(U256::zero()).to_string(), "0.0000 ETH");
        assert_eq!(Balance::zero(), balance_from_wei(U256::zero()));
    }

    #[tokio::test]
    async fn resolves_hex_balance() {
        // 2.5 ETH
        let transport = Arc::new(StubTransport::new().route(
            &["eth_getBalance"],
            StubReply::rpc(serde_json::json!("0x22b1c8c1227a0000")),
        ));
        let address = WalletAddress::parse(DEAD).unwrap();

        let balance = resolver(&transport).resolve(&address).await;

        assert_eq!(balance.known().unwrap().to_string(), "2.5000 ETH");
    }

    #[tokio::test]
    async fn malformed_result_is_undetermined() {
        let transport = Arc::new(StubTransport::new().route(
            &["eth_getBalance"],
            StubReply::rpc(serde_json::json!("not-hex")),
        ));
        let address = WalletAddress::parse(DEAD).unwrap();

        let balance = resolver(&transport).resolve(&address).await;

        assert!(balance.is_undetermined());
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_node_is_undetermined_after_timeout() {
        let transport = Arc::new(StubTransport::new().route(&["eth_getBalance"], StubReply::Hang));
        let address = WalletAddress::parse(DEAD).unwrap();

        let balance = resolver(&transport).resolve(&address).await;

        assert!(balance.is_undetermined());
    }
}
