use crate::{
    config::Config,
    error::{AppError, Result},
    integrations::{
        base_rpc::BaseRpcClient, blockscout::BlockscoutClient, explorer::ExplorerClient,
        http::FetchGate, name_service::{NameServiceClient, NameSource},
    },
    models::{WalletAddress, WalletSummary},
};

use super::{
    activity_resolver::ActivityResolver, balance_resolver::BalanceResolver,
    holdings_resolver::HoldingsResolver, identity_resolver::IdentityResolver,
};

/// Lifecycle of a single analysis.
///
/// `Idle -> Validating -> Fetching -> Complete`, or
/// `Idle -> Validating -> Failed` when the input is not an address.
/// There is no edge from `Fetching` to `Failed`: resolvers recover on their own.
#[derive(Debug)]
pub enum AnalysisState {
    Idle,
    Validating,
    Fetching,
    Complete(Box<WalletSummary>),
    Failed(AppError),
}

impl AnalysisState {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::Validating => "validating",
            AnalysisState::Fetching => "fetching",
            AnalysisState::Complete(_) => "complete",
            AnalysisState::Failed(_) => "failed",
        }
    }

    pub fn advance(self, next: AnalysisState) -> Result<AnalysisState> {
        use AnalysisState::*;

        let allowed = matches!(
            (&self, &next),
            (Idle, Validating) | (Validating, Fetching) | (Validating, Failed(_)) | (Fetching, Complete(_))
        );
        if !allowed {
            return Err(AppError::Internal(format!(
                "illegal analysis transition {} -> {}",
                self.name(),
                next.name()
            )));
        }
        Ok(next)
    }

    fn into_outcome(self) -> Result<WalletSummary> {
        match self {
            AnalysisState::Complete(summary) => Ok(*summary),
            AnalysisState::Failed(err) => Err(err),
            other => Err(AppError::Internal(format!(
                "analysis ended in non-terminal state {}",
                other.name()
            ))),
        }
    }
}

/// Runs the four resolvers for one address and merges their results.
pub struct WalletAnalyzer {
    balance: BalanceResolver,
    activity: ActivityResolver,
    identity: IdentityResolver,
    holdings: HoldingsResolver,
}

impl WalletAnalyzer {
    pub fn new(
        balance: BalanceResolver,
        activity: ActivityResolver,
        identity: IdentityResolver,
        holdings: HoldingsResolver,
    ) -> Self {
        Self {
            balance,
            activity,
            identity,
            holdings,
        }
    }

    pub fn from_config(gate: FetchGate, config: &Config) -> Self {
        let rpc = BaseRpcClient::new(
            gate.clone(),
            config.base_rpc_url.clone(),
            config.rpc_timeout(),
        );

        Self::new(
            BalanceResolver::new(rpc.clone()),
            ActivityResolver::new(
                ExplorerClient::etherscan(gate.clone(), config),
                rpc,
                config.activity_page_size,
            ),
            IdentityResolver::new(
                NameServiceClient::from_config(gate.clone(), config),
                NameSource::ALL.to_vec(),
            ),
            HoldingsResolver::new(
                BlockscoutClient::from_config(gate.clone(), config),
                ExplorerClient::holdings_fallback(gate, config),
            ),
        )
    }

    /// Validates `raw` and, if it is an address, builds its summary.
    ///
    /// The only error a caller sees for well-formed input is an internal one;
    /// every upstream failure is folded into a default field value.
    pub async fn analyze(&self, raw: &str) -> Result<WalletSummary> {
        let state = AnalysisState::Idle.advance(AnalysisState::Validating)?;

        let address = match WalletAddress::parse(raw) {
            Ok(address) => address,
            Err(err) => {
                tracing::debug!("rejected address input {:?}", raw);
                return state.advance(AnalysisState::Failed(err))?.into_outcome();
            }
        };

        let state = state.advance(AnalysisState::Fetching)?;
        let summary = self.fetch(address).await;

        tracing::info!(
            "analyzed {}: balance {}, {} txs ({:?}), first {}, last {}, name {:?}, {} holdings, undetermined {:?}",
            summary.address(),
            summary.balance(),
            summary.tx_count(),
            summary.tx_count_source(),
            summary.first_tx(),
            summary.last_tx(),
            summary.name(),
            summary.holdings_count(),
            summary.undetermined()
        );

        state
            .advance(AnalysisState::Complete(Box::new(summary)))?
            .into_outcome()
    }

    async fn fetch(&self, address: WalletAddress) -> WalletSummary {
        let (balance, activity, identity, holdings) = tokio::join!(
            self.balance.resolve(&address),
            self.activity.resolve(&address),
            self.identity.resolve(&address),
            self.holdings.resolve(&address),
        );

        let order: Vec<String> = identity
            .settled
            .iter()
            .map(|attempt| format!("{}={:?}", attempt.source, attempt.outcome))
            .collect();
        match identity.winner {
            Some(source) => tracing::debug!(
                "name for {} from {} (settled: {})",
                address,
                source,
                order.join(", ")
            ),
            None => tracing::debug!("no name for {} (settled: {})", address, order.join(", ")),
        }

        WalletSummary::builder(address)
            .balance(balance)
            .activity(
                activity.tx_count,
                activity.source,
                activity.first_tx,
                activity.last_tx,
            )
            .name(identity.name)
            .holdings(holdings)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::http::testing::*;
    use crate::models::{SummaryField, TxCountSource};
    use std::sync::Arc;
    use std::time::Duration;

    const DEAD: &str = "0x000000000000000000000000000000000000dEaD";

    fn analyzer(transport: &Arc<StubTransport>, config: &Config) -> WalletAnalyzer {
        WalletAnalyzer::from_config(gate(transport), config)
    }

    fn keyed_config() -> Config {
        Config {
            explorer_api_key: Some("KEY".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn state_machine_allows_only_forward_edges() {
        let fetching = AnalysisState::Idle
            .advance(AnalysisState::Validating)
            .and_then(|s| s.advance(AnalysisState::Fetching))
            .unwrap();
        assert_eq!(fetching.name(), "fetching");

        let err = fetching
            .advance(AnalysisState::Failed(AppError::InvalidAddressFormat))
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(ref msg) if msg.contains("fetching -> failed")));

        assert!(AnalysisState::Idle.advance(AnalysisState::Fetching).is_err());
        assert!(AnalysisState::Validating
            .advance(AnalysisState::Complete(Box::new(
                WalletSummary::builder(WalletAddress::parse(DEAD).unwrap()).build()
            )))
            .is_err());
    }

    #[tokio::test]
    async fn invalid_input_fails_without_network_calls() {
        let transport = Arc::new(StubTransport::new());

        let err = analyzer(&transport, &keyed_config())
            .analyze("not-an-address")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidAddressFormat));
        assert_eq!(err.to_string(), "Invalid Ethereum address format");
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn zero_balance_renders_four_decimals() {
        let transport = Arc::new(
            StubTransport::new()
                .route(&["eth_getBalance"], StubReply::rpc(serde_json::json!("0x0")))
                .route(&["eth_getTransactionCount"], StubReply::rpc(serde_json::json!("0x0"))),
        );

        let summary = analyzer(&transport, &Config::default())
            .analyze(DEAD)
            .await
            .unwrap();

        assert_eq!(summary.balance().to_string(), "0.0000 ETH");
        assert!(!summary.is_undetermined(SummaryField::Balance));
        assert_eq!(summary.address().to_checksum(), DEAD);
    }

    #[tokio::test(start_paused = true)]
    async fn explorer_timeout_uses_nonce_and_unknown_timestamps() {
        let transport = Arc::new(
            StubTransport::new()
                .route(&["action=txlist"], StubReply::Hang)
                .route(&["eth_getTransactionCount"], StubReply::rpc(serde_json::json!("0x5")))
                .route(&["eth_getBalance"], StubReply::rpc(serde_json::json!("0x0"))),
        );
        let started = tokio::time::Instant::now();

        let summary = analyzer(&transport, &keyed_config())
            .analyze(DEAD)
            .await
            .unwrap();

        assert_eq!(summary.tx_count(), 5);
        assert_eq!(summary.tx_count_source(), TxCountSource::Nonce);
        assert_eq!(summary.first_tx(), "unknown");
        assert_eq!(summary.last_tx(), "unknown");
        assert!(started.elapsed() >= Duration::from_millis(8_000));
    }

    #[tokio::test(start_paused = true)]
    async fn every_upstream_failing_still_yields_summary() {
        let transport = Arc::new(StubTransport::new().route(&["https://"], StubReply::Hang));

        let summary = analyzer(&transport, &keyed_config())
            .analyze(DEAD)
            .await
            .unwrap();

        assert_eq!(summary.balance().to_string(), "0.0000 ETH");
        assert_eq!(summary.tx_count(), 0);
        assert_eq!(summary.tx_count_source(), TxCountSource::Unavailable);
        assert_eq!(summary.first_tx(), "unknown");
        assert_eq!(summary.name(), None);
        assert_eq!(summary.holdings_count(), 0);
        assert_eq!(
            summary.undetermined(),
            &[
                SummaryField::Balance,
                SummaryField::TxCount,
                SummaryField::FirstTx,
                SummaryField::LastTx,
                SummaryField::Name,
                SummaryField::Holdings,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resolvers_run_concurrently() {
        let second = Duration::from_secs(1);
        let transport = Arc::new(
            StubTransport::new()
                .route(&["eth_getBalance"], StubReply::rpc(serde_json::json!("0x0")).after(second))
                .route(
                    &["eth_getTransactionCount"],
                    StubReply::rpc(serde_json::json!("0x1")).after(second),
                )
                .route(&["ensideas"], StubReply::ok(serde_json::json!({"name": "a.eth"})).after(second))
                .route(&["token-balances"], StubReply::ok(serde_json::json!([])).after(second)),
        );
        let started = tokio::time::Instant::now();

        let summary = analyzer(&transport, &Config::default())
            .analyze(DEAD)
            .await
            .unwrap();

        assert_eq!(summary.name(), Some("a.eth"));
        assert!(started.elapsed() < 2 * second);
    }
}
