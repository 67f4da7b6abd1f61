use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, Result},
    integrations::{
        base_rpc::BaseRpcClient,
        explorer::{ExplorerClient, ExplorerTx, SortOrder},
    },
    models::{Resolution, TxCountSource, WalletAddress},
    utils::parse_unix_seconds,
};

/// Transaction count and first/last activity for one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub tx_count: u64,
    pub source: TxCountSource,
    pub first_tx: Resolution<DateTime<Utc>>,
    pub last_tx: Resolution<DateTime<Utc>>,
}

impl Activity {
    fn from_nonce(nonce: u64) -> Self {
        Self {
            tx_count: nonce,
            source: TxCountSource::Nonce,
            first_tx: Resolution::Undetermined,
            last_tx: Resolution::Undetermined,
        }
    }

    fn unavailable() -> Self {
        Self {
            tx_count: 0,
            source: TxCountSource::Unavailable,
            first_tx: Resolution::Undetermined,
            last_tx: Resolution::Undetermined,
        }
    }
}

pub struct ActivityResolver {
    explorer: ExplorerClient,
    rpc: BaseRpcClient,
    page_size: u32,
}

impl ActivityResolver {
    pub fn new(explorer: ExplorerClient, rpc: BaseRpcClient, page_size: u32) -> Self {
        Self {
            explorer,
            rpc,
            page_size,
        }
    }

    /// Explorer history first, RPC nonce second. Never fails.
    pub async fn resolve(&self, address: &WalletAddress) -> Activity {
        match self.from_explorer(address).await {
            Ok(activity) => return activity,
            Err(AppError::MissingCredentials(_)) => {
                tracing::debug!("no explorer key; using nonce for {}", address);
            }
            Err(err) if err.is_transient() => {
                tracing::debug!("explorer history for {} unavailable: {}", address, err);
            }
            Err(err) => {
                tracing::warn!("explorer history for {} failed: {}", address, err);
            }
        }

        match self.rpc.get_transaction_count(address).await {
            Ok(nonce) => Activity::from_nonce(nonce),
            Err(err) => {
                tracing::warn!("nonce fallback for {} failed: {}", address, err);
                Activity::unavailable()
            }
        }
    }

    async fn from_explorer(&self, address: &WalletAddress) -> Result<Activity> {
        if !self.explorer.has_credentials() {
            return Err(AppError::MissingCredentials("explorer"));
        }

        let (ascending, latest) = tokio::try_join!(
            self.explorer.txlist(address, SortOrder::Asc, self.page_size),
            self.explorer.txlist(address, SortOrder::Desc, 1),
        )?;

        activity_from_pages(&ascending, &latest, self.page_size)
    }
}

/// Builds activity from the ascending page and the single-entry descending
/// page. The count is the size of the ascending page, so it is only exact
/// when the page was not full.
fn activity_from_pages(
    ascending: &[ExplorerTx],
    latest: &[ExplorerTx],
    page_size: u32,
) -> Result<Activity> {
    let tx_count = ascending.len() as u64;
    let source = TxCountSource::ExplorerPage {
        page_size,
        capped: tx_count >= u64::from(page_size),
    };

    let first_tx = match ascending.first() {
        Some(tx) => Resolution::Known(parse_unix_seconds(&tx.time_stamp)?),
        None => Resolution::Absent,
    };
    let last_tx = match latest.first().or_else(|| ascending.last()) {
        Some(tx) => {
            tracing::debug!("latest transaction {}", tx.hash);
            Resolution::Known(parse_unix_seconds(&tx.time_stamp)?)
        }
        None => Resolution::Absent,
    };

    Ok(Activity {
        tx_count,
        source,
        first_tx,
        last_tx,
    })
}
