use futures_util::stream::{FuturesUnordered, StreamExt};

use crate::{
    integrations::name_service::{NameServiceClient, NameSource},
    models::{Resolution, WalletAddress},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(String),
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupAttempt {
    pub source: NameSource,
    pub outcome: LookupOutcome,
}

/// Result of one identity race, with every attempt that settled before the
/// race ended, in settlement order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResolution {
    pub name: Resolution<String>,
    pub winner: Option<NameSource>,
    pub settled: Vec<LookupAttempt>,
}

pub struct IdentityResolver {
    client: NameServiceClient,
    sources: Vec<NameSource>,
}

impl IdentityResolver {
    pub fn new(client: NameServiceClient, sources: Vec<NameSource>) -> Self {
        Self { client, sources }
    }

    /// Runs every lookup concurrently. The first lookup to settle with a
    /// non-empty name wins and the rest are dropped. Settlement order, not
    /// position in `sources`, decides.
    pub async fn resolve(&self, address: &WalletAddress) -> IdentityResolution {
        let mut pending: FuturesUnordered<_> = self
            .sources
            .iter()
            .map(|&source| async move { (source, self.client.lookup(source, address).await) })
            .collect();

        let mut settled = Vec::with_capacity(self.sources.len());
        while let Some((source, result)) = pending.next().await {
            let outcome = match result {
                Ok(Some(name)) => LookupOutcome::Found(name),
                Ok(None) => LookupOutcome::Empty,
                Err(err) => {
                    tracing::debug!("{} name lookup for {} failed: {}", source, address, err);
                    LookupOutcome::Failed(err.to_string())
                }
            };
            settled.push(LookupAttempt { source, outcome });

            if let Some(LookupAttempt {
                outcome: LookupOutcome::Found(name),
                ..
            }) = settled.last()
            {
                tracing::debug!("{} resolved {} to {}", source, address, name);
                return IdentityResolution {
                    name: Resolution::Known(name.clone()),
                    winner: Some(source),
                    settled,
                };
            }
        }

        let any_answered = settled
            .iter()
            .any(|attempt| attempt.outcome == LookupOutcome::Empty);
        IdentityResolution {
            name: if any_answered {
                Resolution::Absent
            } else {
                Resolution::Undetermined
            },
            winner: None,
            settled,
        }
    }
}
