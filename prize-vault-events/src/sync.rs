//! RPC fallback and per-user cache sync orchestration.
//!
//! For each user the sync:
//! 1. Loads the existing snapshots (if any) into an [`EventStore`].
//! 2. Refreshes transfers, flash events (for every swapper the user has
//!    set) and claimed prizes, each from one block past its last event.
//! 3. Saves every refreshed cache atomically as soon as it succeeds.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result, anyhow};
use prize_vault::{Deployment, EventKind, EventStore, PrizeVault};

use crate::snapshot::{Snapshot, load_cache, user_dir};

/// Upper bound on a single attempt against one RPC endpoint.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Cache sizes after a successful sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Cached share transfers.
    pub transfers: usize,
    /// Cached flash events.
    pub flashes: usize,
    /// Cached claimed prizes.
    pub claimed_prizes: usize,
}

/// Bind a fresh HTTP provider for `rpc_url` to `deployment`.
///
/// # Errors
///
/// Returns an error if `rpc_url` is not a valid URL.
pub fn connect(deployment: &Deployment, rpc_url: &str) -> Result<PrizeVault<impl Provider>> {
    let provider = ProviderBuilder::new().connect_http(
        rpc_url
            .parse()
            .with_context(|| format!("invalid RPC URL: {rpc_url}"))?,
    );
    Ok(PrizeVault::new(provider, deployment.clone()))
}

/// Run `op` against each RPC in `rpcs` until one attempt succeeds.
///
/// Each attempt is bounded by a timeout. On failure the next endpoint is
/// tried.
///
/// # Errors
///
/// Returns the last error if *all* RPCs fail, or an error if `rpcs` is
/// empty.
pub async fn with_fallback<T, F, Fut>(rpcs: &[String], mut op: F) -> Result<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;

    for (i, rpc_url) in rpcs.iter().enumerate() {
        let attempt = tokio::time::timeout(ATTEMPT_TIMEOUT, op(rpc_url.clone()))
            .await
            .map_err(|_| anyhow!("timed out after {}s", ATTEMPT_TIMEOUT.as_secs()))
            .and_then(|r| r);

        match attempt {
            Ok(value) => return Ok(value),
            Err(e) => {
                if let Some(next) = rpcs.get(i + 1) {
                    tracing::warn!(rpc = %rpc_url, next = %next, error = %e, "RPC failed, falling back");
                } else {
                    tracing::error!(rpc = %rpc_url, error = %e, "last RPC failed");
                }
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("no RPC endpoint to try")))
}

/// Synchronize every cache of `user` with automatic RPC fallback.
///
/// Snapshots are written after each successful refresh, so a retry on the
/// next endpoint resumes where the failed attempt stopped.
///
/// # Errors
///
/// Returns an error only if *all* RPCs fail.
pub async fn sync_user(
    deployment: &Deployment,
    data_dir: &Path,
    rpcs: &[String],
    user: Address,
) -> Result<SyncSummary> {
    with_fallback(rpcs, |rpc_url| async move {
        try_sync(deployment, data_dir, &rpc_url, user).await
    })
    .await
}

/// Attempt a full sync using a single RPC endpoint.
async fn try_sync(
    deployment: &Deployment,
    data_dir: &Path,
    rpc_url: &str,
    user: Address,
) -> Result<SyncSummary> {
    let chain_id = deployment.chain_id;
    let dir = user_dir(data_dir, chain_id, user);

    tracing::info!(chain_id, rpc = rpc_url, %user, "connecting");
    let client = connect(deployment, rpc_url)?;

    let store = EventStore::new();
    store.seed_transfers(user, load_cache(&dir, EventKind::Transfers)?);
    store.seed_flashes(user, load_cache(&dir, EventKind::Flashes)?);
    store.seed_claimed_prizes(user, load_cache(&dir, EventKind::ClaimedPrizes)?);

    let transfers = store.refresh_transfers(&client, user).await?;
    Snapshot::now(transfers.clone()).save(&dir, EventKind::Transfers)?;
    tracing::info!(chain_id, %user, total = transfers.len(), "transfers updated");

    let swappers = client.swappers_for(user).await?;
    let flashes = store.refresh_flashes(&client, user, &swappers).await?;
    Snapshot::now(flashes.clone()).save(&dir, EventKind::Flashes)?;
    tracing::info!(chain_id, %user, swappers = swappers.len(), total = flashes.len(), "flash events updated");

    let claimed_prizes = store.refresh_claimed_prizes(&client, user).await?;
    Snapshot::now(claimed_prizes.clone()).save(&dir, EventKind::ClaimedPrizes)?;
    tracing::info!(chain_id, %user, total = claimed_prizes.len(), "claimed prizes updated");

    Ok(SyncSummary {
        transfers: transfers.len(),
        flashes: flashes.len(),
        claimed_prizes: claimed_prizes.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[tokio::test]
    async fn falls_back_to_the_next_rpc() {
        let rpcs = vec!["https://a.example".to_owned(), "https://b.example".to_owned()];
        let tried = RefCell::new(Vec::new());

        let value = with_fallback(&rpcs, |rpc| {
            tried.borrow_mut().push(rpc.clone());
            async move {
                if rpc.starts_with("https://a.") {
                    Err(anyhow!("boom"))
                } else {
                    Ok(7)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 7, "second endpoint answered");
        assert_eq!(tried.into_inner(), rpcs, "tried in order");
    }

    #[tokio::test]
    async fn all_failing_returns_the_last_error() {
        let rpcs = vec!["one".to_owned(), "two".to_owned()];
        let err = with_fallback(&rpcs, |rpc| async move { Err::<(), _>(anyhow!("{rpc} down")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "two down", "last error wins");
    }

    #[tokio::test]
    async fn no_rpcs_is_an_error() {
        let result = with_fallback(&[], |_| async { Ok::<_, anyhow::Error>(()) }).await;
        assert!(result.is_err(), "nothing to try");
    }

    #[test]
    fn invalid_url_is_rejected() {
        let deployment: Deployment = toml::from_str(
            r#"
chain_id = 1
prize_vault = "0x0000000000000000000000000000000000000001"
deployed_at_block = 1
prize_pool = "0x0000000000000000000000000000000000000002"
prize_hook = "0x0000000000000000000000000000000000000003"
twab_rewards = "0x0000000000000000000000000000000000000004"
"#,
        )
        .unwrap();
        assert!(connect(&deployment, "not a url").is_err(), "bad URL");
    }
}
