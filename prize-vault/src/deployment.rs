//! Deployment definitions: the set of contracts a client reads from.
//!
//! A prize vault deployment is a handful of contracts on a single chain.
//! Every fetcher in this crate targets one of them, and every fetch that
//! is not resumed from a cache starts at the vault's deployment block.

use alloy::primitives::{Address, address};
use serde::{Deserialize, Serialize};

/// Sentinel address standing in for the chain's native asset in balance
/// requests.
pub const NATIVE_TOKEN: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Canonical Multicall3 address (same on every chain it is deployed to).
pub const MULTICALL3: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

const fn default_multicall3() -> Address {
    MULTICALL3
}

/// Contract addresses and chain metadata for one prize vault deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// EIP-155 chain ID the contracts live on.
    pub chain_id: u64,
    /// The prize vault (its share token emits `Transfer`).
    pub prize_vault: Address,
    /// Block at which the prize vault was deployed.
    pub deployed_at_block: u64,
    /// The prize pool (emits `ClaimedPrize`).
    pub prize_pool: Address,
    /// The prize hook (emits `SetSwapper`).
    pub prize_hook: Address,
    /// The TWAB rewards contract (emits `PromotionCreated` / `RewardsClaimed`).
    pub twab_rewards: Address,
    /// Reward tokens whose promotions are of interest.
    #[serde(default)]
    pub reward_tokens: Vec<Address>,
    /// Multicall3 contract used for batched reads.
    #[serde(default = "default_multicall3")]
    pub multicall3: Address,
}

impl Deployment {
    /// Resolve an optional resume point to a concrete `fromBlock`.
    #[must_use]
    pub fn from_block(&self, resume: Option<u64>) -> u64 {
        resume.unwrap_or(self.deployed_at_block)
    }
}
