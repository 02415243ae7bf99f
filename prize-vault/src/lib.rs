//! Read-only event and balance client for prize vault deployments.
//!
//! The crate queries an Ethereum-compatible JSON-RPC endpoint for the event
//! logs a prize vault front end displays (share transfers, flash swaps,
//! swapper changes, reward promotions and claims, claimed prizes), keeps
//! append-only per-user caches of them up to date, and reads token balances
//! through Multicall3.
//!
//! ```no_run
//! use alloy::providers::ProviderBuilder;
//! use prize_vault::{EventStore, PrizeVault};
//! # async fn run(deployment: prize_vault::Deployment) -> prize_vault::Result<()> {
//! let provider = ProviderBuilder::new().connect_http("https://mainnet.base.org".parse().unwrap());
//! let client = PrizeVault::new(provider, deployment);
//! let store = EventStore::new();
//!
//! let user = alloy::primitives::Address::ZERO;
//! let transfers = store.refresh_transfers(&client, user).await?;
//! println!("{} transfers", transfers.len());
//! # Ok(())
//! # }
//! ```

pub mod balances;
pub mod bindings;
pub mod cache;
pub mod client;
pub mod deployment;
pub mod error;
pub mod events;
pub mod format;
pub mod multicall;
pub mod store;
pub mod updates;

pub use balances::TokenBalances;
pub use cache::EventCache;
pub use client::PrizeVault;
pub use deployment::{Deployment, MULTICALL3, NATIVE_TOKEN};
pub use error::{Error, Result};
pub use events::{Direction, TransferQuery};
pub use format::{
    BlockStamped, ClaimedPrizeEvent, FlashEvent, FlashQuote, LogPosition, Promotion,
    RewardsClaim, SwapperChange, TransferEvent,
};
pub use multicall::{CallRequest, CallResult};
pub use store::{EventKind, EventStore};
