//! Error type shared by every operation in this crate.

use alloy::primitives::Address;
use alloy::transports::TransportError;

use crate::store::EventKind;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by fetchers, updaters and balance reads.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The provider is connected to a different chain than the deployment.
    #[error("connected to chain {actual}, expected chain {expected}")]
    NetworkMismatch {
        /// Chain ID of the configured deployment.
        expected: u64,
        /// Chain ID reported by the provider.
        actual: u64,
    },

    /// A JSON-RPC request failed.
    #[error("rpc request failed: {0}")]
    Rpc(#[from] TransportError),

    /// A contract call through the generated bindings failed.
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    /// A log did not decode against the expected event signature.
    #[error("log decoding failed: {0}")]
    Decode(#[from] alloy::sol_types::Error),

    /// A log is missing a field required to place it in a cache.
    #[error("log is missing its {0}")]
    IncompleteLog(&'static str),

    /// Another refresh of the same cache is still running.
    #[error("{kind} update for {user} is already in flight")]
    UpdateInFlight {
        /// Owner of the cache.
        user: Address,
        /// Which cache lineage.
        kind: EventKind,
    },
}
