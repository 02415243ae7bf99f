//! Multicall3 batching with tagged per-call results.

use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;

use crate::bindings::Multicall3;
use crate::client::PrizeVault;
use crate::error::Result;

/// One call in a batch. Failures never revert the batch.
#[derive(Debug, Clone)]
pub struct CallRequest {
    /// Contract to call.
    pub target: Address,
    /// Selector plus ABI-encoded arguments.
    pub call_data: Bytes,
}

impl CallRequest {
    /// Create a request for `target` with encoded `call_data`.
    #[must_use]
    pub const fn new(target: Address, call_data: Bytes) -> Self {
        Self { target, call_data }
    }

    fn into_call3(self) -> Multicall3::Call3 {
        Multicall3::Call3 {
            target: self.target,
            allowFailure: true,
            callData: self.call_data,
        }
    }
}

/// Outcome of a single call in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResult {
    /// The call returned; payload is the ABI-encoded return data.
    Success(Bytes),
    /// The call reverted; payload is the revert data.
    Failure(Bytes),
}

impl CallResult {
    /// Return data of a successful call.
    #[must_use]
    pub fn success(&self) -> Option<&Bytes> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }
}

impl From<Multicall3::Result> for CallResult {
    fn from(result: Multicall3::Result) -> Self {
        if result.success {
            Self::Success(result.returnData)
        } else {
            Self::Failure(result.returnData)
        }
    }
}

impl<P: Provider> PrizeVault<P> {
    /// Run `requests` in one `aggregate3` call.
    ///
    /// Result `i` belongs to request `i`. An empty batch returns without
    /// touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Contract`] if the `aggregate3` call itself
    /// fails. Individual call failures are reported as
    /// [`CallResult::Failure`].
    pub async fn multicall(&self, requests: Vec<CallRequest>) -> Result<Vec<CallResult>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let count = requests.len();
        let calls = requests.into_iter().map(CallRequest::into_call3).collect();
        let results = Multicall3::new(self.deployment.multicall3, &self.provider)
            .aggregate3(calls)
            .call()
            .await?;

        let results: Vec<CallResult> = results.into_iter().map(CallResult::from).collect();
        let failed = results.iter().filter(|r| r.success().is_none()).count();
        tracing::debug!(calls = count, failed, "multicall executed");
        Ok(results)
    }
}
