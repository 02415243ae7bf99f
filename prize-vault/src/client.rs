//! The [`PrizeVault`] client: a provider bound to one deployment.

use alloy::providers::Provider;

use crate::deployment::Deployment;
use crate::error::{Error, Result};

/// Read-only client for a prize vault deployment.
///
/// Fetchers, cache updaters and balance reads are implemented on this type
/// in their own modules.
#[derive(Debug, Clone)]
pub struct PrizeVault<P> {
    pub(crate) provider: P,
    pub(crate) deployment: Deployment,
}

impl<P: Provider> PrizeVault<P> {
    /// Bind `provider` to `deployment`.
    pub const fn new(provider: P, deployment: Deployment) -> Self {
        Self {
            provider,
            deployment,
        }
    }

    /// The underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The deployment this client reads from.
    pub const fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Check that the provider is connected to the deployment's chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NetworkMismatch`] when the chain IDs differ, or
    /// [`Error::Rpc`] if the chain ID cannot be read.
    pub async fn validate_network(&self) -> Result<()> {
        let actual = self.provider.get_chain_id().await?;
        let expected = self.deployment.chain_id;
        if actual != expected {
            tracing::warn!(expected, actual, "provider is on the wrong chain");
            return Err(Error::NetworkMismatch { expected, actual });
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_utils::{CHAIN_ID, mocked, push_chain_id};
    use super::*;

    #[tokio::test]
    async fn accepts_matching_chain() {
        let (client, asserter) = mocked();
        push_chain_id(&asserter, CHAIN_ID);
        client.validate_network().await.unwrap();
    }

    #[tokio::test]
    async fn rejects_other_chain() {
        let (client, asserter) = mocked();
        push_chain_id(&asserter, 1);
        let err = client.validate_network().await.unwrap_err();
        assert!(
            matches!(
                err,
                Error::NetworkMismatch {
                    expected: CHAIN_ID,
                    actual: 1
                }
            ),
            "unexpected error: {err}"
        );
    }
}
