//! Token balance aggregation.

use std::collections::{BTreeMap, BTreeSet};

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy::sol_types::SolCall;

use crate::bindings::IERC20;
use crate::client::PrizeVault;
use crate::deployment::NATIVE_TOKEN;
use crate::error::Result;
use crate::multicall::{CallRequest, CallResult};

/// Balance per token address. The native asset is keyed by [`NATIVE_TOKEN`].
pub type TokenBalances = BTreeMap<Address, U256>;

/// `balanceOf(owner)` decoded from a call result, if it succeeded.
fn decode_balance(result: &CallResult) -> Option<U256> {
    let data = result.success()?;
    IERC20::balanceOfCall::abi_decode_returns(data).ok()
}

/// One `balanceOf(owner)` request per non-native entry of `tokens`,
/// duplicates included, in request order.
fn balance_requests(owner: Address, tokens: &[Address]) -> Vec<CallRequest> {
    let call_data = Bytes::from(IERC20::balanceOfCall { owner }.abi_encode());
    tokens
        .iter()
        .filter(|token| **token != NATIVE_TOKEN)
        .map(|token| CallRequest::new(*token, call_data.clone()))
        .collect()
}

impl<P: Provider> PrizeVault<P> {
    /// Balances of `owner` for every token in `tokens`.
    ///
    /// Token balances are read in one multicall; a token appears in the
    /// result only if its call succeeded and returned a `uint256`. Repeated
    /// tokens take the result of their first request. [`NATIVE_TOKEN`] is
    /// never part of the multicall batch: when requested, the native
    /// balance is read separately with `eth_getBalance`.
    ///
    /// # Errors
    ///
    /// Returns an error if the multicall or the native balance request
    /// fails as a whole. Individual token failures are dropped.
    pub async fn get_token_balances(
        &self,
        owner: Address,
        tokens: &[Address],
    ) -> Result<TokenBalances> {
        let requests = balance_requests(owner, tokens);
        let results = self.multicall(requests.clone()).await?;

        let mut balances = TokenBalances::new();
        let mut seen = BTreeSet::new();
        for (request, result) in requests.iter().zip(&results) {
            if !seen.insert(request.target) {
                continue;
            }
            match decode_balance(result) {
                Some(balance) => {
                    balances.insert(request.target, balance);
                }
                None => tracing::debug!(token = %request.target, "balance unavailable"),
            }
        }

        if tokens.contains(&NATIVE_TOKEN) {
            let native = self.provider.get_balance(owner).await?;
            balances.insert(NATIVE_TOKEN, native);
        }

        Ok(balances)
    }
}
