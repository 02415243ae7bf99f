//! Event log fetchers.
//!
//! Every fetcher:
//! 1. Checks the provider is on the deployment's chain.
//! 2. Builds an `eth_getLogs` filter for one event signature, with indexed
//!    argument constraints, starting at the requested block (or the vault
//!    deployment block) and open-ended at `latest`.
//! 3. Decodes every returned log strictly: a log that does not match the
//!    event shape fails the whole fetch instead of being skipped.

use alloy::primitives::Address;
use alloy::providers::Provider;
use alloy::rpc::types::{BlockNumberOrTag, Filter, Log};
use alloy::sol_types::SolEvent;

use crate::bindings::{ClaimedPrize, Flash, PromotionCreated, RewardsClaimed, SetSwapper, Transfer};
use crate::client::PrizeVault;
use crate::error::Result;

/// Which side of a transfer the subject address must be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Only transfers sent by the subject.
    From,
    /// Only transfers received by the subject.
    To,
}

/// Options for [`PrizeVault::get_transfer_events`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferQuery {
    /// Restrict to one direction; both when `None`.
    pub direction: Option<Direction>,
    /// First block to search; the vault deployment block when `None`.
    pub from_block: Option<u64>,
}

impl TransferQuery {
    /// Both directions, starting at `from_block`.
    #[must_use]
    pub const fn from_block(from_block: Option<u64>) -> Self {
        Self {
            direction: None,
            from_block,
        }
    }
}

impl<P: Provider> PrizeVault<P> {
    /// Base filter: `[from_block or deployment block, latest]`.
    fn log_filter(&self, from_block: Option<u64>) -> Filter {
        Filter::new()
            .from_block(self.deployment.from_block(from_block))
            .to_block(BlockNumberOrTag::Latest)
    }

    /// Run one `eth_getLogs` query and decode every result as `E`.
    async fn query<E: SolEvent>(&self, filter: &Filter) -> Result<Vec<Log<E>>> {
        let logs = self.provider.get_logs(filter).await?;
        tracing::debug!(
            event = E::SIGNATURE,
            from_block = ?filter.get_from_block(),
            count = logs.len(),
            "fetched logs"
        );
        logs.iter()
            .map(|log| log.log_decode::<E>().map_err(Into::into))
            .collect()
    }

    /// Filters for [`Self::get_transfer_events`], outgoing before incoming.
    pub(crate) fn transfer_filters(
        &self,
        address: Address,
        token: Address,
        query: TransferQuery,
    ) -> Vec<Filter> {
        let base = self
            .log_filter(query.from_block)
            .address(token)
            .event_signature(Transfer::SIGNATURE_HASH);

        let mut filters = Vec::with_capacity(2);
        if query.direction != Some(Direction::To) {
            filters.push(base.clone().topic1(address.into_word()));
        }
        if query.direction != Some(Direction::From) {
            filters.push(base.topic2(address.into_word()));
        }
        filters
    }

    /// `Transfer` events of `token` sent or received by `address`.
    ///
    /// Outgoing transfers come first, then incoming ones. The two result
    /// sets are concatenated as is, so a self-transfer shows up in both.
    ///
    /// # Errors
    ///
    /// Fails on a network mismatch, an RPC error or a log that does not
    /// decode as `Transfer`.
    pub async fn get_transfer_events(
        &self,
        address: Address,
        token: Address,
        query: TransferQuery,
    ) -> Result<Vec<Log<Transfer>>> {
        self.validate_network().await?;

        let mut events = Vec::new();
        for filter in self.transfer_filters(address, token, query) {
            events.extend(self.query::<Transfer>(&filter).await?);
        }
        Ok(events)
    }

    pub(crate) fn flash_filter(
        &self,
        beneficiary: Address,
        swappers: &[Address],
        from_block: Option<u64>,
    ) -> Filter {
        self.log_filter(from_block)
            .address(swappers.to_vec())
            .event_signature(Flash::SIGNATURE_HASH)
            .topic1(beneficiary.into_word())
    }

    /// `Flash` events paying out to `beneficiary` from any of `swappers`.
    ///
    /// Returns an empty list without touching the network when `swappers`
    /// is empty.
    ///
    /// # Errors
    ///
    /// Fails on a network mismatch, an RPC error or a log that does not
    /// decode as `Flash`.
    pub async fn get_flash_events(
        &self,
        beneficiary: Address,
        swappers: &[Address],
        from_block: Option<u64>,
    ) -> Result<Vec<Log<Flash>>> {
        if swappers.is_empty() {
            return Ok(Vec::new());
        }
        self.validate_network().await?;
        self.query(&self.flash_filter(beneficiary, swappers, from_block))
            .await
    }

    pub(crate) fn set_swapper_filter(&self, account: Address) -> Filter {
        self.log_filter(None)
            .address(self.deployment.prize_hook)
            .event_signature(SetSwapper::SIGNATURE_HASH)
            .topic1(account.into_word())
    }

    /// `SetSwapper` events on the prize hook for `account`, from the vault
    /// deployment block.
    ///
    /// # Errors
    ///
    /// Fails on a network mismatch, an RPC error or a log that does not
    /// decode as `SetSwapper`.
    pub async fn get_set_swapper_events(&self, account: Address) -> Result<Vec<Log<SetSwapper>>> {
        self.validate_network().await?;
        self.query(&self.set_swapper_filter(account)).await
    }

    /// Every swapper `account` has switched to, in first-seen order.
    ///
    /// The zero address (swapper removed) is left out.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_set_swapper_events`].
    pub async fn swappers_for(&self, account: Address) -> Result<Vec<Address>> {
        let mut swappers: Vec<Address> = Vec::new();
        for log in self.get_set_swapper_events(account).await? {
            let swapper = log.inner.data.newSwapper;
            if !swapper.is_zero() && !swappers.contains(&swapper) {
                swappers.push(swapper);
            }
        }
        Ok(swappers)
    }

    pub(crate) fn promotion_created_filter(&self) -> Filter {
        let filter = self
            .log_filter(None)
            .address(self.deployment.twab_rewards)
            .event_signature(PromotionCreated::SIGNATURE_HASH)
            .topic2(self.deployment.prize_vault.into_word());

        let tokens = &self.deployment.reward_tokens;
        if tokens.is_empty() {
            return filter;
        }
        filter.topic3(tokens.iter().map(|t| t.into_word()).collect::<Vec<_>>())
    }

    /// `PromotionCreated` events for the vault, restricted to the
    /// deployment's reward tokens when any are configured.
    ///
    /// # Errors
    ///
    /// Fails on a network mismatch, an RPC error or a log that does not
    /// decode as `PromotionCreated`.
    pub async fn get_promotion_created_events(&self) -> Result<Vec<Log<PromotionCreated>>> {
        self.validate_network().await?;
        self.query(&self.promotion_created_filter()).await
    }

    /// `promotionId` is topic1, so the user sits in topic2.
    pub(crate) fn rewards_claimed_filter(&self, user: Address) -> Filter {
        self.log_filter(None)
            .address(self.deployment.twab_rewards)
            .event_signature(RewardsClaimed::SIGNATURE_HASH)
            .topic2(user.into_word())
    }

    /// `RewardsClaimed` events for `user` on the TWAB rewards contract.
    ///
    /// # Errors
    ///
    /// Fails on a network mismatch, an RPC error or a log that does not
    /// decode as `RewardsClaimed`.
    pub async fn get_rewards_claimed_events(
        &self,
        user: Address,
    ) -> Result<Vec<Log<RewardsClaimed>>> {
        self.validate_network().await?;
        self.query(&self.rewards_claimed_filter(user)).await
    }

    pub(crate) fn claimed_prize_filter(&self, user: Address, from_block: Option<u64>) -> Filter {
        self.log_filter(from_block)
            .address(self.deployment.prize_pool)
            .event_signature(ClaimedPrize::SIGNATURE_HASH)
            .topic1(self.deployment.prize_vault.into_word())
            .topic2(user.into_word())
            .topic3(user.into_word())
    }

    /// `ClaimedPrize` events on the prize pool for prizes the vault won for
    /// `user` and paid to `user`.
    ///
    /// # Errors
    ///
    /// Fails on a network mismatch, an RPC error or a log that does not
    /// decode as `ClaimedPrize`.
    pub async fn get_claimed_prize_events(
        &self,
        user: Address,
        from_block: Option<u64>,
    ) -> Result<Vec<Log<ClaimedPrize>>> {
        self.validate_network().await?;
        self.query(&self.claimed_prize_filter(user, from_block))
            .await
    }
}

#[cfg(test)]
pub(crate) mod test_logs {
    use alloy::primitives::{Address, B256, LogData};
    use alloy::rpc::types::Log;
    use alloy::sol_types::SolEvent;

    /// An RPC log for `event` emitted by `address` at `block_number`.
    pub(crate) fn rpc_log<E: SolEvent>(address: Address, event: &E, block_number: u64) -> Log {
        raw_log(address, event.encode_log_data(), block_number)
    }

    pub(crate) fn raw_log(address: Address, data: LogData, block_number: u64) -> Log {
        Log {
            inner: alloy::primitives::Log { address, data },
            block_hash: Some(B256::with_last_byte(0xbb)),
            block_number: Some(block_number),
            block_timestamp: None,
            transaction_hash: Some(B256::left_padding_from(&block_number.to_be_bytes())),
            transaction_index: Some(0),
            log_index: Some(0),
            removed: false,
        }
    }
}
