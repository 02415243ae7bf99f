//! Incremental cache updates.
//!
//! Each updater resumes one block past the newest cached event (or at the
//! vault deployment block for an empty cache), formats the new logs and
//! returns the old snapshot with them appended. The input snapshot is never
//! modified, so a failed update leaves the caller's state as it was.

use alloy::primitives::Address;
use alloy::providers::Provider;

use crate::cache::EventCache;
use crate::client::PrizeVault;
use crate::error::Result;
use crate::events::TransferQuery;
use crate::format::{ClaimedPrizeEvent, FlashEvent, TransferEvent, format_all};

impl<P: Provider> PrizeVault<P> {
    /// Append `user`'s new vault share transfers to `old`.
    ///
    /// Outgoing and incoming transfers arrive as two result sets, so the
    /// new batch is ordered by block and log index before it is appended.
    /// The last cached event is then always the newest one.
    ///
    /// # Errors
    ///
    /// Propagates any fetch or formatting failure.
    pub async fn update_user_transfer_events(
        &self,
        user: Address,
        old: &EventCache<TransferEvent>,
    ) -> Result<EventCache<TransferEvent>> {
        let from_block = old.resume_block();
        let logs = self
            .get_transfer_events(
                user,
                self.deployment.prize_vault,
                TransferQuery::from_block(from_block),
            )
            .await?;
        let mut new: Vec<TransferEvent> = format_all(&logs)?;
        new.sort_by_key(|e| (e.position.block_number, e.position.log_index));

        tracing::debug!(%user, ?from_block, new = new.len(), "transfer events updated");
        Ok(old.clone().appended(new))
    }

    /// Append `user`'s new flash events from `swappers` to `old`.
    ///
    /// # Errors
    ///
    /// Propagates any fetch or formatting failure.
    pub async fn update_user_flash_events(
        &self,
        user: Address,
        swappers: &[Address],
        old: &EventCache<FlashEvent>,
    ) -> Result<EventCache<FlashEvent>> {
        let from_block = old.resume_block();
        let logs = self.get_flash_events(user, swappers, from_block).await?;
        let new: Vec<FlashEvent> = format_all(&logs)?;

        tracing::debug!(%user, ?from_block, new = new.len(), "flash events updated");
        Ok(old.clone().appended(new))
    }

    /// Append `user`'s new claimed prizes to `old`.
    ///
    /// # Errors
    ///
    /// Propagates any fetch or formatting failure.
    pub async fn update_user_claimed_prize_events(
        &self,
        user: Address,
        old: &EventCache<ClaimedPrizeEvent>,
    ) -> Result<EventCache<ClaimedPrizeEvent>> {
        let from_block = old.resume_block();
        let logs = self.get_claimed_prize_events(user, from_block).await?;
        let new: Vec<ClaimedPrizeEvent> = format_all(&logs)?;

        tracing::debug!(%user, ?from_block, new = new.len(), "claimed prize events updated");
        Ok(old.clone().appended(new))
    }
}

#[cfg(test)]
pub(crate) mod test_events {
    use alloy::primitives::{Address, B256, U256, Uint};

    use crate::bindings::ClaimedPrize;
    use crate::client::test_utils::{USER, VAULT};
    use crate::format::{ClaimedPrizeEvent, LogPosition, TransferEvent};

    pub(crate) fn position(block_number: u64) -> LogPosition {
        LogPosition {
            block_number,
            transaction_hash: B256::left_padding_from(&block_number.to_be_bytes()),
            log_index: 0,
        }
    }

    pub(crate) fn cached_transfer(block_number: u64) -> TransferEvent {
        TransferEvent {
            position: position(block_number),
            token: VAULT,
            from: Address::ZERO,
            to: USER,
            value: U256::from(block_number),
        }
    }

    pub(crate) fn prize(draw_id: u32) -> ClaimedPrize {
        ClaimedPrize {
            vault: VAULT,
            winner: USER,
            recipient: USER,
            drawId: Uint::from(draw_id),
            tier: 1,
            prizeIndex: 0,
            payout: Uint::from(100u64),
            claimReward: Uint::from(1u64),
            claimRewardRecipient: Address::ZERO,
        }
    }

    pub(crate) fn cached_prize(block_number: u64, draw_id: u32) -> ClaimedPrizeEvent {
        ClaimedPrizeEvent {
            position: position(block_number),
            vault: VAULT,
            winner: USER,
            recipient: USER,
            draw_id,
            tier: 1,
            prize_index: 0,
            payout: U256::from(100u64),
            claim_reward: U256::from(1u64),
            claim_reward_recipient: Address::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, U256, address};
    use serde_json::json;

    use super::test_events::{cached_prize, cached_transfer, prize};
    use super::*;
    use crate::bindings::{Flash, Transfer};
    use crate::client::test_utils::{CHAIN_ID, DEPLOYED_AT, POOL, USER, VAULT, mocked, push_chain_id};
    use crate::error::Error;
    use crate::events::test_logs::rpc_log;

    #[test]
    fn resume_point_is_one_past_the_last_cached_block() {
        let (client, _asserter) = mocked();
        let cache = EventCache::from(vec![cached_prize(1_500, 1), cached_prize(1_700, 2)]);

        let filter = client.claimed_prize_filter(USER, cache.resume_block());
        assert_eq!(filter.get_from_block(), Some(1_701), "B + 1");

        let filters = client.transfer_filters(
            USER,
            VAULT,
            TransferQuery::from_block(EventCache::<TransferEvent>::new().resume_block()),
        );
        assert!(
            filters.iter().all(|f| f.get_from_block() == Some(DEPLOYED_AT)),
            "empty cache starts at the deployment block"
        );

        let swapper = address!("0x00000000000000000000000000000000000005a0");
        let filter = client.flash_filter(USER, &[swapper], Some(1_701));
        assert_eq!(filter.get_from_block(), Some(1_701), "flash resume point");
    }

    #[tokio::test]
    async fn claimed_prizes_append_after_the_cached_prefix() {
        let (client, asserter) = mocked();
        push_chain_id(&asserter, CHAIN_ID);
        asserter.push_success(&json!([
            rpc_log(POOL, &prize(3), 1_800),
            rpc_log(POOL, &prize(4), 1_900),
        ]));

        let old = EventCache::from(vec![cached_prize(1_500, 1), cached_prize(1_700, 2)]);
        let next = client
            .update_user_claimed_prize_events(USER, &old)
            .await
            .unwrap();

        assert_eq!(next.len(), 4, "two cached plus two new");
        assert_eq!(&next.events()[..2], old.events(), "prefix unchanged");
        let draws: Vec<_> = next.events().iter().map(|e| e.draw_id).collect();
        assert_eq!(draws, [1, 2, 3, 4], "chronological order");
        assert_eq!(next.resume_block(), Some(1_901), "next resume point");
    }

    #[tokio::test]
    async fn transfers_from_an_empty_cache() {
        let (client, asserter) = mocked();
        let other = address!("0x00000000000000000000000000000000000000c0");
        push_chain_id(&asserter, CHAIN_ID);
        asserter.push_success(&json!([]));
        asserter.push_success(&json!([rpc_log(
            VAULT,
            &Transfer {
                from: other,
                to: USER,
                value: U256::from(7),
            },
            DEPLOYED_AT + 3
        )]));

        let next = client
            .update_user_transfer_events(USER, &EventCache::new())
            .await
            .unwrap();

        assert_eq!(next.len(), 1, "one incoming transfer");
        assert_eq!(next.events()[0].from, other, "sender");
        assert_eq!(next.events()[0].token, VAULT, "vault share token");
    }

    #[tokio::test]
    async fn newest_transfer_sets_the_resume_point() {
        let (client, asserter) = mocked();
        let other = address!("0x00000000000000000000000000000000000000c0");
        let sent = Transfer {
            from: USER,
            to: other,
            value: U256::from(1),
        };
        let received = Transfer {
            from: other,
            to: USER,
            value: U256::from(2),
        };
        push_chain_id(&asserter, CHAIN_ID);
        asserter.push_success(&json!([rpc_log(VAULT, &sent, 1_010)]));
        asserter.push_success(&json!([rpc_log(VAULT, &received, 1_005)]));

        let first = client
            .update_user_transfer_events(USER, &EventCache::new())
            .await
            .unwrap();

        let blocks: Vec<_> = first.events().iter().map(|e| e.position.block_number).collect();
        assert_eq!(blocks, [1_005, 1_010], "chronological order");
        assert_eq!(first.resume_block(), Some(1_011), "past the newest transfer");

        // The next round starts after block 1010, so nothing is refetched.
        push_chain_id(&asserter, CHAIN_ID);
        asserter.push_success(&json!([]));
        asserter.push_success(&json!([]));
        let second = client
            .update_user_transfer_events(USER, &first)
            .await
            .unwrap();
        assert_eq!(second, first, "no duplicates");
    }

    #[tokio::test]
    async fn self_transfers_are_kept_from_both_queries() {
        let (client, asserter) = mocked();
        let to_self = Transfer {
            from: USER,
            to: USER,
            value: U256::from(5),
        };
        push_chain_id(&asserter, CHAIN_ID);
        asserter.push_success(&json!([rpc_log(VAULT, &to_self, 1_050)]));
        asserter.push_success(&json!([rpc_log(VAULT, &to_self, 1_050)]));

        let next = client
            .update_user_transfer_events(USER, &EventCache::new())
            .await
            .unwrap();
        assert_eq!(next.len(), 2, "one per direction");
    }

    #[tokio::test]
    async fn flash_update_without_swappers_keeps_the_cache() {
        let (client, _asserter) = mocked();
        let old = EventCache::<crate::format::FlashEvent>::new();
        let next = client.update_user_flash_events(USER, &[], &old).await.unwrap();
        assert_eq!(next, old, "nothing fetched");
    }

    #[tokio::test]
    async fn flash_update_formats_swapper_logs() {
        let swapper = address!("0x00000000000000000000000000000000000005a0");
        let token = address!("0x0000000000000000000000000000000000000d00");
        let flash = Flash {
            beneficiary: USER,
            trader: Address::ZERO,
            quoteParams: Vec::new(),
            tokenToBeneficiary: token,
            amountsToBeneficiary: vec![U256::from(10)],
            excessToBeneficiary: U256::from(2),
        };

        let (client, asserter) = mocked();
        push_chain_id(&asserter, CHAIN_ID);
        asserter.push_success(&json!([rpc_log(swapper, &flash, 2_000)]));

        let next = client
            .update_user_flash_events(USER, &[swapper], &EventCache::new())
            .await
            .unwrap();

        assert_eq!(next.len(), 1, "one flash event");
        let event = &next.events()[0];
        assert_eq!(event.swapper, swapper, "emitting swapper");
        assert_eq!(event.token_to_beneficiary, token, "payout token");
        assert_eq!(event.excess_to_beneficiary, U256::from(2), "excess");
    }

    #[tokio::test]
    async fn failed_fetch_leaves_the_snapshot_untouched() {
        let (client, asserter) = mocked();
        push_chain_id(&asserter, CHAIN_ID);
        asserter.push_failure_msg("upstream unavailable");

        let old = EventCache::from(vec![cached_transfer(1_200)]);
        let before = old.clone();
        let err = client
            .update_user_transfer_events(USER, &old)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Rpc(_)), "unexpected error: {err}");
        assert_eq!(old, before, "snapshot unchanged");
    }
}
