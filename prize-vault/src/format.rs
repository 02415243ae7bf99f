//! Display-ready projections of decoded event logs.
//!
//! Every formatted event keeps the position of its log on chain (block,
//! transaction, log index) so caches can resume after the last block they
//! hold. Conversion fails when the node returned a log without a position,
//! which only happens for pending logs.

use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::Log;
use serde::{Deserialize, Serialize};

use crate::bindings::{ClaimedPrize, Flash, PromotionCreated, RewardsClaimed, SetSwapper, Transfer};
use crate::error::{Error, Result};

/// Anything that sits at a known block.
pub trait BlockStamped {
    /// Block the underlying log was emitted in.
    fn block_number(&self) -> u64;
}

/// Where a log sits on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPosition {
    /// Block number.
    pub block_number: u64,
    /// Hash of the emitting transaction.
    pub transaction_hash: B256,
    /// Index of the log within its block.
    pub log_index: u64,
}

impl LogPosition {
    /// Read the position of `log`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteLog`] if any positional field is missing.
    pub fn of<T>(log: &Log<T>) -> Result<Self> {
        Ok(Self {
            block_number: log.block_number.ok_or(Error::IncompleteLog("block number"))?,
            transaction_hash: log
                .transaction_hash
                .ok_or(Error::IncompleteLog("transaction hash"))?,
            log_index: log.log_index.ok_or(Error::IncompleteLog("log index"))?,
        })
    }
}

macro_rules! block_stamped {
    ($($ty:ty),+ $(,)?) => {
        $(impl BlockStamped for $ty {
            fn block_number(&self) -> u64 {
                self.position.block_number
            }
        })+
    };
}

/// A share token transfer into or out of a user's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    /// Position on chain.
    #[serde(flatten)]
    pub position: LogPosition,
    /// Token contract that emitted the transfer.
    pub token: Address,
    /// Sender.
    pub from: Address,
    /// Recipient.
    pub to: Address,
    /// Amount in token base units.
    pub value: U256,
}

impl TryFrom<&Log<Transfer>> for TransferEvent {
    type Error = Error;

    fn try_from(log: &Log<Transfer>) -> Result<Self> {
        let event = &log.inner.data;
        Ok(Self {
            position: LogPosition::of(log)?,
            token: log.inner.address,
            from: event.from,
            to: event.to,
            value: event.value,
        })
    }
}

/// One leg of a flash swap quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashQuote {
    /// Token sold.
    pub base: Address,
    /// Token received.
    pub quote: Address,
    /// Amount of `base` sold.
    pub base_amount: U256,
}

/// A flash swap executed on behalf of a beneficiary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashEvent {
    /// Position on chain.
    #[serde(flatten)]
    pub position: LogPosition,
    /// Swapper contract that emitted the event.
    pub swapper: Address,
    /// Account that received the proceeds.
    pub beneficiary: Address,
    /// Account that executed the swap.
    pub trader: Address,
    /// Quoted legs.
    pub quotes: Vec<FlashQuote>,
    /// Token paid out to the beneficiary.
    pub token_to_beneficiary: Address,
    /// Amounts paid out per leg.
    pub amounts_to_beneficiary: Vec<U256>,
    /// Surplus paid out on top of the quoted amounts.
    pub excess_to_beneficiary: U256,
}

impl TryFrom<&Log<Flash>> for FlashEvent {
    type Error = Error;

    fn try_from(log: &Log<Flash>) -> Result<Self> {
        let event = &log.inner.data;
        Ok(Self {
            position: LogPosition::of(log)?,
            swapper: log.inner.address,
            beneficiary: event.beneficiary,
            trader: event.trader,
            quotes: event
                .quoteParams
                .iter()
                .map(|q| FlashQuote {
                    base: q.quotePair.base,
                    quote: q.quotePair.quote,
                    base_amount: U256::from(q.baseAmount),
                })
                .collect(),
            token_to_beneficiary: event.tokenToBeneficiary,
            amounts_to_beneficiary: event.amountsToBeneficiary.clone(),
            excess_to_beneficiary: event.excessToBeneficiary,
        })
    }
}

/// A prize won by (and paid to) a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedPrizeEvent {
    /// Position on chain.
    #[serde(flatten)]
    pub position: LogPosition,
    /// Vault the prize was won through.
    pub vault: Address,
    /// Winning account.
    pub winner: Address,
    /// Account the payout was sent to.
    pub recipient: Address,
    /// Draw the prize belongs to.
    pub draw_id: u32,
    /// Prize tier (0 is the grand prize).
    pub tier: u8,
    /// Index of the prize within its tier.
    pub prize_index: u32,
    /// Payout in prize token base units.
    pub payout: U256,
    /// Fee paid to the claimer.
    pub claim_reward: U256,
    /// Account that received the claim fee.
    pub claim_reward_recipient: Address,
}

impl TryFrom<&Log<ClaimedPrize>> for ClaimedPrizeEvent {
    type Error = Error;

    fn try_from(log: &Log<ClaimedPrize>) -> Result<Self> {
        let event = &log.inner.data;
        Ok(Self {
            position: LogPosition::of(log)?,
            vault: event.vault,
            winner: event.winner,
            recipient: event.recipient,
            draw_id: event.drawId.to::<u32>(),
            tier: event.tier,
            prize_index: event.prizeIndex,
            payout: U256::from(event.payout),
            claim_reward: U256::from(event.claimReward),
            claim_reward_recipient: event.claimRewardRecipient,
        })
    }
}

/// An account switching to a different swapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapperChange {
    /// Position on chain.
    #[serde(flatten)]
    pub position: LogPosition,
    /// Account whose swapper changed.
    pub account: Address,
    /// Swapper now in use.
    pub new_swapper: Address,
    /// Swapper replaced.
    pub previous_swapper: Address,
}

impl TryFrom<&Log<SetSwapper>> for SwapperChange {
    type Error = Error;

    fn try_from(log: &Log<SetSwapper>) -> Result<Self> {
        let event = &log.inner.data;
        Ok(Self {
            position: LogPosition::of(log)?,
            account: event.account,
            new_swapper: event.newSwapper,
            previous_swapper: event.previousSwapper,
        })
    }
}

/// A rewards promotion on the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// Position on chain.
    #[serde(flatten)]
    pub position: LogPosition,
    /// Promotion ID on the rewards contract.
    pub promotion_id: U256,
    /// Vault whose depositors earn the rewards.
    pub vault: Address,
    /// Reward token.
    pub token: Address,
    /// Unix timestamp the first epoch starts at.
    pub start_timestamp: u64,
    /// Reward tokens distributed per epoch.
    pub tokens_per_epoch: U256,
    /// Epoch length in seconds.
    pub epoch_duration: u64,
    /// Number of epochs at creation time.
    pub initial_number_of_epochs: u8,
}

impl TryFrom<&Log<PromotionCreated>> for Promotion {
    type Error = Error;

    fn try_from(log: &Log<PromotionCreated>) -> Result<Self> {
        let event = &log.inner.data;
        Ok(Self {
            position: LogPosition::of(log)?,
            promotion_id: event.promotionId,
            vault: event.vault,
            token: event.token,
            start_timestamp: event.startTimestamp,
            tokens_per_epoch: event.tokensPerEpoch,
            epoch_duration: event.epochDuration.to::<u64>(),
            initial_number_of_epochs: event.initialNumberOfEpochs,
        })
    }
}

/// Rewards claimed by a user from one promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsClaim {
    /// Position on chain.
    #[serde(flatten)]
    pub position: LogPosition,
    /// Promotion claimed from.
    pub promotion_id: U256,
    /// Epochs claimed.
    pub epoch_ids: Vec<u8>,
    /// Claiming account.
    pub user: Address,
    /// Amount claimed.
    pub amount: U256,
}

impl TryFrom<&Log<RewardsClaimed>> for RewardsClaim {
    type Error = Error;

    fn try_from(log: &Log<RewardsClaimed>) -> Result<Self> {
        let event = &log.inner.data;
        Ok(Self {
            position: LogPosition::of(log)?,
            promotion_id: event.promotionId,
            epoch_ids: event.epochIds.clone(),
            user: event.user,
            amount: event.amount,
        })
    }
}

block_stamped!(
    TransferEvent,
    FlashEvent,
    ClaimedPrizeEvent,
    SwapperChange,
    Promotion,
    RewardsClaim,
);

/// Format every log, failing on the first incomplete one.
///
/// # Errors
///
/// Returns [`Error::IncompleteLog`] for a log without a block position.
pub fn format_all<'a, E, T>(logs: &'a [Log<E>]) -> Result<Vec<T>>
where
    E: 'a,
    T: TryFrom<&'a Log<E>, Error = Error>,
{
    logs.iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Uint, address, b256};

    use super::*;

    fn wrap<T>(address: Address, data: T, block_number: Option<u64>) -> Log<T> {
        Log {
            inner: alloy::primitives::Log { address, data },
            block_hash: None,
            block_number,
            block_timestamp: None,
            transaction_hash: Some(b256!(
                "0x1111111111111111111111111111111111111111111111111111111111111111"
            )),
            transaction_index: Some(0),
            log_index: Some(3),
            removed: false,
        }
    }

    #[test]
    fn transfer_keeps_token_and_position() {
        let token = address!("0x00000000000000000000000000000000000000aa");
        let event = Transfer {
            from: address!("0x0000000000000000000000000000000000000001"),
            to: address!("0x0000000000000000000000000000000000000002"),
            value: U256::from(500),
        };
        let formatted = TransferEvent::try_from(&wrap(token, event, Some(77))).unwrap();

        assert_eq!(formatted.token, token, "token is the emitting contract");
        assert_eq!(formatted.block_number(), 77, "block number");
        assert_eq!(formatted.position.log_index, 3, "log index");
        assert_eq!(formatted.value, U256::from(500), "value");
    }

    #[test]
    fn claimed_prize_widens_narrow_integers() {
        let user = address!("0x0000000000000000000000000000000000000009");
        let event = ClaimedPrize {
            vault: address!("0x0000000000000000000000000000000000000001"),
            winner: user,
            recipient: user,
            drawId: Uint::from(12u32),
            tier: 2,
            prizeIndex: 5,
            payout: Uint::from(1_000_000u64),
            claimReward: Uint::from(10u64),
            claimRewardRecipient: Address::ZERO,
        };
        let formatted = ClaimedPrizeEvent::try_from(&wrap(Address::ZERO, event, Some(1))).unwrap();

        assert_eq!(formatted.draw_id, 12, "draw id");
        assert_eq!(formatted.payout, U256::from(1_000_000u64), "payout");
        assert_eq!(formatted.claim_reward, U256::from(10u64), "claim reward");
    }

    #[test]
    fn pending_log_is_rejected() {
        let event = Transfer {
            from: Address::ZERO,
            to: Address::ZERO,
            value: U256::ZERO,
        };
        let err = TransferEvent::try_from(&wrap(Address::ZERO, event, None)).unwrap_err();
        assert!(
            matches!(err, Error::IncompleteLog("block number")),
            "unexpected error: {err}"
        );
    }
}
