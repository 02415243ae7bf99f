//! Solidity bindings for the events and calls this crate reads.

#![allow(missing_docs, reason = "generated by the sol! macro")]

use alloy::sol;

sol! {
    /// ERC-20 `Transfer`, emitted by the prize vault share token.
    #[derive(Debug, PartialEq, Eq)]
    event Transfer(address indexed from, address indexed to, uint256 value);

    #[derive(Debug, PartialEq, Eq)]
    struct QuotePair {
        address base;
        address quote;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct QuoteParams {
        QuotePair quotePair;
        uint128 baseAmount;
        bytes data;
    }

    /// Emitted by a swapper when a flash swap pays out to a beneficiary.
    #[derive(Debug, PartialEq, Eq)]
    event Flash(
        address indexed beneficiary,
        address indexed trader,
        QuoteParams[] quoteParams,
        address tokenToBeneficiary,
        uint256[] amountsToBeneficiary,
        uint256 excessToBeneficiary
    );

    /// Emitted by the prize hook when an account changes its swapper.
    #[derive(Debug, PartialEq, Eq)]
    event SetSwapper(
        address indexed account,
        address indexed newSwapper,
        address indexed previousSwapper
    );

    #[derive(Debug, PartialEq, Eq)]
    event PromotionCreated(
        uint256 indexed promotionId,
        address indexed vault,
        address indexed token,
        uint64 startTimestamp,
        uint256 tokensPerEpoch,
        uint48 epochDuration,
        uint8 initialNumberOfEpochs
    );

    #[derive(Debug, PartialEq, Eq)]
    event RewardsClaimed(
        uint256 indexed promotionId,
        uint8[] epochIds,
        address indexed user,
        uint256 amount
    );

    /// Emitted by the prize pool for every claimed prize.
    #[derive(Debug, PartialEq, Eq)]
    event ClaimedPrize(
        address indexed vault,
        address indexed winner,
        address indexed recipient,
        uint24 drawId,
        uint8 tier,
        uint32 prizeIndex,
        uint152 payout,
        uint96 claimReward,
        address claimRewardRecipient
    );

    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
    }

    /// Multicall3, see <https://www.multicall3.com/>.
    #[sol(rpc)]
    contract Multicall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls) public payable returns (Result[] memory returnData);
    }
}
