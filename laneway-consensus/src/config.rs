//! Configuration for the lane and auction rules.
//!
//! Every validator must run with the same consensus configuration.
//! Validators with different lanes, free message types, or auction parameters
//! build blocks that other validators reject.

use serde::{Deserialize, Serialize};

use laneway_chain::amount::{Amount, NonNegative};

use crate::lane::LaneKind;

/// Lane and auction rules shared by block building and block verification.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The denomination fees and bids are paid in.
    ///
    /// Fees in other denominations count as zero for transaction priority.
    pub fee_denom: String,

    /// The lanes, in block order.
    ///
    /// The first lane that matches a transaction holds it.
    /// The default lane matches every transaction, so it must be last.
    pub lanes: Vec<LaneConfig>,

    /// Message types that can use the free lane.
    ///
    /// A transaction is free if all of its messages have one of these types.
    pub free_message_types: Vec<String>,

    /// Top-of-block auction parameters.
    pub auction: AuctionParams,

    /// The maximum size of a block.
    pub block: BlockBudget,
}

/// A lane and its share of block space.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LaneConfig {
    /// The kind of transactions the lane holds.
    pub kind: LaneKind,

    /// The maximum percentage of the block's bytes this lane can use.
    ///
    /// Zero means the lane can use whatever space the lanes before it left.
    #[serde(default)]
    pub max_block_space_percent: u8,
}

/// Top-of-block auction parameters.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct AuctionParams {
    /// The maximum number of transactions in a bid's bundle.
    pub max_bundle_size: usize,

    /// The minimum bid amount.
    pub reserve_fee: Amount<NonNegative>,

    /// How much a new bid must exceed the current top bid to replace it.
    pub min_bid_increment: Amount<NonNegative>,

    /// Reject bundles where the bidder's transactions don't come first.
    ///
    /// With protection enabled, a bundle is the bidder's transactions, followed
    /// by transactions from at most one other set of signers.
    pub front_running_protection: bool,
}

/// Block size limits, applied to the transactions in a block.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct BlockBudget {
    /// The maximum total size of the block's encoded transactions.
    pub max_bytes: u64,

    /// The maximum number of transactions in a block.
    pub max_txs: u32,

    /// The maximum total gas limit of the block's transactions, if any.
    pub max_gas: Option<u64>,
}

/// The message types relayers use to deliver inter-chain packets.
pub const DEFAULT_FREE_MESSAGE_TYPES: &[&str] = &[
    "/ibc.core.client.v1.MsgUpdateClient",
    "/ibc.core.channel.v1.MsgRecvPacket",
    "/ibc.core.channel.v1.MsgAcknowledgement",
    "/ibc.core.channel.v1.MsgTimeout",
];

impl Default for Config {
    fn default() -> Self {
        Self {
            fee_denom: "ulane".to_string(),
            lanes: vec![
                LaneConfig {
                    kind: LaneKind::Mev,
                    max_block_space_percent: 0,
                },
                LaneConfig {
                    kind: LaneKind::Free,
                    max_block_space_percent: 0,
                },
                LaneConfig {
                    kind: LaneKind::Default,
                    max_block_space_percent: 0,
                },
            ],
            free_message_types: DEFAULT_FREE_MESSAGE_TYPES
                .iter()
                .map(ToString::to_string)
                .collect(),
            auction: AuctionParams::default(),
            block: BlockBudget::default(),
        }
    }
}

// we like our default configs to be explicit
#[allow(unknown_lints)]
#[allow(clippy::derivable_impls)]
impl Default for AuctionParams {
    fn default() -> Self {
        Self {
            max_bundle_size: 2,
            reserve_fee: Amount::new(1),
            min_bid_increment: Amount::new(1),
            front_running_protection: true,
        }
    }
}

impl Default for BlockBudget {
    fn default() -> Self {
        Self {
            max_bytes: 2 * 1024 * 1024,
            max_txs: 5_000,
            max_gas: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() -> color_eyre::eyre::Result<()> {
        laneway_test::init();

        let config = Config::default();

        // this avoids a ValueAfterTable error
        let encoded = toml::to_string(&toml::Value::try_from(&config)?)?;

        assert_eq!(toml::from_str::<Config>(&encoded)?, config);

        Ok(())
    }

    #[test]
    fn partial_config_uses_defaults() -> color_eyre::eyre::Result<()> {
        laneway_test::init();

        let config: Config = toml::from_str(
            r#"
            [[lanes]]
            kind = "free"
            max_block_space_percent = 20

            [[lanes]]
            kind = "default"

            [auction]
            reserve_fee = 1000
            "#,
        )?;

        assert_eq!(config.fee_denom, "ulane");
        assert_eq!(config.lanes.len(), 2);
        assert_eq!(config.lanes[0].max_block_space_percent, 20);
        assert_eq!(config.auction.reserve_fee, Amount::<NonNegative>::new(1000));
        assert_eq!(config.auction.max_bundle_size, 2);
        assert_eq!(config.block, BlockBudget::default());

        Ok(())
    }

    #[test]
    fn unknown_fields_are_rejected() {
        laneway_test::init();

        let result = toml::from_str::<Config>("lane_count = 3");
        assert!(result.is_err());
    }
}
