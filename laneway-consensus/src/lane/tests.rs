//! Tests for lane layouts, lane assignment, and priority order.

use std::cmp::Ordering;

use color_eyre::eyre::Result;
use proptest::prelude::*;

use laneway_chain::{
    amount::{Amount, NonNegative},
    transaction::{Hash, Transaction, UnminedTx},
    Address,
};

use crate::{
    config::{Config, LaneConfig},
    error::{LaneError, LaneLayoutError},
    lane::{LaneKind, LaneRules, OrderKey, Priority},
};

const UPDATE_CLIENT: &str = "/ibc.core.client.v1.MsgUpdateClient";

fn lanes(kinds: &[LaneKind]) -> Vec<LaneConfig> {
    kinds
        .iter()
        .map(|kind| LaneConfig {
            kind: *kind,
            max_block_space_percent: 0,
        })
        .collect()
}

fn layout_error(kinds: &[LaneKind]) -> Option<LaneLayoutError> {
    let config = Config {
        lanes: lanes(kinds),
        ..Config::default()
    };

    LaneRules::new(&config).err()
}

fn fee_per_gas(fee: i64, gas_limit: u64) -> Priority {
    Priority::FeePerGas {
        fee: Amount::<NonNegative>::new(fee),
        gas_limit,
    }
}

#[test]
fn default_layout_is_valid() -> Result<()> {
    laneway_test::init();

    let rules = LaneRules::new(&Config::default())?;
    let kinds: Vec<_> = rules.lanes().iter().map(|lane| lane.kind).collect();

    assert_eq!(kinds, [LaneKind::Mev, LaneKind::Free, LaneKind::Default]);

    Ok(())
}

#[test]
fn invalid_layouts_are_rejected() {
    laneway_test::init();

    use LaneKind::*;

    assert_eq!(layout_error(&[]), Some(LaneLayoutError::Empty));
    assert_eq!(layout_error(&[Mev, Free]), Some(LaneLayoutError::MissingDefault));
    assert_eq!(
        layout_error(&[Mev, Default, Free]),
        Some(LaneLayoutError::DefaultNotLast)
    );
    assert_eq!(layout_error(&[Free, Mev, Default]), Some(LaneLayoutError::MevNotFirst));
    assert_eq!(
        layout_error(&[Free, Free, Default]),
        Some(LaneLayoutError::DuplicateLane(Free))
    );

    assert_eq!(layout_error(&[Default]), None);
    assert_eq!(layout_error(&[Free, Default]), None);
}

#[test]
fn invalid_block_space_is_rejected() {
    laneway_test::init();

    let mut config = Config::default();
    config.lanes[1].max_block_space_percent = 101;

    assert_eq!(
        LaneRules::new(&config).err(),
        Some(LaneLayoutError::InvalidBlockSpace {
            kind: LaneKind::Free,
            percent: 101,
        })
    );
}

#[test]
fn bid_type_cannot_be_free() {
    laneway_test::init();

    let mut config = Config::default();
    config
        .free_message_types
        .push(laneway_chain::transaction::MsgAuctionBid::TYPE_URL.to_string());

    assert_eq!(
        LaneRules::new(&config).err(),
        Some(LaneLayoutError::FreeBidMessage)
    );
}

#[test]
fn transactions_go_to_the_first_matching_lane() -> Result<()> {
    laneway_test::init();

    let rules = LaneRules::new(&Config::default())?;
    let relayer = Address::test_address(1);

    let transfer = UnminedTx::from(Transaction::test_transfer(relayer, 0, 10, 100));
    let update = UnminedTx::from(Transaction::test_single_message(relayer, 1, UPDATE_CLIENT));
    let bid = UnminedTx::from(Transaction::test_bid(relayer, 2, 50, &[transfer.id]));

    let mut mixed = Transaction::test_single_message(relayer, 3, UPDATE_CLIENT);
    mixed
        .messages
        .extend(Transaction::test_transfer(relayer, 3, 0, 0).messages);
    let mixed = UnminedTx::from(mixed);

    assert_eq!(rules.assign(&transfer)?.kind, LaneKind::Default);
    assert_eq!(rules.assign(&update)?.kind, LaneKind::Free);
    assert_eq!(rules.assign(&mixed)?.kind, LaneKind::Default);

    let bid_assignment = rules.assign(&bid)?;
    assert_eq!(bid_assignment.kind, LaneKind::Mev);
    assert_eq!(bid_assignment.index, 0);
    assert_eq!(bid_assignment.key.priority, Priority::Bid(Amount::new(50)));

    Ok(())
}

#[test]
fn free_messages_use_the_default_lane_without_a_free_lane() -> Result<()> {
    laneway_test::init();

    let config = Config {
        lanes: lanes(&[LaneKind::Mev, LaneKind::Default]),
        ..Config::default()
    };
    let rules = LaneRules::new(&config)?;

    let update = Transaction::test_single_message(Address::test_address(1), 0, UPDATE_CLIENT);

    assert_eq!(rules.assign(&UnminedTx::from(update.clone()))?.kind, LaneKind::Default);
    assert!(rules.is_free(&update));
    assert!(!rules.is_fee_exempt(&update));

    Ok(())
}

#[test]
fn bids_never_fall_through() -> Result<()> {
    laneway_test::init();

    let config = Config {
        lanes: lanes(&[LaneKind::Free, LaneKind::Default]),
        ..Config::default()
    };
    let rules = LaneRules::new(&config)?;

    let bidder = Address::test_address(9);
    let bid = UnminedTx::from(Transaction::test_bid(bidder, 0, 50, &[Hash([1; 32])]));

    assert!(matches!(rules.assign(&bid), Err(LaneError::NoMatchingLane)));

    Ok(())
}

#[test]
fn malformed_bids_are_lane_errors() -> Result<()> {
    laneway_test::init();

    let rules = LaneRules::new(&Config::default())?;
    let bid = UnminedTx::from(Transaction::test_bid(Address::test_address(9), 0, -1, &[Hash([1; 32])]));

    assert!(matches!(rules.assign(&bid), Err(LaneError::Bid(_))));

    Ok(())
}

#[test]
fn fee_per_gas_compares_exactly() {
    laneway_test::init();

    // 1/3 < 1/2
    assert_eq!(fee_per_gas(1, 3).cmp(&fee_per_gas(1, 2)), Ordering::Less);
    // 2/4 == 1/2
    assert_eq!(fee_per_gas(2, 4), fee_per_gas(1, 2));
    // 5/1 > 3/1
    assert!(fee_per_gas(5, 1) > fee_per_gas(3, 1));
    // zero gas counts as one unit
    assert_eq!(fee_per_gas(7, 0), fee_per_gas(7, 1));
    // large values don't overflow
    assert!(
        fee_per_gas(laneway_chain::amount::MAX_MONEY, u64::MAX)
            < fee_per_gas(laneway_chain::amount::MAX_MONEY, u64::MAX - 1)
    );
}

#[test]
fn equal_priorities_order_by_hash() {
    laneway_test::init();

    let low_hash = OrderKey {
        priority: fee_per_gas(2, 4),
        id: Hash([1; 32]),
    };
    let high_hash = OrderKey {
        priority: fee_per_gas(1, 2),
        id: Hash([2; 32]),
    };
    let higher_priority = OrderKey {
        priority: fee_per_gas(1, 1),
        id: Hash([3; 32]),
    };

    assert!(low_hash < high_hash);
    assert!(higher_priority < low_hash);
}

#[test]
fn lane_block_space() {
    laneway_test::init();

    let lane = crate::lane::Lane {
        kind: LaneKind::Free,
        max_block_space_percent: 10,
    };
    assert_eq!(lane.max_bytes(1_000), 100);
    assert_eq!(lane.max_bytes(u64::MAX), u64::MAX / 10);

    let unlimited = crate::lane::Lane {
        kind: LaneKind::Default,
        max_block_space_percent: 0,
    };
    assert_eq!(unlimited.max_bytes(1_000), 1_000);
}

proptest! {
    /// Sorting by order key always puts higher fee-per-gas first.
    #[test]
    fn order_keys_sort_by_descending_fee_per_gas(
        entries in prop::collection::vec((0..1_000_000i64, 0..1_000u64, any::<[u8; 32]>()), 1..20),
    ) {
        laneway_test::init();

        let mut keys: Vec<OrderKey> = entries
            .iter()
            .map(|(fee, gas, id)| OrderKey {
                priority: fee_per_gas(*fee, *gas),
                id: Hash(*id),
            })
            .collect();
        keys.sort();

        for pair in keys.windows(2) {
            prop_assert!(pair[0].priority >= pair[1].priority);

            if pair[0].priority == pair[1].priority {
                prop_assert!(pair[0].id <= pair[1].id);
            }
        }
    }
}
