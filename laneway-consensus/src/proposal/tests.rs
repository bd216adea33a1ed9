//! Tests for proposed block verification.

use std::sync::Arc;

use color_eyre::eyre::Result;
use tower::{service_fn, Service, ServiceExt};

use laneway_chain::{
    block::{Height, Proposal},
    serialization::LanewaySerialize,
    transaction::{Hash, Transaction, UnminedTx},
    Address,
};
use laneway_node_services::ante;

use crate::{
    config::{BlockBudget, Config},
    error::{BidError, OrderingViolation, ProposalError},
    lane::{LaneKind, LaneRules},
    proposal::{Request, Verifier},
    BoxError,
};

const UPDATE_CLIENT: &str = "/ibc.core.client.v1.MsgUpdateClient";

/// Transactions for a block that uses every lane.
struct Block {
    bid: UnminedTx,
    bundle: Vec<UnminedTx>,
    free: UnminedTx,
    high_fee: UnminedTx,
    low_fee: UnminedTx,
}

impl Block {
    fn new() -> Self {
        let bidder = Address::test_address(0xb1);
        let victim = Address::test_address(0x51);

        let bundle: Vec<UnminedTx> = vec![
            Transaction::test_transfer(bidder, 1, 10, 100_000).into(),
            Transaction::test_transfer(victim, 0, 10, 100_000).into(),
        ];
        let bundle_ids: Vec<Hash> = bundle.iter().map(|tx| tx.id).collect();

        Self {
            bid: Transaction::test_bid(bidder, 0, 500, &bundle_ids).into(),
            bundle,
            free: Transaction::test_single_message(Address::test_address(0x7e), 0, UPDATE_CLIENT)
                .into(),
            high_fee: Transaction::test_transfer(Address::test_address(1), 0, 300, 100_000).into(),
            low_fee: Transaction::test_transfer(Address::test_address(2), 0, 100, 100_000).into(),
        }
    }

    /// Returns the transactions in the order an honest proposer builds them.
    fn in_lane_order(&self) -> Vec<UnminedTx> {
        let mut transactions = vec![self.bid.clone()];
        transactions.extend(self.bundle.iter().cloned());
        transactions.push(self.free.clone());
        transactions.push(self.high_fee.clone());
        transactions.push(self.low_fee.clone());
        transactions
    }
}

fn request(transactions: &[UnminedTx]) -> Request {
    Request {
        height: Height(10),
        proposal: Proposal::from_transactions(transactions)
            .laneway_serialize_to_vec()
            .expect("proposals serialize to a vec"),
    }
}

async fn verify(rules: LaneRules, transactions: &[UnminedTx]) -> Result<(), ProposalError> {
    let ante = service_fn(|request: ante::Request| async move {
        Ok::<_, BoxError>(ante::Response::Valid {
            gas_wanted: request.transaction.gas_limit(),
        })
    });

    Verifier::new(Arc::new(rules), ante)
        .oneshot(request(transactions))
        .await
        .map(|_| ())
}

fn default_rules() -> LaneRules {
    LaneRules::new(&Config::default()).expect("default config is valid")
}

#[tokio::test]
async fn honest_proposals_are_accepted() -> Result<()> {
    laneway_test::init();

    let block = Block::new();
    let transactions = block.in_lane_order();

    let ante = service_fn(|request: ante::Request| async move {
        assert_eq!(request.mode, ante::Mode::Simulate);
        Ok::<_, BoxError>(ante::Response::Valid {
            gas_wanted: request.transaction.gas_limit(),
        })
    });

    let verified = Verifier::new(Arc::new(default_rules()), ante)
        .oneshot(request(&transactions))
        .await?;

    assert_eq!(verified.bid, Some(block.bid.id));
    assert_eq!(verified.transactions, transactions);

    Ok(())
}

#[tokio::test]
async fn empty_proposals_are_accepted() -> Result<()> {
    laneway_test::init();

    verify(default_rules(), &[]).await?;

    Ok(())
}

#[tokio::test]
async fn default_before_free_is_a_lane_order_violation() {
    laneway_test::init();

    let block = Block::new();
    let transactions = [block.high_fee.clone(), block.free.clone()];

    let error = verify(default_rules(), &transactions)
        .await
        .expect_err("lanes are out of order");

    assert!(matches!(
        error,
        ProposalError::OrderingViolation(OrderingViolation::LaneOrder {
            hash,
            found: LaneKind::Free,
            after: LaneKind::Default,
        }) if hash == block.free.id
    ));
}

#[tokio::test]
async fn a_bid_after_the_top_of_block_is_a_lane_order_violation() {
    laneway_test::init();

    let block = Block::new();
    let mut transactions = vec![block.free.clone(), block.bid.clone()];
    transactions.extend(block.bundle.iter().cloned());

    let error = verify(default_rules(), &transactions)
        .await
        .expect_err("the bid is not at the top of the block");

    assert!(matches!(
        error,
        ProposalError::OrderingViolation(OrderingViolation::LaneOrder {
            found: LaneKind::Mev,
            ..
        })
    ));
}

#[tokio::test]
async fn low_fee_before_high_fee_is_a_priority_violation() {
    laneway_test::init();

    let block = Block::new();
    let transactions = [block.low_fee.clone(), block.high_fee.clone()];

    let error = verify(default_rules(), &transactions)
        .await
        .expect_err("priorities are out of order");

    assert!(matches!(
        error,
        ProposalError::OrderingViolation(OrderingViolation::PriorityOrder {
            hash,
            kind: LaneKind::Default,
        }) if hash == block.high_fee.id
    ));
}

#[tokio::test]
async fn equal_priorities_must_be_in_hash_order() -> Result<()> {
    laneway_test::init();

    let mut transactions: Vec<UnminedTx> = (0..2)
        .map(|sequence| {
            Transaction::test_transfer(Address::test_address(3), sequence, 100, 100_000).into()
        })
        .collect();
    transactions.sort_by_key(|tx| tx.id);

    verify(default_rules(), &transactions).await?;

    transactions.reverse();
    let error = verify(default_rules(), &transactions)
        .await
        .expect_err("equal priorities are in descending hash order");
    assert!(matches!(
        error,
        ProposalError::OrderingViolation(OrderingViolation::PriorityOrder { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn incomplete_bundles_are_rejected() {
    laneway_test::init();

    let block = Block::new();
    let transactions = [
        block.bid.clone(),
        block.bundle[0].clone(),
        block.high_fee.clone(),
    ];

    let error = verify(default_rules(), &transactions)
        .await
        .expect_err("the bundle is incomplete");

    assert!(matches!(
        error,
        ProposalError::Bid {
            hash,
            source: BidError::BundleMismatch { expected, .. },
        } if hash == block.bid.id && expected == block.bundle[1].id
    ));
}

#[tokio::test]
async fn only_one_bid_is_allowed() {
    laneway_test::init();

    let block = Block::new();
    let other_bundle: UnminedTx =
        Transaction::test_transfer(Address::test_address(0xb2), 1, 10, 100_000).into();
    let other_bid: UnminedTx =
        Transaction::test_bid(Address::test_address(0xb2), 0, 400, &[other_bundle.id]).into();

    let mut transactions = block.in_lane_order();
    transactions.insert(3, other_bid.clone());
    transactions.insert(4, other_bundle);

    let error = verify(default_rules(), &transactions)
        .await
        .expect_err("the block has two bids");

    assert!(matches!(
        error,
        ProposalError::OrderingViolation(OrderingViolation::MultipleBids(hash))
            if hash == other_bid.id
    ));
}

#[tokio::test]
async fn duplicate_transactions_are_rejected() {
    laneway_test::init();

    let block = Block::new();
    let mut transactions = block.in_lane_order();
    transactions.push(block.bundle[1].clone());

    let error = verify(default_rules(), &transactions)
        .await
        .expect_err("a bundled transaction is repeated");

    assert!(matches!(
        error,
        ProposalError::DuplicateTransaction(hash) if hash == block.bundle[1].id
    ));
}

#[tokio::test]
async fn undecodable_proposals_are_rejected() -> Result<()> {
    laneway_test::init();

    let ante = service_fn(|_: ante::Request| async move {
        Ok::<_, BoxError>(ante::Response::Valid { gas_wanted: 0 })
    });
    let mut verifier = Verifier::new(Arc::new(default_rules()), ante);

    let error = verifier
        .ready()
        .await?
        .call(Request {
            height: Height(10),
            proposal: vec![0xff, 0x00],
        })
        .await
        .expect_err("the proposal is garbage");
    assert!(matches!(error, ProposalError::Decode(_)));

    let error = verifier
        .ready()
        .await?
        .call(Request {
            height: Height(10),
            proposal: Proposal {
                transactions: vec![vec![1, 2, 3]],
            }
            .laneway_serialize_to_vec()?,
        })
        .await
        .expect_err("the transaction is garbage");
    assert!(matches!(
        error,
        ProposalError::TransactionDecode { index: 0, .. }
    ));

    Ok(())
}

#[tokio::test]
async fn block_budgets_are_enforced() {
    laneway_test::init();

    let block = Block::new();
    let transactions = block.in_lane_order();

    let config = Config {
        block: BlockBudget {
            max_txs: 2,
            ..BlockBudget::default()
        },
        ..Config::default()
    };
    let error = verify(LaneRules::new(&config).expect("valid config"), &transactions)
        .await
        .expect_err("too many transactions");
    assert!(matches!(error, ProposalError::TooManyTransactions { .. }));

    let config = Config {
        block: BlockBudget {
            max_bytes: 100,
            ..BlockBudget::default()
        },
        ..Config::default()
    };
    let error = verify(LaneRules::new(&config).expect("valid config"), &transactions)
        .await
        .expect_err("too many bytes");
    assert!(matches!(error, ProposalError::TooManyBytes { .. }));

    let config = Config {
        block: BlockBudget {
            max_gas: Some(100_000),
            ..BlockBudget::default()
        },
        ..Config::default()
    };
    let error = verify(LaneRules::new(&config).expect("valid config"), &transactions)
        .await
        .expect_err("too much gas");
    assert!(matches!(error, ProposalError::TooMuchGas { .. }));
}

#[tokio::test]
async fn lane_block_space_is_enforced() {
    laneway_test::init();

    let block = Block::new();
    let transactions = [block.free.clone()];

    let mut config = Config::default();
    config.block.max_bytes = block.free.size as u64 * 2;
    // the free lane gets a third of the block, less than one transaction
    config.lanes[1].max_block_space_percent = 33;

    let error = verify(LaneRules::new(&config).expect("valid config"), &transactions)
        .await
        .expect_err("the free lane is over its limit");

    assert!(matches!(
        error,
        ProposalError::LaneSpaceExceeded {
            kind: LaneKind::Free,
            ..
        }
    ));
}

#[tokio::test]
async fn ante_failures_reject_the_proposal() {
    laneway_test::init();

    let block = Block::new();
    let transactions = block.in_lane_order();
    let invalid = block.low_fee.id;

    let ante = service_fn(move |request: ante::Request| async move {
        if request.transaction.id == invalid {
            Err::<ante::Response, BoxError>("account sequence mismatch".into())
        } else {
            Ok(ante::Response::Valid {
                gas_wanted: request.transaction.gas_limit(),
            })
        }
    });

    let error = Verifier::new(Arc::new(default_rules()), ante)
        .oneshot(request(&transactions))
        .await
        .expect_err("the ante check fails");

    assert!(matches!(error, ProposalError::Ante { hash, .. } if hash == invalid));
}

#[tokio::test]
async fn free_lane_transactions_are_fee_exempt() -> Result<()> {
    laneway_test::init();

    let block = Block::new();
    let free = block.free.id;

    let ante = service_fn(move |request: ante::Request| async move {
        assert_eq!(request.fee_exempt, request.transaction.id == free);
        Ok::<_, BoxError>(ante::Response::Valid { gas_wanted: 0 })
    });

    Verifier::new(Arc::new(default_rules()), ante)
        .oneshot(request(&block.in_lane_order()))
        .await?;

    Ok(())
}
