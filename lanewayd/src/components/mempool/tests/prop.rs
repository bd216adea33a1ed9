//! Randomised property tests for the mempool.

use std::env;

use proptest::{collection::vec, prelude::*};
use tower::{Service, ServiceExt};

use laneway_chain::{
    block::Height,
    transaction::{self, Transaction},
    Address,
};
use laneway_node_services::consensus::{ProposalVote, Request, Response};

use super::{encode, setup};

const DEFAULT_MEMPOOL_PROPTEST_CASES: u32 = 16;

proptest! {
    // The mempool tests can generate very verbose logs, so we use fewer cases by
    // default. Set the PROPTEST_CASES env var to override this default.
    #![proptest_config(proptest::test_runner::Config::with_cases(env::var("PROPTEST_CASES")
                                          .ok()
                                          .and_then(|v| v.parse().ok())
                                          .unwrap_or(DEFAULT_MEMPOOL_PROPTEST_CASES)))]

    /// Every proposal built by the mempool is accepted by the mempool's own verifier.
    #[test]
    fn prepared_proposals_are_always_accepted(
        transactions in vec(any::<Transaction>(), 0..24),
        bids in vec((any::<u8>(), 1..10_000i64), 0..4),
        max_bytes in 0..10_000u64,
    ) {
        let runtime = laneway_test::init_async();

        runtime.block_on(async move {
            let mut mempool = setup(1_000_000_000);

            for transaction in &transactions {
                // Some arbitrary transactions are duplicates, or don't fit in a full lane.
                let _ = mempool
                    .ready()
                    .await
                    .expect("mempool is always ready")
                    .call(Request::CheckTx {
                        transaction: encode(transaction),
                        siblings: Vec::new(),
                    })
                    .await;
            }

            for (bidder, amount) in bids {
                let bidder = Address::test_address(bidder);
                let bundle = Transaction::test_transfer(bidder, 1, 10, 100_000);
                let bundle_id = transaction::UnminedTx::from(bundle.clone()).id;
                let bid = Transaction::test_bid(bidder, 0, amount, &[bundle_id]);

                // Lower bids are rejected once the mev lane is full.
                let _ = mempool
                    .ready()
                    .await
                    .expect("mempool is always ready")
                    .call(Request::CheckTx {
                        transaction: encode(&bid),
                        siblings: vec![encode(&bundle)],
                    })
                    .await;
            }

            let response = mempool
                .ready()
                .await
                .expect("mempool is always ready")
                .call(Request::PrepareProposal {
                    height: Height(1),
                    max_bytes,
                })
                .await
                .expect("building a proposal never fails");

            let Response::Proposal(proposal) = response else {
                unreachable!("unexpected response to PrepareProposal: {response:?}");
            };

            let response = mempool
                .ready()
                .await
                .expect("mempool is always ready")
                .call(Request::ProcessProposal {
                    height: Height(1),
                    proposal,
                })
                .await
                .expect("voting never fails");

            prop_assert_eq!(response, Response::ProcessProposal(ProposalVote::Accept));

            Ok(())
        })?;
    }
}
