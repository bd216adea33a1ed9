//! Transaction admission into the mempool.
//!
//! Each submitted transaction goes through:
//!
//! 1. decoding,
//! 2. lane assignment, which extracts any auction bid,
//! 3. ante validation of the transaction itself,
//! 4. for bids: bundle resolution, the auction rules, ante validation of each
//!    bundled transaction, and a bidder balance check,
//! 5. insertion into its lane.
//!
//! The mempool lock is only held for quick lookups and the final insert, never
//! while waiting for the ante or balance services.

use std::sync::{Arc, Mutex, MutexGuard};

use tower::{Service, ServiceExt};

use laneway_chain::{
    block::Height,
    transaction::{self, UnminedTx},
};
use laneway_consensus::{auction::AuctionBid, error::LaneError, LaneRules};
use laneway_node_services::{ante, balance};

use super::{
    storage::{LaneEntry, Storage},
    MempoolError,
};
use crate::BoxError;

/// Checks submitted transactions, and inserts valid ones into the mempool.
#[derive(Clone)]
pub struct Admission<A, B> {
    /// The lane rules, shared with the proposal builder and verifier.
    rules: Arc<LaneRules>,

    /// The mempool storage.
    storage: Arc<Mutex<Storage>>,

    /// The ante validation service.
    ante: A,

    /// The balance query service.
    balance: B,
}

impl<A, B> Admission<A, B>
where
    A: Service<ante::Request, Response = ante::Response, Error = BoxError> + Clone + Send + 'static,
    A::Future: Send + 'static,
    B: Service<balance::Request, Response = balance::Response, Error = BoxError>
        + Clone
        + Send
        + 'static,
    B::Future: Send + 'static,
{
    /// Returns a new admission checker for `storage`.
    pub fn new(rules: Arc<LaneRules>, storage: Arc<Mutex<Storage>>, ante: A, balance: B) -> Self {
        Self {
            rules,
            storage,
            ante,
            balance,
        }
    }

    /// Checks `transaction`, and inserts it into the mempool if it is valid.
    ///
    /// If `transaction` is an auction bid, its bundle is taken from `siblings`,
    /// or from transactions already in the mempool. Siblings are only stored
    /// as part of the bid's bundle, and siblings outside the bundle are ignored
    /// without being decoded.
    ///
    /// A transaction that is already in the mempool is rejected, even if it is
    /// only there as part of a bid's bundle.
    pub async fn check_tx(
        self,
        transaction: Vec<u8>,
        siblings: Vec<Vec<u8>>,
    ) -> Result<transaction::Hash, MempoolError> {
        let tx = UnminedTx::from_bytes(transaction)?;

        let assignment = self.rules.assign(&tx).map_err(|error| match error {
            LaneError::Bid(error) => MempoolError::MalformedBid(error),
            LaneError::NoMatchingLane => MempoolError::NoMatchingLane,
        })?;

        // Quick checks, so we don't call the ante service for transactions
        // that can't be inserted.
        let height = {
            let storage = self.lock();

            if storage.contains(&tx.id) {
                return Err(MempoolError::DuplicateTx(tx.id));
            }

            if let Some(bid) = &assignment.bid {
                if let Some(existing) = storage.bid_from(&bid.bidder) {
                    return Err(MempoolError::DuplicateBidder {
                        bidder: bid.bidder,
                        existing,
                    });
                }
            }

            storage.next_height()
        };

        let fee_exempt = self.rules.is_fee_exempt(&tx.transaction);
        Self::ante_check(
            self.ante.clone(),
            ante::Request::check(tx.clone(), height, fee_exempt),
        )
        .await?;

        let bundle = match &assignment.bid {
            Some(bid) => self.clone().check_bid(bid.clone(), siblings, height).await?,
            None => Vec::new(),
        };

        let entry = LaneEntry {
            key: assignment.key,
            transaction: tx,
            bid: assignment.bid,
            bundle,
        };

        let result = self.lock().insert(assignment.index, entry);

        match &result {
            Ok(tx_id) => tracing::debug!(?tx_id, lane = %assignment.kind, "admitted transaction"),
            Err(error) => tracing::debug!(?error, lane = %assignment.kind, "rejected transaction"),
        }

        result
    }

    /// Checks an auction bid, and returns its resolved bundle.
    async fn check_bid(
        self,
        bid: AuctionBid,
        siblings: Vec<Vec<u8>>,
        height: Height,
    ) -> Result<Vec<UnminedTx>, MempoolError> {
        let auction = self.rules.auction();
        auction.check_bid(&bid)?;

        // Only the siblings that the bid references are decoded.
        let siblings: Vec<(transaction::Hash, Vec<u8>)> = siblings
            .into_iter()
            .map(|bytes| (transaction::Hash::of_bytes(&bytes), bytes))
            .collect();

        let submitted = bid
            .bundle
            .iter()
            .map(|hash| {
                siblings
                    .iter()
                    .find(|(id, _)| id == hash)
                    .map(|(_, bytes)| UnminedTx::from_bytes(bytes.clone()))
                    .transpose()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let bundle = {
            let storage = self.lock();

            bid.bundle
                .iter()
                .zip(submitted)
                .map(|(hash, submitted)| {
                    submitted
                        .or_else(|| storage.resident(hash))
                        .ok_or(MempoolError::UnresolvedBundle(*hash))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        auction.check_bundle(&bid, &bundle)?;

        // Bundled transactions are not admitted on their own, so their
        // validation must not change the application's check state.
        for tx in &bundle {
            let fee_exempt = self.rules.is_fee_exempt(&tx.transaction);
            Self::ante_check(
                self.ante.clone(),
                ante::Request::simulate(tx.clone(), height, fee_exempt),
            )
            .await?;
        }

        let request = balance::Request::AvailableBalance {
            address: bid.bidder,
            denom: self.rules.fee_denom().to_string(),
        };
        let balance::Response::AvailableBalance(available) = self
            .balance
            .clone()
            .oneshot(request)
            .await
            .map_err(|source| MempoolError::BalanceUnavailable {
                bidder: bid.bidder,
                source,
            })?;

        if available < bid.bid {
            return Err(MempoolError::InsufficientBidFunds {
                bidder: bid.bidder,
                bid: bid.bid,
                available,
            });
        }

        Ok(bundle)
    }

    /// Calls the ante service with `request`.
    async fn ante_check(ante: A, request: ante::Request) -> Result<(), MempoolError> {
        let hash = request.transaction.id;

        ante.oneshot(request)
            .await
            .map_err(|source| MempoolError::AnteValidation { hash, source })?;

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Storage> {
        self.storage
            .lock()
            .expect("unexpected panic while the mempool lock was held")
    }
}
