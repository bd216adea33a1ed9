//! Top-of-block auction bids.
//!
//! A bid transaction pays to have its bundle of transactions executed first
//! in the block. [`extract`] tells "not a bid" apart from "malformed bid", and
//! the checks in this module apply the auction parameters to a bid and its
//! bundle. The mempool and the block verifier use the same checks.

use std::{collections::BTreeSet, collections::HashSet};

use laneway_chain::{
    amount::{Amount, NonNegative},
    transaction::{self, MsgAuctionBid, Transaction, UnminedTx},
    Address,
};

use crate::{config::AuctionParams, error::BidError};


/// The auction bid carried by a bid transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuctionBid {
    /// The account paying the bid.
    pub bidder: Address,

    /// The bid amount, in the fee denomination.
    pub bid: Amount<NonNegative>,

    /// The bundled transaction hashes, in execution order.
    pub bundle: Vec<transaction::Hash>,
}

/// Extracts the auction bid from `transaction`.
///
/// Returns `Ok(None)` if the transaction has no bid message. Returns an error if
/// it has a bid message that can't be used: more than one bid, a bid mixed with
/// other messages, an undecodable or negative bid, a bidder that didn't sign, or
/// a bundle that is empty or repeats a transaction.
pub fn extract(transaction: &Transaction) -> Result<Option<AuctionBid>, BidError> {
    let bid_messages = transaction
        .messages
        .iter()
        .filter(|message| message.type_url == MsgAuctionBid::TYPE_URL)
        .count();

    match bid_messages {
        0 => return Ok(None),
        1 => {}
        n => return Err(BidError::MultipleBids(n)),
    }

    if transaction.messages.len() != 1 {
        return Err(BidError::MixedMessages);
    }

    let message = MsgAuctionBid::from_message(&transaction.messages[0])?
        .expect("the message has the bid type");

    let bid: Amount<NonNegative> = message.bid.constrain()?;

    if !transaction.is_signed_by(&message.bidder) {
        return Err(BidError::BidderNotSigner(message.bidder));
    }

    if message.transactions.is_empty() {
        return Err(BidError::EmptyBundle);
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = message.transactions.iter().find(|hash| !seen.insert(**hash)) {
        return Err(BidError::DuplicateBundleTransaction(*duplicate));
    }

    Ok(Some(AuctionBid {
        bidder: message.bidder,
        bid,
        bundle: message.transactions,
    }))
}

impl AuctionParams {
    /// Checks the bid amount and bundle size of `bid`.
    pub fn check_bid(&self, bid: &AuctionBid) -> Result<(), BidError> {
        if bid.bid < self.reserve_fee {
            return Err(BidError::BelowReserve {
                bid: bid.bid,
                reserve: self.reserve_fee,
            });
        }

        if bid.bundle.len() > self.max_bundle_size {
            return Err(BidError::BundleTooLarge {
                actual: bid.bundle.len(),
                max: self.max_bundle_size,
            });
        }

        Ok(())
    }

    /// Checks that `bundle` is exactly the bundle named by `bid`, and that it
    /// follows the bundle rules.
    ///
    /// `bundle` must be in execution order.
    pub fn check_bundle(&self, bid: &AuctionBid, bundle: &[UnminedTx]) -> Result<(), BidError> {
        for (position, expected) in bid.bundle.iter().enumerate() {
            let found = bundle.get(position).map(|tx| tx.id);

            if found != Some(*expected) {
                return Err(BidError::BundleMismatch {
                    expected: *expected,
                    found,
                });
            }
        }

        for tx in bundle {
            if tx.transaction.has_message_type(MsgAuctionBid::TYPE_URL) {
                return Err(BidError::NestedBid(tx.id));
            }
        }

        if self.front_running_protection {
            check_front_running(bid.bidder, bundle)?;
        }

        Ok(())
    }
}

/// Checks that the bidder's transactions come first in the bundle, followed by
/// transactions from at most one other set of signers.
///
/// This stops a bidder from wrapping someone else's transaction between their
/// own transactions.
fn check_front_running(bidder: Address, bundle: &[UnminedTx]) -> Result<(), BidError> {
    let mut other_signers: Option<BTreeSet<Address>> = None;

    for tx in bundle {
        let signers = tx.transaction.signer_set();

        if signers.contains(&bidder) {
            if other_signers.is_some() {
                return Err(BidError::FrontRunning(tx.id));
            }
            continue;
        }

        match &other_signers {
            None => other_signers = Some(signers),
            Some(other) if *other == signers => {}
            Some(_) => return Err(BidError::TooManySigners(tx.id)),
        }
    }

    Ok(())
}
