//! The top-of-block auction bid message.
//!
//! A bid transaction carries exactly one [`MsgAuctionBid`]. The bid names the
//! bidder, the amount they pay for the top of the block, and the hashes of the
//! bundled transactions they want executed first, in execution order.

use std::io;

use crate::{
    address::Address,
    amount::{Amount, NegativeAllowed},
    serialization::{
        LanewayDeserialize, LanewayDeserializeInto, LanewaySerialize, SerializationError,
    },
};

use super::{Hash, Message};

/// The auction bid message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgAuctionBid {
    /// The account paying the bid.
    pub bidder: Address,

    /// The bid amount, in the fee denomination.
    ///
    /// Negative amounts can be encoded, so that they are reported as malformed
    /// bids rather than undecodable transactions.
    pub bid: Amount<NegativeAllowed>,

    /// The hashes of the bundled transactions, in execution order.
    pub transactions: Vec<Hash>,
}

impl MsgAuctionBid {
    /// The message type of auction bids.
    pub const TYPE_URL: &'static str = "/laneway.auction.v1.MsgAuctionBid";

    /// Wraps this bid in a transaction message.
    pub fn to_message(&self) -> Message {
        Message {
            type_url: Self::TYPE_URL.to_string(),
            value: self
                .laneway_serialize_to_vec()
                .expect("serializing into a vec never fails"),
        }
    }

    /// Decodes `message` as a bid.
    ///
    /// Returns `Ok(None)` if `message` has another type, and an error if it has
    /// the bid type but its payload can't be decoded.
    pub fn from_message(message: &Message) -> Result<Option<Self>, SerializationError> {
        if message.type_url != Self::TYPE_URL {
            return Ok(None);
        }

        Self::laneway_deserialize_exact(&message.value).map(Some)
    }
}

impl LanewaySerialize for MsgAuctionBid {
    fn laneway_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.bidder.laneway_serialize(&mut writer)?;
        self.bid.laneway_serialize(&mut writer)?;
        self.transactions.laneway_serialize(&mut writer)
    }
}

impl LanewayDeserialize for MsgAuctionBid {
    fn laneway_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(MsgAuctionBid {
            bidder: (&mut reader).laneway_deserialize_into()?,
            bid: (&mut reader).laneway_deserialize_into()?,
            transactions: (&mut reader).laneway_deserialize_into()?,
        })
    }
}
