//! Arbitrary data generation and test builders for transactions.

use proptest::{collection::vec, prelude::*};

use crate::{
    address::Address,
    amount::{Amount, NegativeAllowed, NonNegative},
};

use super::{Fee, Hash, Message, MsgAuctionBid, Signature, Signer, Transaction};

/// The fee denomination used by test transactions.
pub const TEST_FEE_DENOM: &str = "ulane";

/// The message type used by test transfers.
pub const TEST_TRANSFER_TYPE: &str = "/cosmos.bank.v1beta1.MsgSend";

/// A sample of message types, including relayer messages and auction bids.
const MESSAGE_TYPES: &[&str] = &[
    TEST_TRANSFER_TYPE,
    "/ibc.core.client.v1.MsgUpdateClient",
    "/ibc.core.channel.v1.MsgRecvPacket",
    "/cosmos.staking.v1beta1.MsgDelegate",
];

impl Arbitrary for Signature {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (any::<[u8; 32]>(), any::<[u8; 32]>())
            .prop_map(|(first, second)| {
                let mut bytes = [0; 64];
                bytes[..32].copy_from_slice(&first);
                bytes[32..].copy_from_slice(&second);
                Signature(bytes)
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for Message {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (
            prop::sample::select(MESSAGE_TYPES),
            vec(any::<u8>(), 0..64),
        )
            .prop_map(|(type_url, value)| Message {
                type_url: type_url.to_string(),
                value,
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for Fee {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (any::<Amount<NonNegative>>(), 0..1_000_000u64)
            .prop_map(|(amount, gas_limit)| Fee {
                amount,
                denom: TEST_FEE_DENOM.to_string(),
                gas_limit,
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for Transaction {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (
            vec(any::<Message>(), 1..4),
            vec((any::<Signer>(), any::<Signature>()), 1..3),
            any::<Fee>(),
            "[a-z ]{0,16}",
        )
            .prop_map(|(messages, signed, fee, memo)| {
                let (signers, signatures) = signed.into_iter().unzip();
                Transaction {
                    messages,
                    signers,
                    fee,
                    memo,
                    signatures,
                }
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Address {
    /// Returns a test address with every byte set to `byte`.
    pub fn test_address(byte: u8) -> Self {
        Address([byte; 20])
    }
}

impl Transaction {
    /// Returns a test transaction signed by `signer`, containing `messages`,
    /// and paying `fee` test fee units for `gas_limit` gas.
    pub fn test_with_messages(
        signer: Address,
        sequence: u64,
        messages: Vec<Message>,
        fee: i64,
        gas_limit: u64,
    ) -> Self {
        Transaction {
            messages,
            signers: vec![Signer {
                address: signer,
                sequence,
            }],
            fee: Fee {
                amount: fee.try_into().expect("test fees are valid amounts"),
                denom: TEST_FEE_DENOM.to_string(),
                gas_limit,
            },
            memo: String::new(),
            signatures: vec![Signature([sequence as u8; 64])],
        }
    }

    /// Returns a test transfer from `signer`.
    pub fn test_transfer(signer: Address, sequence: u64, fee: i64, gas_limit: u64) -> Self {
        let message = Message {
            type_url: TEST_TRANSFER_TYPE.to_string(),
            value: signer.0.to_vec(),
        };

        Self::test_with_messages(signer, sequence, vec![message], fee, gas_limit)
    }

    /// Returns a test transaction containing a single message of type `type_url`.
    pub fn test_single_message(signer: Address, sequence: u64, type_url: &str) -> Self {
        let message = Message {
            type_url: type_url.to_string(),
            value: vec![sequence as u8],
        };

        Self::test_with_messages(signer, sequence, vec![message], 0, 100_000)
    }

    /// Returns a test bid from `bidder`, paying `bid` for `bundle`.
    pub fn test_bid(bidder: Address, sequence: u64, bid: i64, bundle: &[Hash]) -> Self {
        let bid: Amount<NegativeAllowed> = bid.try_into().expect("test bids are valid amounts");
        let message = MsgAuctionBid {
            bidder,
            bid,
            transactions: bundle.to_vec(),
        }
        .to_message();

        Self::test_with_messages(bidder, sequence, vec![message], 1_000, 200_000)
    }
}
