//! Contains impls of `LanewaySerialize`, `LanewayDeserialize` for all of the
//! transaction types, so that all of the serialization logic is in one place.

use std::io;

use crate::{
    address::Address,
    serialization::{
        LanewayDeserialize, LanewayDeserializeInto, LanewaySerialize, ReadLanewayExt,
        SerializationError, TrustedPreallocate, MAX_PROTOCOL_MESSAGE_LEN,
    },
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{Fee, Message, Signature, Signer, Transaction};

impl LanewaySerialize for Message {
    fn laneway_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.type_url.laneway_serialize(&mut writer)?;
        self.value.laneway_serialize(&mut writer)
    }
}

impl LanewayDeserialize for Message {
    fn laneway_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let type_url: String = (&mut reader).laneway_deserialize_into()?;

        if type_url.is_empty() {
            return Err(SerializationError::Parse("empty message type"));
        }

        Ok(Message {
            type_url,
            value: (&mut reader).laneway_deserialize_into()?,
        })
    }
}

impl LanewaySerialize for Signer {
    fn laneway_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.address.laneway_serialize(&mut writer)?;
        writer.write_u64::<LittleEndian>(self.sequence)
    }
}

impl LanewayDeserialize for Signer {
    fn laneway_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Signer {
            address: Address::laneway_deserialize(&mut reader)?,
            sequence: reader.read_u64::<LittleEndian>()?,
        })
    }
}

impl LanewaySerialize for Fee {
    fn laneway_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.amount.laneway_serialize(&mut writer)?;
        self.denom.laneway_serialize(&mut writer)?;
        writer.write_u64::<LittleEndian>(self.gas_limit)
    }
}

impl LanewayDeserialize for Fee {
    fn laneway_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Fee {
            amount: (&mut reader).laneway_deserialize_into()?,
            denom: (&mut reader).laneway_deserialize_into()?,
            gas_limit: reader.read_u64::<LittleEndian>()?,
        })
    }
}

impl LanewaySerialize for Signature {
    fn laneway_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.0)
    }
}

impl LanewayDeserialize for Signature {
    fn laneway_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Signature(reader.read_array()?))
    }
}

impl LanewaySerialize for Transaction {
    fn laneway_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.messages.laneway_serialize(&mut writer)?;
        self.signers.laneway_serialize(&mut writer)?;
        self.fee.laneway_serialize(&mut writer)?;
        self.memo.laneway_serialize(&mut writer)?;
        self.signatures.laneway_serialize(&mut writer)
    }
}

impl LanewayDeserialize for Transaction {
    fn laneway_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let messages: Vec<Message> = (&mut reader).laneway_deserialize_into()?;
        let signers: Vec<Signer> = (&mut reader).laneway_deserialize_into()?;
        let fee = (&mut reader).laneway_deserialize_into()?;
        let memo = (&mut reader).laneway_deserialize_into()?;
        let signatures: Vec<Signature> = (&mut reader).laneway_deserialize_into()?;

        if messages.is_empty() {
            return Err(SerializationError::Parse("transaction has no messages"));
        }
        if signers.is_empty() {
            return Err(SerializationError::Parse("transaction has no signers"));
        }
        if signatures.len() != signers.len() {
            return Err(SerializationError::Parse(
                "transaction must have one signature per signer",
            ));
        }

        Ok(Transaction {
            messages,
            signers,
            fee,
            memo,
            signatures,
        })
    }
}

/// A message takes at least 2 bytes: an empty type and an empty value would
/// each take one length byte.
pub(crate) const MIN_MESSAGE_SIZE: u64 = 2;

/// A signer is a 20 byte address and an 8 byte sequence number.
pub(crate) const SIGNER_SIZE: u64 = 20 + 8;

/// A signature is always 64 bytes.
pub(crate) const SIGNATURE_SIZE: u64 = 64;

impl TrustedPreallocate for Message {
    fn max_allocation() -> u64 {
        MAX_PROTOCOL_MESSAGE_LEN as u64 / MIN_MESSAGE_SIZE
    }
}

impl TrustedPreallocate for Signer {
    fn max_allocation() -> u64 {
        MAX_PROTOCOL_MESSAGE_LEN as u64 / SIGNER_SIZE
    }
}

impl TrustedPreallocate for Signature {
    fn max_allocation() -> u64 {
        MAX_PROTOCOL_MESSAGE_LEN as u64 / SIGNATURE_SIZE
    }
}
