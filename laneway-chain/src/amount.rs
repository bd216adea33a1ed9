//! Amounts of the fee asset, in base units.
//!
//! Fees, bids, reserve prices, and account balances are all [`Amount`]s. The
//! [`Constraint`] type parameter sets the valid range, so a decoded bid can be
//! negative, but a bid that passed [`Amount::constrain`] can't.

use std::{cmp::Ordering, fmt, hash::Hash, marker::PhantomData, ops::RangeInclusive};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::serialization::{LanewayDeserialize, LanewaySerialize, SerializationError};

#[cfg(any(test, feature = "proptest-impl"))]
pub mod arbitrary;


/// The result of an amount operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The largest amount of the fee asset, in base units.
///
/// Products of two amounts, or an amount and a `u64` gas limit, always fit in a `u128`.
pub const MAX_MONEY: i64 = 1_000_000_000_000_000;

/// An amount of the fee asset, checked against the constraint `C`.
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64", bound = "C: Constraint + Clone")]
pub struct Amount<C = NegativeAllowed>(i64, #[serde(skip)] PhantomData<C>);

impl Amount<NonNegative> {
    /// Returns a non-negative amount of `units`.
    ///
    /// # Panics
    ///
    /// If `units` is negative or greater than [`MAX_MONEY`].
    pub const fn new(units: i64) -> Self {
        assert!(units >= 0 && units <= MAX_MONEY);
        Self(units, PhantomData)
    }
}

impl<C> Amount<C> {
    /// Returns the number of base units.
    pub fn units(&self) -> i64 {
        self.0
    }

    /// Returns this amount under a different constraint, if it satisfies it.
    pub fn constrain<C2: Constraint>(self) -> Result<Amount<C2>> {
        self.0.try_into()
    }

    /// Returns a zero amount.
    pub fn zero() -> Self {
        Self(0, PhantomData)
    }
}

impl<C: Constraint> std::ops::Add for Amount<C> {
    type Output = Result<Amount<C>>;

    fn add(self, rhs: Amount<C>) -> Self::Output {
        // Both sides are at most MAX_MONEY in magnitude, so this can't overflow.
        (self.0 + rhs.0).try_into()
    }
}

impl<C> fmt::Display for Amount<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<C> fmt::Debug for Amount<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Amount<{}>", std::any::type_name::<C>()))
            .field(&self.0)
            .finish()
    }
}

impl<C> From<Amount<C>> for i64 {
    fn from(amount: Amount<C>) -> Self {
        amount.0
    }
}

impl From<Amount<NonNegative>> for u64 {
    fn from(amount: Amount<NonNegative>) -> Self {
        amount.0.unsigned_abs()
    }
}

impl From<Amount<NonNegative>> for u128 {
    fn from(amount: Amount<NonNegative>) -> Self {
        u64::from(amount).into()
    }
}

impl<C: Constraint> TryFrom<i64> for Amount<C> {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        C::validate(value).map(|units| Self(units, PhantomData))
    }
}

impl<C: Constraint> TryFrom<u64> for Amount<C> {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        i64::try_from(value)
            .map_err(|_| Error::Constraint {
                value: value.into(),
                range: C::valid_range(),
            })?
            .try_into()
    }
}

// Amounts compare and hash by value, whatever their constraints.

impl<C> Hash for Amount<C> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<C1, C2> PartialEq<Amount<C2>> for Amount<C1> {
    fn eq(&self, other: &Amount<C2>) -> bool {
        self.0 == other.0
    }
}

impl<C> PartialEq<i64> for Amount<C> {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl<C> Eq for Amount<C> {}

impl<C1, C2> PartialOrd<Amount<C2>> for Amount<C1> {
    fn partial_cmp(&self, other: &Amount<C2>) -> Option<Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

impl<C> Ord for Amount<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// An amount outside the range allowed by its constraint.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The value is outside the valid range.
    #[error("amount {value} is outside the valid range {range:?}")]
    Constraint {
        /// The rejected value.
        value: i128,
        /// The valid range for the constraint.
        range: RangeInclusive<i64>,
    },
}

/// The range of values an [`Amount`] can hold.
pub trait Constraint {
    /// Returns the valid range.
    fn valid_range() -> RangeInclusive<i64>;

    /// Returns `value` if it is in the valid range.
    fn validate(value: i64) -> Result<i64> {
        let range = Self::valid_range();

        if range.contains(&value) {
            Ok(value)
        } else {
            Err(Error::Constraint {
                value: value.into(),
                range,
            })
        }
    }
}

/// Amounts between `-MAX_MONEY` and `MAX_MONEY`, such as bids before they are checked.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct NegativeAllowed;

impl Constraint for NegativeAllowed {
    fn valid_range() -> RangeInclusive<i64> {
        -MAX_MONEY..=MAX_MONEY
    }
}

/// Amounts between zero and `MAX_MONEY`, such as fees and balances.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub struct NonNegative;

impl Constraint for NonNegative {
    fn valid_range() -> RangeInclusive<i64> {
        0..=MAX_MONEY
    }
}

// Bids are encoded as signed integers, so that negative bids decode and can be
// rejected with a bid error instead of a parse error.

impl LanewaySerialize for Amount<NegativeAllowed> {
    fn laneway_serialize<W: std::io::Write>(&self, mut writer: W) -> Result<(), std::io::Error> {
        writer.write_i64::<LittleEndian>(self.0)
    }
}

impl LanewayDeserialize for Amount<NegativeAllowed> {
    fn laneway_deserialize<R: std::io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(reader.read_i64::<LittleEndian>()?.try_into()?)
    }
}

impl LanewaySerialize for Amount<NonNegative> {
    fn laneway_serialize<W: std::io::Write>(&self, mut writer: W) -> Result<(), std::io::Error> {
        writer.write_u64::<LittleEndian>(u64::from(*self))
    }
}

impl LanewayDeserialize for Amount<NonNegative> {
    fn laneway_deserialize<R: std::io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(reader.read_u64::<LittleEndian>()?.try_into()?)
    }
}
