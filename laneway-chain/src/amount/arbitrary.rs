//! Randomised test case generation for amounts.

use proptest::prelude::*;

use super::{Amount, Constraint};

impl<C> Arbitrary for Amount<C>
where
    C: Constraint + std::fmt::Debug,
{
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        C::valid_range()
            .prop_map(|units| {
                units
                    .try_into()
                    .expect("values in the valid range are always valid")
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
