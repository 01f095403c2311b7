//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Floating-point percentage in `0..=100` range.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Percent(Decimal);

impl Percent {
    /// Zero [`Percent`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Percent`] by checking the provided value is in
    /// `0..=100` range.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        if val < Decimal::ZERO || val > Decimal::ONE_HUNDRED {
            None
        } else {
            #[expect(
                clippy::allow_attributes,
                reason = "`expect` is not fulfilled for `unsafe_code`"
            )]
            #[allow(unsafe_code, reason = "invariants checked already")]
            Some(unsafe { Self::new_unchecked(val) })
        }
    }

    /// Creates a new [`Percent`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The provided value must be in `0..=100` range.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(val: Decimal) -> Self {
        Self(val)
    }

    /// Returns the raw value of this [`Percent`].
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Calculates this [`Percent`] of the provided `amount`.
    #[must_use]
    pub fn of(self, amount: Decimal) -> Decimal {
        amount * self.0 / Decimal::ONE_HUNDRED
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.
    //!
    //! [`Percent`] is serialized as a string and may be deserialized from
    //! either a string or a number.

    use std::{fmt, str::FromStr as _};

    use rust_decimal::{prelude::FromPrimitive as _, Decimal};
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::Percent;

    impl Serialize for Percent {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(&self.0.normalize())
        }
    }

    impl<'de> Deserialize<'de> for Percent {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            d.deserialize_any(Visitor)
        }
    }

    /// [`de::Visitor`] of a [`Percent`].
    struct Visitor;

    impl Visitor {
        /// Validates the parsed [`Decimal`].
        fn check<E: de::Error>(val: Option<Decimal>) -> Result<Percent, E> {
            val.and_then(Percent::new)
                .ok_or_else(|| E::custom("percent must be within 0..=100"))
        }
    }

    impl de::Visitor<'_> for Visitor {
        type Value = Percent;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a percent number within 0..=100")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Percent, E> {
            Self::check(Some(Decimal::from(v)))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Percent, E> {
            Self::check(Some(Decimal::from(v)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Percent, E> {
            Self::check(Decimal::from_f64(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Percent, E> {
            Self::check(Decimal::from_str(v).ok())
        }
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal_macros::dec;

    use super::Percent;

    #[test]
    fn bounds_are_inclusive() {
        assert!(Percent::new(dec!(0)).is_some());
        assert!(Percent::new(dec!(100)).is_some());
        assert!(Percent::new(dec!(-0.01)).is_none());
        assert!(Percent::new(dec!(100.01)).is_none());

        assert!("12.5".parse::<Percent>().is_ok());
        assert!("ten".parse::<Percent>().is_err());
    }

    #[test]
    fn takes_share_of_amount() {
        let ten = Percent::new(dec!(10)).unwrap();

        assert_eq!(ten.of(dec!(1000000)), dec!(100000));
        assert_eq!(ten.of(dec!(15)), dec!(1.5));
        assert_eq!(Percent::ZERO.of(dec!(1000)), dec!(0));
    }
}
