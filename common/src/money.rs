//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a zero [`Money`] amount in the provided [`Currency`].
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Returns the same [`Currency`] with the provided `amount`.
    #[must_use]
    pub const fn with_amount(self, amount: Decimal) -> Self {
        Self {
            amount,
            currency: self.currency,
        }
    }

    /// Sums up the provided [`Money`] amounts grouping them by [`Currency`].
    ///
    /// Output is ordered by [`Currency`] discriminant.
    #[must_use]
    pub fn sum_by_currency(items: impl IntoIterator<Item = Self>) -> Vec<Self> {
        let mut totals: Vec<Self> = vec![];
        for m in items {
            if let Some(t) = totals.iter_mut().find(|t| t.currency == m.currency)
            {
                t.amount += m.amount;
            } else {
                totals.push(m);
            }
        }
        totals.sort_by_key(|t| t.currency.u8());
        totals
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        match amount.is_integer().then(|| amount.to_i128()).flatten() {
            Some(int) => write!(f, "{int}{currency}"),
            None => write!(f, "{}{currency}", amount.normalize()),
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 || !s.is_char_boundary(s.len() - 3) {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "US Dollar."]
        Usd = 1,

        #[doc = "Euro."]
        Eur = 2,

        #[doc = "Indonesian Rupiah."]
        Idr = 3,
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.
    //!
    //! [`Money`] is represented as a `{amount}{currency}` string, for example
    //! `1500000IDR` or `12.5USD`.

    use std::{borrow::Cow, str::FromStr as _};

    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::Money;

    impl Serialize for Money {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Money {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let s = <Cow<'de, str>>::deserialize(d)?;
            Self::from_str(&s).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal_macros::dec;

    use super::{Currency, Money};

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45USD").unwrap(),
            Money {
                amount: dec!(123.45),
                currency: Currency::Usd,
            },
        );
        assert_eq!(
            Money::from_str("1500000IDR").unwrap(),
            Money {
                amount: dec!(1500000),
                currency: Currency::Idr,
            },
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Us").is_err());
        assert!(Money::from_str("123.45Usdollar").is_err());
        assert!(Money::from_str("123.45RUB").is_err());
        assert!(Money::from_str("12€").is_err());

        assert!(Money::from_str("123.00EUR").is_ok());
        assert!(Money::from_str("123EUR").is_ok());
    }

    #[test]
    fn to_string() {
        let idr = |amount| Money {
            amount,
            currency: Currency::Idr,
        };

        assert_eq!(idr(dec!(2200000)).to_string(), "2200000IDR");
        assert_eq!(idr(dec!(2200000.00)).to_string(), "2200000IDR");
        assert_eq!(idr(dec!(-150.50)).to_string(), "-150.5IDR");
        assert_eq!(idr(dec!(0.10)).to_string(), "0.1IDR");
    }

    #[test]
    fn sums_per_currency() {
        let totals = Money::sum_by_currency([
            Money::from_str("10EUR").unwrap(),
            Money::from_str("1000IDR").unwrap(),
            Money::from_str("2.5EUR").unwrap(),
        ]);

        assert_eq!(
            totals,
            [
                Money::from_str("12.5EUR").unwrap(),
                Money::from_str("1000IDR").unwrap(),
            ],
        );
        assert!(Money::sum_by_currency([]).is_empty());
    }
}
