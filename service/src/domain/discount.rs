//! [`Discount`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{marker, Date, DateTimeOf, Percent, Period};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{unit, user};
#[cfg(doc)]
use crate::domain::{Unit, User};

/// Time-limited discount announced by an owner for one of their [`Unit`]s.
///
/// Informational only: booking prices are computed from the
/// [`Unit::discount_percent`] or a promotional code.
#[derive(Clone, Debug, PartialEq)]
pub struct Discount {
    /// ID of this [`Discount`].
    pub id: Id,

    /// ID of the discounted [`Unit`].
    pub unit_id: unit::Id,

    /// ID of the [`User`] who announced this [`Discount`].
    pub owner_id: user::Id,

    /// [`Name`] of this [`Discount`].
    pub name: Name,

    /// Discount rate.
    pub percent: Percent,

    /// [`Period`] this [`Discount`] is valid within.
    pub period: Period,

    /// Indicator whether this [`Discount`] is switched on.
    pub is_active: bool,

    /// [`DateTime`] when this [`Discount`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Discount`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl Discount {
    /// Indicates whether this [`Discount`] is active on the provided [`Date`].
    #[must_use]
    pub fn is_effective_on(&self, date: Date) -> bool {
        self.is_active
            && self.period.start() <= date
            && date <= self.period.end()
    }
}

/// ID of a [`Discount`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    #[doc = "Name of a [`Discount`]."]
    Name(max = 256)
}

/// [`DateTime`] when a [`Discount`] was created.
pub type CreationDateTime = DateTimeOf<(Discount, marker::Creation)>;

/// [`DateTime`] when a [`Discount`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Discount, marker::Modification)>;

#[cfg(test)]
mod spec {
    use common::{DateTime, Percent, Period};

    use crate::domain::{unit, user};

    use super::{Discount, Id, Name};

    #[test]
    fn effective_only_within_period_when_active() {
        let mut discount = Discount {
            id: Id::new(),
            unit_id: unit::Id::new(),
            owner_id: user::Id::new(),
            name: Name::new("Ramadan").unwrap(),
            percent: "15".parse::<Percent>().unwrap(),
            period: Period::month("2025-03").unwrap(),
            is_active: true,
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        };

        assert!(discount.is_effective_on("2025-03-01".parse().unwrap()));
        assert!(discount.is_effective_on("2025-03-31".parse().unwrap()));
        assert!(!discount.is_effective_on("2025-04-01".parse().unwrap()));

        discount.is_active = false;
        assert!(!discount.is_effective_on("2025-03-15".parse().unwrap()));
    }
}
