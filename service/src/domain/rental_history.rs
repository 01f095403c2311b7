//! [`RentalHistory`] definitions.

use common::{marker, DateTime, DateTimeOf, Money, Period};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{booking, payment, unit, user, Booking};
#[cfg(doc)]
use crate::domain::{Unit, User};

/// Write-once audit record of a settled [`Booking`].
///
/// At most one [`RentalHistory`] exists per [`Booking`].
#[derive(Clone, Debug, PartialEq)]
pub struct RentalHistory {
    /// ID of this [`RentalHistory`].
    pub id: Id,

    /// ID of the settled [`Booking`].
    pub booking_id: booking::Id,

    /// ID of the rented [`Unit`].
    pub unit_id: unit::Id,

    /// ID of the [`User`] who rented the [`Unit`].
    pub tenant_id: user::Id,

    /// Rented [`Period`].
    pub period: Period,

    /// Amount paid for the [`Period`].
    pub total_paid: Money,

    /// [`payment::Method`] the [`Booking`] was settled with.
    pub payment_method: payment::Method,

    /// [`DateTime`] when this [`RentalHistory`] was created.
    pub created_at: CreationDateTime,
}

impl RentalHistory {
    /// Derives a new [`RentalHistory`] from the provided settled [`Booking`].
    #[must_use]
    pub fn of(booking: &Booking, payment_method: payment::Method) -> Self {
        Self {
            id: Id::new(),
            booking_id: booking.id,
            unit_id: booking.unit_id,
            tenant_id: booking.tenant_id,
            period: booking.period,
            total_paid: booking.total_price,
            payment_method,
            created_at: DateTime::now().coerce(),
        }
    }
}

/// ID of a [`RentalHistory`].
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

/// [`DateTime`] when a [`RentalHistory`] was created.
pub type CreationDateTime = DateTimeOf<(RentalHistory, marker::Creation)>;
