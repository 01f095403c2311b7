//! [`Payment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, marker, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{booking, user};
#[cfg(doc)]
use crate::domain::{Booking, RentalHistory, User};

/// Attempt to pay for a [`Booking`].
///
/// Several [`Payment`]s may reference the same [`Booking`], for example on
/// retries. Only a [`Status::Confirmed`] one settles the [`Booking`].
#[derive(Clone, Debug, PartialEq)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the [`Booking`] this [`Payment`] is made for.
    ///
    /// Not guaranteed to reference an existing [`Booking`].
    pub booking_id: booking::Id,

    /// [`Method`] of this [`Payment`].
    pub method: Method,

    /// Paid amount.
    pub amount: Money,

    /// [`Proof`] of this [`Payment`].
    pub proof: Option<Proof>,

    /// [`Status`] of this [`Payment`].
    pub status: Status,

    /// ID of the [`User`] who confirmed this [`Payment`], if any.
    pub confirmed_by: Option<user::Id>,

    /// [`DateTime`] when this [`Payment`] was confirmed.
    pub paid_at: Option<SettlementDateTime>,

    /// [`DateTime`] when this [`Payment`] was recorded.
    pub created_at: CreationDateTime,
}

/// ID of a [`Payment`].
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

define_kind! {
    #[case = "snake_case"]
    #[doc = "Method a [`Payment`] is made with.\n\n\
             Its label ends up in the [`RentalHistory`] of the settled \
             [`Booking`]."]
    enum Method {
        #[doc = "Attested by the owner without any payment record."]
        Offline = 1,

        #[doc = "Bank transfer."]
        Transfer = 2,

        #[doc = "Cash handed over in person."]
        Cash = 3,

        #[doc = "Payment gateway."]
        Gateway = 4,
    }
}

define_kind! {
    #[case = "snake_case"]
    #[doc = "Status of a [`Payment`]."]
    enum Status {
        #[doc = "Awaiting confirmation."]
        Pending = 1,

        #[doc = "Money is received."]
        Confirmed = 2,

        #[doc = "Money is not received."]
        Failed = 3,
    }
}

define_text! {
    #[doc = "Opaque reference proving a [`Payment`], like a receipt URL."]
    Proof(max = 2048)
}

/// [`DateTime`] when a [`Payment`] was recorded.
pub type CreationDateTime = DateTimeOf<(Payment, marker::Creation)>;

/// [`DateTime`] when a [`Payment`] was confirmed.
pub type SettlementDateTime = DateTimeOf<(Payment, marker::Settlement)>;
