//! [`Booking`] definitions and its lifecycle.
//!
//! ```text
//!            accept / settle
//! waiting ───────────────────► confirmed ──settle──► confirmed + paid
//!    │
//!    └──────── reject ───────► rejected
//! ```
//!
//! Every transition is a method on [`Booking`] returning an [`Outcome`], so
//! repeating a transition towards the state the [`Booking`] is already in is
//! reported as [`Outcome::Unchanged`] rather than applied twice.

use common::{define_kind, marker, DateTime, DateTimeOf, Money, Period};
use derive_more::{Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{unit, user};
#[cfg(doc)]
use crate::domain::{Unit, User};

/// Reservation of a [`Unit`] by a tenant for a [`Period`].
#[derive(Clone, Debug, PartialEq)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the booked [`Unit`].
    pub unit_id: unit::Id,

    /// ID of the [`User`] renting the [`Unit`].
    pub tenant_id: user::Id,

    /// Booked [`Period`] of calendar dates.
    pub period: Period,

    /// Total price fixed at creation and never recomputed.
    pub total_price: Money,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`PaymentStatus`] of this [`Booking`].
    pub payment_status: PaymentStatus,

    /// [`PaymentMethod`] the tenant intends to pay with.
    pub payment_method: PaymentMethod,

    /// ID of the [`User`] who attested an offline payment, if any.
    pub offline_verified_by: Option<user::Id>,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl Booking {
    /// Confirms this [`Booking`] without touching its payment.
    ///
    /// # Errors
    ///
    /// If this [`Booking`] is rejected or cancelled.
    pub fn accept(&mut self) -> Result<Outcome, InvalidTransition> {
        self.transit(Status::Confirmed)
    }

    /// Rejects this [`Booking`].
    ///
    /// # Errors
    ///
    /// If this [`Booking`] is confirmed or cancelled.
    pub fn reject(&mut self) -> Result<Outcome, InvalidTransition> {
        self.transit(Status::Rejected)
    }

    /// Marks this waiting [`Booking`] as confirmed and paid.
    ///
    /// The `verified_by` [`User`] is recorded for offline confirmations. A
    /// confirmed [`Booking`] is left untouched, even if it was confirmed by
    /// [`Booking::accept()`] and is not paid.
    ///
    /// # Errors
    ///
    /// If this [`Booking`] is rejected, cancelled, or its payment is not
    /// pending.
    pub fn settle(
        &mut self,
        verified_by: Option<user::Id>,
    ) -> Result<Outcome, InvalidTransition> {
        use PaymentStatus as P;
        use Status as S;

        match (self.status, self.payment_status) {
            (S::Confirmed, _) => Ok(Outcome::Unchanged),
            (S::Waiting, P::Pending) => {
                self.status = S::Confirmed;
                self.payment_status = P::Paid;
                self.offline_verified_by = verified_by;
                self.touch();
                Ok(Outcome::Applied)
            }
            (from @ S::Waiting, P::Paid | P::Cancelled)
            | (from @ (S::Rejected | S::Cancelled), _) => {
                Err(InvalidTransition {
                    from,
                    to: S::Confirmed,
                })
            }
        }
    }

    /// Moves this [`Booking`] from [`Status::Waiting`] into the provided
    /// terminal [`Status`].
    fn transit(&mut self, to: Status) -> Result<Outcome, InvalidTransition> {
        match self.status {
            from if from == to => Ok(Outcome::Unchanged),
            Status::Waiting => {
                self.status = to;
                self.touch();
                Ok(Outcome::Applied)
            }
            from @ (Status::Confirmed | Status::Rejected | Status::Cancelled) => {
                Err(InvalidTransition { from, to })
            }
        }
    }

    /// Bumps the modification [`DateTime`] of this [`Booking`].
    fn touch(&mut self) {
        self.updated_at = DateTime::now().coerce();
    }
}

/// ID of a [`Booking`].
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
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "Awaiting a decision of the [`Unit`] owner."]
        Waiting = 1,

        #[doc = "Accepted by the [`Unit`] owner."]
        Confirmed = 2,

        #[doc = "Declined by the [`Unit`] owner."]
        Rejected = 3,

        #[doc = "Withdrawn."]
        Cancelled = 4,
    }
}

impl Status {
    /// Indicates whether this [`Status`] is final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Waiting)
    }
}

define_kind! {
    #[case = "snake_case"]
    #[doc = "Payment status of a [`Booking`]."]
    enum PaymentStatus {
        #[doc = "Not paid yet."]
        Pending = 1,

        #[doc = "Paid in full."]
        Paid = 2,

        #[doc = "Will not be paid."]
        Cancelled = 3,
    }
}

define_kind! {
    #[case = "snake_case"]
    #[doc = "Way a tenant intends to pay for a [`Booking`]."]
    enum PaymentMethod {
        #[doc = "Through the platform."]
        Online = 1,

        #[doc = "Directly to the [`Unit`] owner."]
        Offline = 2,
    }
}

/// Outcome of a [`Booking`] transition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The [`Booking`] was modified and must be persisted.
    Applied,

    /// The [`Booking`] was already in the target state.
    Unchanged,
}

/// Error of a forbidden [`Booking`] transition.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("`Booking` cannot transition from `{from}` to `{to}`")]
pub struct InvalidTransition {
    /// [`Status`] the [`Booking`] is in.
    pub from: Status,

    /// [`Status`] the transition leads to.
    pub to: Status,
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, marker::Creation)>;

/// [`DateTime`] when a [`Booking`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Booking, marker::Modification)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money, Period};
    use rust_decimal_macros::dec;

    use crate::domain::{unit, user};

    use super::{
        Booking, Id, InvalidTransition, Outcome, PaymentMethod,
        PaymentStatus, Status,
    };

    fn booking(status: Status, payment_status: PaymentStatus) -> Booking {
        Booking {
            id: Id::new(),
            unit_id: unit::Id::new(),
            tenant_id: user::Id::new(),
            period: Period::new(
                "2025-01-01".parse().unwrap(),
                "2025-03-01".parse().unwrap(),
            )
            .unwrap(),
            total_price: Money {
                amount: dec!(2200000),
                currency: Currency::Idr,
            },
            status,
            payment_status,
            payment_method: PaymentMethod::Offline,
            offline_verified_by: None,
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn accepts_waiting_once() {
        let mut b = booking(Status::Waiting, PaymentStatus::Pending);

        assert_eq!(b.accept(), Ok(Outcome::Applied));
        assert_eq!(b.status, Status::Confirmed);
        assert_eq!(b.payment_status, PaymentStatus::Pending);

        assert_eq!(b.accept(), Ok(Outcome::Unchanged));
        assert_eq!(
            b.reject(),
            Err(InvalidTransition {
                from: Status::Confirmed,
                to: Status::Rejected,
            }),
        );
    }

    #[test]
    fn rejected_is_final() {
        let mut b = booking(Status::Waiting, PaymentStatus::Pending);

        assert_eq!(b.reject(), Ok(Outcome::Applied));
        assert_eq!(b.reject(), Ok(Outcome::Unchanged));
        assert!(b.accept().is_err());
        assert!(b.settle(None).is_err());
        assert_eq!(b.status, Status::Rejected);
    }

    #[test]
    fn settles_waiting_booking() {
        let verifier = user::Id::new();
        let mut b = booking(Status::Waiting, PaymentStatus::Pending);

        assert_eq!(b.settle(Some(verifier)), Ok(Outcome::Applied));
        assert_eq!(b.status, Status::Confirmed);
        assert_eq!(b.payment_status, PaymentStatus::Paid);
        assert_eq!(b.offline_verified_by, Some(verifier));
    }

    #[test]
    fn accepted_booking_is_not_settled() {
        let mut b = booking(Status::Waiting, PaymentStatus::Pending);
        _ = b.accept().unwrap();
        let accepted = b.clone();

        assert_eq!(b.settle(Some(user::Id::new())), Ok(Outcome::Unchanged));
        assert_eq!(b, accepted);
        assert_eq!(b.payment_status, PaymentStatus::Pending);
        assert_eq!(b.offline_verified_by, None);
    }

    #[test]
    fn settling_twice_is_unchanged() {
        let first = user::Id::new();
        let mut b = booking(Status::Waiting, PaymentStatus::Pending);
        _ = b.settle(Some(first)).unwrap();
        let settled = b.clone();

        assert_eq!(b.settle(Some(user::Id::new())), Ok(Outcome::Unchanged));
        assert_eq!(b, settled);
        assert_eq!(b.offline_verified_by, Some(first));
    }

    #[test]
    fn cancelled_payment_cannot_settle() {
        let mut b = booking(Status::Waiting, PaymentStatus::Cancelled);

        assert_eq!(
            b.settle(None),
            Err(InvalidTransition {
                from: Status::Waiting,
                to: Status::Confirmed,
            }),
        );
    }

    #[test]
    fn terminal_statuses() {
        assert!(!Status::Waiting.is_terminal());
        assert!(Status::Confirmed.is_terminal());
        assert!(Status::Rejected.is_terminal());
        assert!(Status::Cancelled.is_terminal());
    }
}
