//! [`Command`] for confirming a [`Booking`] paid outside of the platform.

use common::operations::{
    Acquire, By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, payment, unit, user, Booking, RentalHistory, Unit, User},
    infra::{database, Database},
    Service,
};

use super::{settle_booking, Command};

/// [`Command`] for confirming a [`Booking`] whose payment was attested by
/// the [`Unit`] owner.
///
/// Only a waiting [`Booking`] is settled. Repeating this [`Command`] for a
/// confirmed [`Booking`] changes nothing and returns its existing
/// [`RentalHistory`], if any.
#[derive(Clone, Copy, Debug)]
pub struct ConfirmBookingOffline {
    /// ID of the [`Booking`] to be confirmed.
    pub booking_id: booking::Id,

    /// ID of the [`User`] attesting the payment.
    pub verifier_id: user::Id,
}

/// Output of [`ConfirmBookingOffline`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Confirmed and paid [`Booking`].
    pub booking: Booking,

    /// [`RentalHistory`] of the confirmed [`Booking`].
    ///
    /// [`None`] if the [`Booking`] was accepted without being paid.
    pub rental_history: Option<RentalHistory>,
}

impl<Db> Command<ConfirmBookingOffline> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<
            Acquire<By<Unit, unit::Id>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<RentalHistory>, booking::Id>>,
            Ok = Option<RentalHistory>,
            Err = Traced<database::Error>,
        > + Database<Insert<RentalHistory>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ConfirmBookingOffline,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConfirmBookingOffline {
            booking_id,
            verifier_id,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<User>, _>::new(verifier_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(verifier_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let (booking, rental_history) = settle_booking::settle(
            &tx,
            booking_id,
            Some(verifier_id),
            payment::Method::Offline,
        )
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Output {
            booking,
            rental_history,
        })
    }
}

/// Error of [`ConfirmBookingOffline`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Booking`] cannot be confirmed from its current state.
    #[display("{_0}")]
    InvalidTransition(booking::InvalidTransition),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

impl From<settle_booking::Error> for ExecutionError {
    fn from(e: settle_booking::Error) -> Self {
        use settle_booking::Error as E;

        match e {
            E::BookingNotExists(id) => Self::BookingNotExists(id),
            E::Db(e) => Self::Db(e),
            E::InvalidTransition(e) => Self::InvalidTransition(e),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select},
        Percent,
    };
    use rust_decimal_macros::dec;

    use crate::{
        command::{fixture, AcceptBooking, CreateBooking, RejectBooking},
        domain::{
            booking::{self, PaymentMethod, PaymentStatus, Status},
            payment,
            user::Role,
            Booking, RentalHistory, Unit,
        },
        infra::{Database as _, Memory},
        read, Command as _, Service,
    };

    use super::{ConfirmBookingOffline, ExecutionError};

    async fn requested_booking(service: &Service<Memory>) -> Booking {
        let owner = fixture::user(service, Role::Owner).await;
        let tenant = fixture::user(service, Role::Tenant).await;
        let unit =
            fixture::unit(service, owner.id, dec!(1000000), Percent::ZERO)
                .await;

        service
            .execute(CreateBooking {
                unit_id: unit.id,
                tenant_id: tenant.id,
                start_date: "2025-01-01".parse().unwrap(),
                end_date: "2025-03-01".parse().unwrap(),
                payment_method: PaymentMethod::Offline,
                discount_code: None,
            })
            .await
            .unwrap()
            .booking
    }

    async fn histories(service: &Service<Memory>) -> Vec<RentalHistory> {
        service
            .database()
            .execute(Select(By::<Vec<RentalHistory>, _>::new(
                read::rental_history::list::Filter::default(),
            )))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn creates_single_matching_history() {
        let service = fixture::service();
        let booking = requested_booking(&service).await;
        let verifier = fixture::user(&service, Role::Owner).await;

        let out = service
            .execute(ConfirmBookingOffline {
                booking_id: booking.id,
                verifier_id: verifier.id,
            })
            .await
            .unwrap();

        assert_eq!(out.booking.status, Status::Confirmed);
        assert_eq!(out.booking.payment_status, PaymentStatus::Paid);
        assert_eq!(out.booking.offline_verified_by, Some(verifier.id));

        let history = histories(&service).await;
        assert_eq!(history.len(), 1);
        let h = &history[0];
        assert_eq!(Some(h), out.rental_history.as_ref());
        assert_eq!(h.booking_id, booking.id);
        assert_eq!(h.unit_id, booking.unit_id);
        assert_eq!(h.tenant_id, booking.tenant_id);
        assert_eq!(h.period, booking.period);
        assert_eq!(h.total_paid, booking.total_price);
        assert_eq!(h.payment_method, payment::Method::Offline);

        let unit = service
            .database()
            .execute(Select(By::<Option<Unit>, _>::new(booking.unit_id)))
            .await
            .unwrap()
            .unwrap();
        assert!(!unit.is_available);
    }

    #[tokio::test]
    async fn repeated_confirmation_is_idempotent() {
        let service = fixture::service();
        let booking = requested_booking(&service).await;
        let verifier = fixture::user(&service, Role::Owner).await;
        let cmd = ConfirmBookingOffline {
            booking_id: booking.id,
            verifier_id: verifier.id,
        };

        let first = service.execute(cmd).await.unwrap();
        let second = service.execute(cmd).await.unwrap();

        assert_eq!(first.booking, second.booking);
        assert_eq!(first.rental_history, second.rental_history);
        assert_eq!(histories(&service).await.len(), 1);
    }

    #[tokio::test]
    async fn accepted_booking_stays_untouched() {
        let service = fixture::service();
        let booking = requested_booking(&service).await;
        let verifier = fixture::user(&service, Role::Owner).await;
        let accepted = service
            .execute(AcceptBooking {
                booking_id: booking.id,
            })
            .await
            .unwrap();

        let out = service
            .execute(ConfirmBookingOffline {
                booking_id: booking.id,
                verifier_id: verifier.id,
            })
            .await
            .unwrap();

        assert_eq!(out.booking, accepted);
        assert_eq!(out.booking.status, Status::Confirmed);
        assert_eq!(out.booking.payment_status, PaymentStatus::Pending);
        assert_eq!(out.booking.offline_verified_by, None);
        assert!(out.rental_history.is_none());
        assert!(histories(&service).await.is_empty());

        let stored = service
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking.id)))
            .await
            .unwrap();
        assert_eq!(stored, Some(accepted));
    }

    #[tokio::test]
    async fn rejected_booking_cannot_be_confirmed() {
        let service = fixture::service();
        let booking = requested_booking(&service).await;
        let verifier = fixture::user(&service, Role::Owner).await;
        _ = service
            .execute(RejectBooking {
                booking_id: booking.id,
            })
            .await
            .unwrap();

        let err = service
            .execute(ConfirmBookingOffline {
                booking_id: booking.id,
                verifier_id: verifier.id,
            })
            .await
            .unwrap_err()
            .into_inner();

        assert!(
            matches!(err, ExecutionError::InvalidTransition(_)),
            "wrong error: {err}",
        );
        assert!(histories(&service).await.is_empty());
    }

    #[tokio::test]
    async fn fails_on_unknown_booking_or_verifier() {
        let service = fixture::service();
        let booking = requested_booking(&service).await;
        let verifier = fixture::user(&service, Role::Owner).await;

        let err = service
            .execute(ConfirmBookingOffline {
                booking_id: booking::Id::new(),
                verifier_id: verifier.id,
            })
            .await
            .unwrap_err()
            .into_inner();
        assert!(matches!(err, ExecutionError::BookingNotExists(_)));

        let err = service
            .execute(ConfirmBookingOffline {
                booking_id: booking.id,
                verifier_id: crate::domain::user::Id::new(),
            })
            .await
            .unwrap_err()
            .into_inner();
        assert!(matches!(err, ExecutionError::UserNotExists(_)));
    }
}
