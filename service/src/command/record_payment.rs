//! [`Command`] for recording a [`Payment`].

use common::{
    operations::{
        Acquire, By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        booking, payment, unit, user, Booking, Payment, RentalHistory, Unit,
        User,
    },
    infra::{database, Database},
    Service,
};

use super::{settle_booking, Command};

/// [`Command`] for recording an attempt to pay for a [`Booking`].
///
/// The [`Payment`] is always stored first, whatever its [`payment::Status`]
/// and whether its [`Booking`] exists. A [`payment::Status::Confirmed`]
/// [`Payment`] then settles its [`Booking`] the same way an offline
/// confirmation does, labelling the [`RentalHistory`] with the
/// [`payment::Method`] of this [`Payment`].
#[derive(Clone, Debug)]
pub struct RecordPayment {
    /// ID of the [`Booking`] being paid for.
    pub booking_id: booking::Id,

    /// [`payment::Method`] of the [`Payment`].
    pub method: payment::Method,

    /// Paid amount.
    pub amount: Money,

    /// [`payment::Proof`] of the [`Payment`].
    pub proof: Option<payment::Proof>,

    /// [`payment::Status`] of the [`Payment`].
    pub status: payment::Status,

    /// ID of the [`User`] who confirmed the [`Payment`], if any.
    pub confirmed_by: Option<user::Id>,
}

/// Output of [`RecordPayment`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Recorded [`Payment`].
    pub payment: Payment,

    /// Confirmed [`Booking`], if the [`Payment`] is confirmed.
    pub booking: Option<Booking>,

    /// [`RentalHistory`] of the confirmed [`Booking`], if it was settled.
    pub rental_history: Option<RentalHistory>,
}

impl<Db> Command<RecordPayment> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<Payment>, Err = Traced<database::Error>>
        + Database<Transact, Err = Traced<database::Error>>,
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
        cmd: RecordPayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordPayment {
            booking_id,
            method,
            amount,
            proof,
            status,
            confirmed_by,
        } = cmd;

        if let Some(user_id) = confirmed_by {
            self.database()
                .execute(Select(By::<Option<User>, _>::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }

        let now = DateTime::now();
        let confirmed = status == payment::Status::Confirmed;
        let payment = Payment {
            id: payment::Id::new(),
            booking_id,
            method,
            amount,
            proof,
            status,
            confirmed_by,
            paid_at: confirmed.then(|| now.coerce()),
            created_at: now.coerce(),
        };

        self.database()
            .execute(Insert(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            payment.id = %payment.id,
            booking.id = %booking_id,
            payment.status = %status,
            "`Payment` recorded",
        );

        if !confirmed {
            return Ok(Output {
                payment,
                booking: None,
                rental_history: None,
            });
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let (booking, rental_history) =
            settle_booking::settle(&tx, booking_id, None, method)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .inspect_err(|e| {
                    tracing::warn!(
                        payment.id = %payment.id,
                        booking.id = %booking_id,
                        "confirmed `Payment` recorded without settling its \
                         `Booking`: {e}",
                    );
                })?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Output {
            payment,
            booking: Some(booking),
            rental_history,
        })
    }
}

/// Error of [`RecordPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Booking`] cannot be settled from its current state.
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
        money::Currency,
        operations::{By, Select},
        Money, Percent,
    };
    use rust_decimal_macros::dec;

    use crate::{
        command::{fixture, AcceptBooking, CreateBooking, RejectBooking},
        domain::{
            booking::{self, PaymentMethod, PaymentStatus, Status},
            payment,
            user::Role,
            Booking, Payment, RentalHistory,
        },
        infra::{Database as _, Memory},
        read, Command as _, Service,
    };

    use super::{ExecutionError, RecordPayment};

    fn cmd(booking_id: booking::Id, status: payment::Status) -> RecordPayment {
        RecordPayment {
            booking_id,
            method: payment::Method::Transfer,
            amount: Money {
                amount: dec!(2200000),
                currency: Currency::Idr,
            },
            proof: payment::Proof::new("https://bank.example/receipt/42"),
            status,
            confirmed_by: None,
        }
    }

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
                payment_method: PaymentMethod::Online,
                discount_code: None,
            })
            .await
            .unwrap()
            .booking
    }

    async fn stored_payments(
        service: &Service<Memory>,
        booking_id: booking::Id,
    ) -> Vec<Payment> {
        service
            .database()
            .execute(Select(By::<Vec<Payment>, _>::new(booking_id)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn confirmed_payment_settles_booking() {
        let service = fixture::service();
        let booking = requested_booking(&service).await;

        let pending = service
            .execute(cmd(booking.id, payment::Status::Pending))
            .await
            .unwrap();
        assert!(pending.booking.is_none());
        assert!(pending.payment.paid_at.is_none());

        let confirmed = service
            .execute(cmd(booking.id, payment::Status::Confirmed))
            .await
            .unwrap();
        assert!(confirmed.payment.paid_at.is_some());
        let settled = confirmed.booking.unwrap();
        let history = confirmed.rental_history.unwrap();
        assert_eq!(settled.status, Status::Confirmed);
        assert_eq!(settled.payment_status, PaymentStatus::Paid);
        assert_eq!(settled.offline_verified_by, None);
        assert_eq!(history.payment_method, payment::Method::Transfer);
        assert_eq!(history.total_paid, booking.total_price);

        let stored = service
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, settled);
        let stored = service
            .database()
            .execute(Select(By::<Option<Payment>, _>::new(
                confirmed.payment.id,
            )))
            .await
            .unwrap();
        assert_eq!(stored, Some(confirmed.payment));
    }

    #[tokio::test]
    async fn pending_payment_may_reference_missing_booking() {
        let service = fixture::service();

        let out = service
            .execute(cmd(booking::Id::new(), payment::Status::Failed))
            .await
            .unwrap();

        assert!(out.booking.is_none());
        assert_eq!(
            stored_payments(&service, out.payment.booking_id).await,
            vec![out.payment],
        );
    }

    #[tokio::test]
    async fn confirmed_payment_is_kept_without_booking() {
        let service = fixture::service();
        let booking_id = booking::Id::new();

        let err = service
            .execute(cmd(booking_id, payment::Status::Confirmed))
            .await
            .unwrap_err()
            .into_inner();
        assert!(matches!(err, ExecutionError::BookingNotExists(_)));

        let payments = stored_payments(&service, booking_id).await;
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status, payment::Status::Confirmed);

        let histories = service
            .database()
            .execute(Select(By::<Vec<RentalHistory>, _>::new(
                read::rental_history::list::Filter::default(),
            )))
            .await
            .unwrap();
        assert!(histories.is_empty());
    }

    #[tokio::test]
    async fn confirmed_payment_is_kept_for_rejected_booking() {
        let service = fixture::service();
        let booking = requested_booking(&service).await;
        _ = service
            .execute(RejectBooking {
                booking_id: booking.id,
            })
            .await
            .unwrap();

        let err = service
            .execute(cmd(booking.id, payment::Status::Confirmed))
            .await
            .unwrap_err()
            .into_inner();
        assert!(matches!(err, ExecutionError::InvalidTransition(_)));

        assert_eq!(stored_payments(&service, booking.id).await.len(), 1);
        let stored = service
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, Status::Rejected);
        assert_eq!(stored.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn confirmed_payment_leaves_accepted_booking_unpaid() {
        let service = fixture::service();
        let booking = requested_booking(&service).await;
        _ = service
            .execute(AcceptBooking {
                booking_id: booking.id,
            })
            .await
            .unwrap();

        let out = service
            .execute(cmd(booking.id, payment::Status::Confirmed))
            .await
            .unwrap();

        let accepted = out.booking.unwrap();
        assert_eq!(accepted.status, Status::Confirmed);
        assert_eq!(accepted.payment_status, PaymentStatus::Pending);
        assert!(out.rental_history.is_none());
        assert_eq!(stored_payments(&service, booking.id).await.len(), 1);
    }

    #[tokio::test]
    async fn tenant_may_confirm_payment() {
        let service = fixture::service();
        let booking = requested_booking(&service).await;

        let out = service
            .execute(RecordPayment {
                confirmed_by: Some(booking.tenant_id),
                ..cmd(booking.id, payment::Status::Confirmed)
            })
            .await
            .unwrap();

        assert_eq!(out.payment.confirmed_by, Some(booking.tenant_id));
        assert_eq!(out.booking.unwrap().payment_status, PaymentStatus::Paid);
        assert!(out.rental_history.is_some());
    }

    #[tokio::test]
    async fn fails_on_unknown_confirmer() {
        let service = fixture::service();
        let booking = requested_booking(&service).await;

        let err = service
            .execute(RecordPayment {
                confirmed_by: Some(crate::domain::user::Id::new()),
                ..cmd(booking.id, payment::Status::Confirmed)
            })
            .await
            .unwrap_err()
            .into_inner();

        assert!(matches!(err, ExecutionError::UserNotExists(_)));
        assert!(stored_payments(&service, booking.id).await.is_empty());
    }
}
