//! [`Command`] for accepting a [`Booking`].

use common::operations::{By, Commit, Lock, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::booking::Status;
use crate::{
    domain::{booking, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for accepting a [`Booking`] by the owner of its [`Unit`].
///
/// Moves the [`Booking`] to [`Status::Confirmed`] without touching its
/// payment, so no [`RentalHistory`] is created.
///
/// [`RentalHistory`]: crate::domain::RentalHistory
/// [`Unit`]: crate::domain::Unit
#[derive(Clone, Copy, Debug)]
pub struct AcceptBooking {
    /// ID of the [`Booking`] to be accepted.
    pub booking_id: booking::Id,
}

impl<Db> Command<AcceptBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AcceptBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AcceptBooking { booking_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::<Booking, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        match booking.accept().map_err(tracerr::from_and_wrap!(=> E))? {
            booking::Outcome::Applied => {
                tx.execute(Update(booking.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                tx.execute(Commit)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;

                tracing::info!(booking.id = %booking_id, "`Booking` accepted");
            }
            booking::Outcome::Unchanged => {
                tracing::debug!(
                    booking.id = %booking_id,
                    "`Booking` is accepted already",
                );
            }
        }

        Ok(booking)
    }
}

/// Error of [`AcceptBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Booking`] cannot be accepted from its current [`Status`].
    #[display("{_0}")]
    InvalidTransition(booking::InvalidTransition),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select},
        Percent,
    };
    use rust_decimal_macros::dec;

    use crate::{
        command::{fixture, CreateBooking},
        domain::{
            booking::{self, PaymentMethod, PaymentStatus, Status},
            user::Role,
            RentalHistory,
        },
        infra::Database as _,
        Command as _,
    };

    use super::{AcceptBooking, ExecutionError};

    #[tokio::test]
    async fn confirms_without_settling() {
        let service = fixture::service();
        let owner = fixture::user(&service, Role::Owner).await;
        let tenant = fixture::user(&service, Role::Tenant).await;
        let unit =
            fixture::unit(&service, owner.id, dec!(1000), Percent::ZERO).await;
        let booking = service
            .execute(CreateBooking {
                unit_id: unit.id,
                tenant_id: tenant.id,
                start_date: "2025-01-01".parse().unwrap(),
                end_date: "2025-01-31".parse().unwrap(),
                payment_method: PaymentMethod::Online,
                discount_code: None,
            })
            .await
            .unwrap()
            .booking;

        let accepted = service
            .execute(AcceptBooking {
                booking_id: booking.id,
            })
            .await
            .unwrap();
        assert_eq!(accepted.status, Status::Confirmed);
        assert_eq!(accepted.payment_status, PaymentStatus::Pending);

        let history = service
            .database()
            .execute(Select(By::<Option<RentalHistory>, _>::new(booking.id)))
            .await
            .unwrap();
        assert!(history.is_none());

        let again = service
            .execute(AcceptBooking {
                booking_id: booking.id,
            })
            .await
            .unwrap();
        assert_eq!(again.status, Status::Confirmed);
        assert_eq!(again.updated_at, accepted.updated_at);
    }

    #[tokio::test]
    async fn fails_on_unknown_booking() {
        let service = fixture::service();

        let err = service
            .execute(AcceptBooking {
                booking_id: booking::Id::new(),
            })
            .await
            .unwrap_err()
            .into_inner();

        assert!(matches!(err, ExecutionError::BookingNotExists(_)));
    }
}
