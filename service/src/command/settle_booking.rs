//! Settlement of a [`Booking`] shared by [`ConfirmBookingOffline`] and
//! [`RecordPayment`] [`Command`]s.
//!
//! [`Command`]: super::Command
//! [`ConfirmBookingOffline`]: super::ConfirmBookingOffline
//! [`RecordPayment`]: super::RecordPayment

use common::operations::{Acquire, By, Insert, Lock, Select, Update};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

use crate::{
    domain::{
        booking::{self, Outcome},
        payment, unit, user, Booking, RentalHistory, Unit,
    },
    infra::{database, Database},
};

/// Marks the waiting [`Booking`] as confirmed and paid within the provided
/// transaction `tx`, and returns it along with its single [`RentalHistory`].
///
/// A confirmed [`Booking`] is returned as is, along with the
/// [`RentalHistory`] created on its settlement, if it was settled at all.
pub(crate) async fn settle<Tx>(
    tx: &Tx,
    booking_id: booking::Id,
    verified_by: Option<user::Id>,
    method: payment::Method,
) -> Result<(Booking, Option<RentalHistory>), Traced<Error>>
where
    Tx: Database<
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
        > + Database<Insert<RentalHistory>, Err = Traced<database::Error>>,
{
    use Error as E;

    // Avoid concurrent settlements of the same `Booking`.
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

    let history = match booking
        .settle(verified_by)
        .map_err(tracerr::from_and_wrap!(=> E))?
    {
        Outcome::Applied => {
            tx.execute(Update(booking.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            // The `Unit` is normally taken on `Booking` creation already.
            let newly_taken = tx
                .execute(Acquire(By::<Unit, _>::new(booking.unit_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if newly_taken {
                tracing::warn!(
                    booking.id = %booking.id,
                    unit.id = %booking.unit_id,
                    "`Unit` was available while its `Booking` was settled",
                );
            }

            let history = RentalHistory::of(&booking, method);
            tx.execute(Insert(history.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            tracing::info!(
                booking.id = %booking.id,
                %method,
                "`Booking` settled",
            );
            Some(history)
        }
        Outcome::Unchanged => {
            tracing::debug!(
                booking.id = %booking.id,
                booking.payment_status = %booking.payment_status,
                "`Booking` is confirmed already",
            );
            tx.execute(Select(By::<Option<RentalHistory>, _>::new(booking_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
        }
    };

    Ok((booking, history))
}

/// Error of a [`Booking`] settlement.
#[derive(Debug, Display, From, StdError)]
pub(crate) enum Error {
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
}
