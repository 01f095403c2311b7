//! [`Command`] for booking a [`Unit`].

use common::{
    operations::{Acquire, By, Commit, Insert, Select, Transact, Transacted},
    Date, DateTime, Period,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::pricing::PROMO_CODE;
use crate::{
    domain::{
        booking::{self, PaymentMethod, PaymentStatus, Status},
        pricing::{self, Quote},
        unit, user, Booking, Unit,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for booking a [`Unit`] by a tenant.
///
/// The [`Unit`] is taken off the market as soon as the [`Booking`] is
/// requested.
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// ID of the [`Unit`] to be booked.
    pub unit_id: unit::Id,

    /// ID of the tenant booking the [`Unit`].
    pub tenant_id: user::Id,

    /// First booked [`Date`].
    pub start_date: Date,

    /// Last booked [`Date`].
    pub end_date: Date,

    /// [`PaymentMethod`] the tenant intends to pay with.
    pub payment_method: PaymentMethod,

    /// Promotional code, see [`PROMO_CODE`].
    ///
    /// Unknown codes are ignored.
    pub discount_code: Option<String>,
}

/// Output of [`CreateBooking`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Created [`Booking`].
    pub booking: Booking,

    /// Price breakdown of the created [`Booking`].
    pub quote: Quote,
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Acquire<By<Unit, unit::Id>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            unit_id,
            tenant_id,
            start_date,
            end_date,
            payment_method,
            discount_code,
        } = cmd;

        let period = Period::new(start_date, end_date)
            .ok_or(E::ReversedPeriod {
                start: start_date,
                end: end_date,
            })
            .map_err(tracerr::wrap!())?;

        let unit = self
            .database()
            .execute(Select(By::<Option<Unit>, _>::new(unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(unit_id))
            .map_err(tracerr::wrap!())?;

        let discount = discount_code
            .as_deref()
            .and_then(pricing::promo_discount)
            .unwrap_or(unit.discount_percent);
        let quote = pricing::quote(
            unit.price,
            unit.rental_type,
            period,
            discount,
            self.config().negative_total,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let now = DateTime::now();
        let booking = Booking {
            id: booking::Id::new(),
            unit_id,
            tenant_id,
            period,
            total_price: quote.total,
            status: Status::Waiting,
            payment_status: PaymentStatus::Pending,
            payment_method,
            offline_verified_by: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Checking and taking the `Unit` is a single conditional write, so
        // concurrent requests cannot both book it.
        let acquired = tx
            .execute(Acquire(By::<Unit, _>::new(unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !acquired {
            return Err(tracerr::new!(E::UnitUnavailable(unit_id)));
        }

        tx.execute(Insert(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            booking.id = %booking.id,
            unit.id = %unit_id,
            tenant.id = %tenant_id,
            total = %booking.total_price,
            "`Booking` requested",
        );

        Ok(Output { booking, quote })
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Booked [`Period`] cannot be billed.
    #[display("{_0}")]
    #[from]
    InvalidDateRange(pricing::InvalidDateRange),

    /// Booked [`Period`] ends before it starts.
    #[display("Booked period `{start}..{end}` ends before it starts")]
    ReversedPeriod {
        /// Requested first [`Date`].
        start: Date,

        /// Requested last [`Date`].
        end: Date,
    },

    /// [`Unit`] with the provided ID does not exist.
    #[display("`Unit(id: {_0})` does not exist")]
    UnitNotExists(#[error(not(source))] unit::Id),

    /// [`Unit`] is booked or rented already.
    #[display("`Unit(id: {_0})` is not available")]
    UnitUnavailable(#[error(not(source))] unit::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select},
        Percent,
    };
    use rust_decimal_macros::dec;

    use crate::{
        command::fixture,
        domain::{
            booking::{PaymentMethod, PaymentStatus, Status},
            unit,
            user::{self, Role},
            Unit,
        },
        infra::Database as _,
        Command as _,
    };

    use super::{CreateBooking, ExecutionError};

    fn cmd(unit_id: unit::Id, tenant_id: user::Id) -> CreateBooking {
        CreateBooking {
            unit_id,
            tenant_id,
            start_date: "2025-01-01".parse().unwrap(),
            end_date: "2025-03-01".parse().unwrap(),
            payment_method: PaymentMethod::Offline,
            discount_code: None,
        }
    }

    #[tokio::test]
    async fn prices_booking_and_takes_unit() {
        let service = fixture::service();
        let owner = fixture::user(&service, Role::Owner).await;
        let tenant = fixture::user(&service, Role::Tenant).await;
        let unit = fixture::unit(&service, owner.id, dec!(1000000), Percent::ZERO)
            .await;

        let out = service.execute(cmd(unit.id, tenant.id)).await.unwrap();

        assert_eq!(out.quote.duration, 2);
        assert_eq!(out.booking.total_price.amount, dec!(2200000));
        assert_eq!(out.booking.status, Status::Waiting);
        assert_eq!(out.booking.payment_status, PaymentStatus::Pending);

        let unit = service
            .database()
            .execute(Select(By::<Option<Unit>, _>::new(unit.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(!unit.is_available);
    }

    #[tokio::test]
    async fn promo_code_overrides_unit_discount() {
        let service = fixture::service();
        let owner = fixture::user(&service, Role::Owner).await;
        let tenant = fixture::user(&service, Role::Tenant).await;
        let unit = fixture::unit(
            &service,
            owner.id,
            dec!(1000000),
            Percent::new(dec!(50)).unwrap(),
        )
        .await;

        let out = service
            .execute(CreateBooking {
                end_date: "2025-01-15".parse().unwrap(),
                discount_code: Some("promo10".into()),
                ..cmd(unit.id, tenant.id)
            })
            .await
            .unwrap();

        assert_eq!(out.quote.discount.amount, dec!(100000));
        assert_eq!(out.booking.total_price.amount, dec!(1000000));
    }

    #[tokio::test]
    async fn unknown_code_falls_back_to_unit_discount() {
        let service = fixture::service();
        let owner = fixture::user(&service, Role::Owner).await;
        let tenant = fixture::user(&service, Role::Tenant).await;
        let unit = fixture::unit(
            &service,
            owner.id,
            dec!(1000000),
            Percent::new(dec!(50)).unwrap(),
        )
        .await;

        let out = service
            .execute(CreateBooking {
                end_date: "2025-01-15".parse().unwrap(),
                discount_code: Some("PROMO20".into()),
                ..cmd(unit.id, tenant.id)
            })
            .await
            .unwrap();

        assert_eq!(out.quote.discount.amount, dec!(500000));
        assert_eq!(out.booking.total_price.amount, dec!(600000));
    }

    #[tokio::test]
    async fn unavailable_unit_cannot_be_booked_twice() {
        let service = fixture::service();
        let owner = fixture::user(&service, Role::Owner).await;
        let tenant = fixture::user(&service, Role::Tenant).await;
        let unit = fixture::unit(&service, owner.id, dec!(1000), Percent::ZERO)
            .await;
        _ = service.execute(cmd(unit.id, tenant.id)).await.unwrap();

        let err = service
            .execute(cmd(unit.id, tenant.id))
            .await
            .unwrap_err()
            .into_inner();

        assert!(
            matches!(err, ExecutionError::UnitUnavailable(id) if id == unit.id),
            "wrong error: {err}",
        );
    }

    #[tokio::test]
    async fn rejects_unknown_unit_and_reversed_period() {
        let service = fixture::service();
        let tenant = fixture::user(&service, Role::Tenant).await;

        let err = service
            .execute(cmd(unit::Id::new(), tenant.id))
            .await
            .unwrap_err()
            .into_inner();
        assert!(matches!(err, ExecutionError::UnitNotExists(_)));

        let err = service
            .execute(CreateBooking {
                start_date: "2025-03-01".parse().unwrap(),
                end_date: "2025-01-01".parse().unwrap(),
                ..cmd(unit::Id::new(), tenant.id)
            })
            .await
            .unwrap_err()
            .into_inner();
        assert!(matches!(err, ExecutionError::ReversedPeriod { .. }));
    }
}
