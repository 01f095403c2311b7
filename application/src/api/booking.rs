//! [`Booking`] endpoints.

use common::{Date, Money};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, booking, pricing::Quote, unit, user},
    query, read, Command as _, Query as _,
};

use crate::{
    api::{self, Json, Path, Query},
    define_error, AsError, Context, Error,
};

/// Reservation of an [`api::Unit`] by a tenant.
#[derive(Clone, Debug, Serialize)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: booking::Id,

    /// ID of the booked [`api::Unit`].
    pub unit_id: unit::Id,

    /// ID of the renting [`api::User`].
    pub tenant_id: user::Id,

    /// First booked day.
    pub start_date: Date,

    /// Last booked day.
    pub end_date: Date,

    /// Total price fixed at creation.
    pub total_price: Money,

    /// [`booking::Status`] of this [`Booking`].
    pub status: booking::Status,

    /// [`booking::PaymentStatus`] of this [`Booking`].
    pub payment_status: booking::PaymentStatus,

    /// [`booking::PaymentMethod`] the tenant intends to pay with.
    pub payment_method: booking::PaymentMethod,

    /// ID of the [`api::User`] who attested an offline payment, if any.
    pub offline_verified_by: Option<user::Id>,

    /// When this [`Booking`] was requested.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: booking::CreationDateTime,

    /// When this [`Booking`] was last modified.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: booking::ModificationDateTime,
}

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        let domain::Booking {
            id,
            unit_id,
            tenant_id,
            period,
            total_price,
            status,
            payment_status,
            payment_method,
            offline_verified_by,
            created_at,
            updated_at,
        } = booking;

        Self {
            id,
            unit_id,
            tenant_id,
            start_date: period.start(),
            end_date: period.end(),
            total_price,
            status,
            payment_status,
            payment_method,
            offline_verified_by,
            created_at,
            updated_at,
        }
    }
}

/// Request of booking an [`api::Unit`].
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// ID of the [`api::Unit`] to book.
    pub unit_id: unit::Id,

    /// First day to book, as `YYYY-MM-DD`.
    pub start_date: Date,

    /// Last day to book, as `YYYY-MM-DD`.
    pub end_date: Date,

    /// [`booking::PaymentMethod`] to pay with.
    pub payment_method: booking::PaymentMethod,

    /// Promotional code, if any.
    pub discount_code: Option<String>,
}

/// Created [`Booking`] along with its price breakdown.
#[derive(Clone, Debug, Serialize)]
pub struct CreateResponse {
    /// Created [`Booking`].
    pub booking: Booking,

    /// Price breakdown of the [`Booking`].
    pub quote: Quote,
}

/// [`Booking`] confirmed by an offline payment.
#[derive(Clone, Debug, Serialize)]
pub struct ConfirmResponse {
    /// Confirmed [`Booking`].
    pub booking: Booking,

    /// [`api::RentalHistory`] record of the [`Booking`], unless it was
    /// accepted without being paid.
    pub rental_history: Option<api::RentalHistory>,
}

/// Filter of the listed [`Booking`]s.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// ID of the renting [`api::User`].
    pub tenant_id: Option<user::Id>,

    /// [`booking::Status`] of the [`Booking`]s.
    pub status: Option<booking::Status>,
}

/// Books an [`api::Unit`] by the authenticated tenant.
///
/// The [`api::Unit`] becomes unavailable right away.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `INVALID_DATE_RANGE` - booked period is reversed or not billable;
/// - `UNIT_NOT_EXISTS` - `Unit` with the provided ID does not exist;
/// - `UNIT_UNAVAILABLE` - `Unit` is already booked or rented.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "createBooking",
        end_date = %req.end_date,
        otel.name = api::SPAN_NAME,
        start_date = %req.start_date,
        unit_id = %req.unit_id,
    ),
)]
pub async fn create(
    ctx: Context,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<CreateResponse>), Error> {
    let session = ctx.current_session().await?;

    let CreateRequest {
        unit_id,
        start_date,
        end_date,
        payment_method,
        discount_code,
    } = req;
    let command::create_booking::Output { booking, quote } = ctx
        .service()
        .execute(command::CreateBooking {
            unit_id,
            tenant_id: session.user_id,
            start_date,
            end_date,
            payment_method,
            discount_code,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            booking: booking.into(),
            quote,
        }),
    ))
}

/// Lists [`Booking`]s, newest first.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated.
#[tracing::instrument(
    skip_all,
    fields(api.name = "listBookings", otel.name = api::SPAN_NAME),
)]
pub async fn list(
    ctx: Context,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Booking>>, Error> {
    _ = ctx.current_session().await?;

    let ListParams { tenant_id, status } = params;
    ctx.service()
        .execute(query::bookings::List::by(read::booking::list::Filter {
            tenant_id,
            status,
            ..read::booking::list::Filter::default()
        }))
        .await
        .map(|bookings| Json(bookings.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}

/// Returns the [`Booking`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `BOOKING_NOT_EXISTS` - `Booking` with the provided ID does not exist.
#[tracing::instrument(
    skip_all,
    fields(api.name = "getBooking", booking_id = %id, otel.name = api::SPAN_NAME),
)]
pub async fn get_by_id(
    ctx: Context,
    Path(id): Path<booking::Id>,
) -> Result<Json<Booking>, Error> {
    _ = ctx.current_session().await?;

    ctx.service()
        .execute(query::booking::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|booking| Json(booking.into()))
        .ok_or_else(|| api::NotFoundError::Booking.into())
}

/// Accepts the waiting [`Booking`] without touching its payment.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `BOOKING_NOT_EXISTS` - `Booking` with the provided ID does not exist;
/// - `INVALID_TRANSITION` - `Booking` is rejected or cancelled.
#[tracing::instrument(
    skip_all,
    fields(api.name = "acceptBooking", booking_id = %id, otel.name = api::SPAN_NAME),
)]
pub async fn accept(
    ctx: Context,
    Path(id): Path<booking::Id>,
) -> Result<Json<Booking>, Error> {
    _ = ctx.current_session().await?;

    ctx.service()
        .execute(command::AcceptBooking { booking_id: id })
        .await
        .map(|booking| Json(booking.into()))
        .map_err(AsError::into_error)
}

/// Rejects the waiting [`Booking`].
///
/// The booked [`api::Unit`] stays unavailable.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `BOOKING_NOT_EXISTS` - `Booking` with the provided ID does not exist;
/// - `INVALID_TRANSITION` - `Booking` is confirmed or cancelled.
#[tracing::instrument(
    skip_all,
    fields(api.name = "rejectBooking", booking_id = %id, otel.name = api::SPAN_NAME),
)]
pub async fn reject(
    ctx: Context,
    Path(id): Path<booking::Id>,
) -> Result<Json<Booking>, Error> {
    _ = ctx.current_session().await?;

    ctx.service()
        .execute(command::RejectBooking { booking_id: id })
        .await
        .map(|booking| Json(booking.into()))
        .map_err(AsError::into_error)
}

/// Confirms the waiting [`Booking`] as paid outside the platform, attested
/// by the authenticated owner or admin.
///
/// Repeated confirmations return the already confirmed [`Booking`] as is.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `INSUFFICIENT_ROLE` - authenticated `User` is not an owner or an admin;
/// - `BOOKING_NOT_EXISTS` - `Booking` with the provided ID does not exist;
/// - `INVALID_TRANSITION` - `Booking` is rejected or cancelled.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "confirmBookingOffline",
        booking_id = %id,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn confirm_offline(
    ctx: Context,
    Path(id): Path<booking::Id>,
) -> Result<Json<ConfirmResponse>, Error> {
    let session = ctx
        .authorize(&[user::Role::Owner, user::Role::Admin])
        .await?;

    let command::confirm_booking_offline::Output {
        booking,
        rental_history,
    } = ctx
        .service()
        .execute(command::ConfirmBookingOffline {
            booking_id: id,
            verifier_id: session.user_id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(ConfirmResponse {
        booking: booking.into(),
        rental_history: rental_history.map(Into::into),
    }))
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "UNIT_UNAVAILABLE"]
                #[status = CONFLICT]
                #[message = "`Unit` is already booked or rented"]
                UnitUnavailable,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidDateRange(_) | Self::ReversedPeriod { .. } => {
                Some(api::InputError::InvalidDateRange.into())
            }
            Self::UnitNotExists(_) => Some(api::NotFoundError::Unit.into()),
            Self::UnitUnavailable(_) => Some(Error::UnitUnavailable.into()),
        }
    }
}

impl AsError for command::accept_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::BookingNotExists(_) => {
                Some(api::NotFoundError::Booking.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::InvalidTransition(_) => {
                Some(api::InputError::InvalidTransition.into())
            }
        }
    }
}

impl AsError for command::reject_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::BookingNotExists(_) => {
                Some(api::NotFoundError::Booking.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::InvalidTransition(_) => {
                Some(api::InputError::InvalidTransition.into())
            }
        }
    }
}

impl AsError for command::confirm_booking_offline::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::BookingNotExists(_) => {
                Some(api::NotFoundError::Booking.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::InvalidTransition(_) => {
                Some(api::InputError::InvalidTransition.into())
            }
            Self::UserNotExists(_) => None,
        }
    }
}
