//! [`Payment`] endpoints.

use common::Money;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, booking, payment, user},
    query, Command as _, Query as _,
};

use crate::{
    api::{self, parse_opt, Json, Path},
    define_error, AsError, Context, Error,
};

/// Recorded payment for an [`api::Booking`].
#[derive(Clone, Debug, Serialize)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: payment::Id,

    /// ID of the paid [`api::Booking`].
    pub booking_id: booking::Id,

    /// [`payment::Method`] of this [`Payment`].
    pub method: payment::Method,

    /// Paid amount.
    pub amount: Money,

    /// Reference proving this [`Payment`], if any.
    pub proof: Option<String>,

    /// [`payment::Status`] of this [`Payment`].
    pub status: payment::Status,

    /// ID of the [`api::User`] who confirmed this [`Payment`], if any.
    pub confirmed_by: Option<user::Id>,

    /// When this [`Payment`] was confirmed, as RFC 3339, if it was.
    pub paid_at: Option<String>,

    /// When this [`Payment`] was recorded.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: payment::CreationDateTime,
}

impl From<domain::Payment> for Payment {
    fn from(payment: domain::Payment) -> Self {
        let domain::Payment {
            id,
            booking_id,
            method,
            amount,
            proof,
            status,
            confirmed_by,
            paid_at,
            created_at,
        } = payment;

        Self {
            id,
            booking_id,
            method,
            amount,
            proof: proof.map(|p| p.to_string()),
            status,
            confirmed_by,
            paid_at: paid_at.map(|at| at.to_rfc3339()),
            created_at,
        }
    }
}

/// Request of recording a [`Payment`].
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// ID of the paid [`api::Booking`].
    pub booking_id: booking::Id,

    /// [`payment::Method`] of the [`Payment`].
    pub method: payment::Method,

    /// Paid amount, like `1500000IDR`.
    pub amount: Money,

    /// Reference proving the [`Payment`], like a receipt URL.
    pub proof: Option<String>,

    /// [`payment::Status`] of the [`Payment`], `pending` if omitted.
    pub status: Option<payment::Status>,

    /// ID of the [`api::User`] who confirmed the [`Payment`], if any.
    pub confirmed_by: Option<user::Id>,
}

/// Recorded [`Payment`] along with the settlement it caused, if any.
#[derive(Clone, Debug, Serialize)]
pub struct CreateResponse {
    /// Recorded [`Payment`].
    pub payment: Payment,

    /// Confirmed [`api::Booking`], if the [`Payment`] is confirmed.
    pub booking: Option<api::Booking>,

    /// [`api::RentalHistory`] of the confirmed [`api::Booking`], if it was
    /// settled.
    pub rental_history: Option<api::RentalHistory>,
}

/// Records a [`Payment`] for an [`api::Booking`].
///
/// The [`Payment`] is recorded in any case. A confirmed [`Payment`] then
/// settles its waiting [`api::Booking`].
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `USER_NOT_EXISTS` - `confirmed_by` refers to a missing `User`;
/// - `BOOKING_NOT_EXISTS` - confirmed `Payment` refers to a missing
///                          `Booking`, which is kept unsettled;
/// - `INVALID_TRANSITION` - `Booking` of a confirmed `Payment` is rejected
///                          or cancelled, which is kept unsettled.
#[tracing::instrument(
    skip_all,
    fields(
        amount = %req.amount,
        api.name = "recordPayment",
        booking_id = %req.booking_id,
        otel.name = api::SPAN_NAME,
        status = ?req.status,
    ),
)]
pub async fn create(
    ctx: Context,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<CreateResponse>), Error> {
    _ = ctx.current_session().await?;

    let CreateRequest {
        booking_id,
        method,
        amount,
        proof,
        status,
        confirmed_by,
    } = req;

    let command::record_payment::Output {
        payment,
        booking,
        rental_history,
    } = ctx
        .service()
        .execute(command::RecordPayment {
            booking_id,
            method,
            amount,
            proof: parse_opt("proof", proof.as_deref())?,
            status: status.unwrap_or(payment::Status::Pending),
            confirmed_by,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            payment: payment.into(),
            booking: booking.map(Into::into),
            rental_history: rental_history.map(Into::into),
        }),
    ))
}

/// Returns the [`Payment`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `PAYMENT_NOT_EXISTS` - `Payment` with the provided ID does not exist.
#[tracing::instrument(
    skip_all,
    fields(api.name = "getPayment", otel.name = api::SPAN_NAME, payment_id = %id),
)]
pub async fn get_by_id(
    ctx: Context,
    Path(id): Path<payment::Id>,
) -> Result<Json<Payment>, Error> {
    _ = ctx.current_session().await?;

    ctx.service()
        .execute(query::payment::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|payment| Json(payment.into()))
        .ok_or_else(|| api::NotFoundError::Payment.into())
}

impl AsError for command::record_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USER_NOT_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "Confirming `User` does not exist"]
                UserNotExists,
            }
        }

        match self {
            Self::BookingNotExists(_) => {
                Some(api::NotFoundError::Booking.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::InvalidTransition(_) => {
                Some(api::InputError::InvalidTransition.into())
            }
            Self::UserNotExists(_) => Some(Error::UserNotExists.into()),
        }
    }
}
