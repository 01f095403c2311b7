//! REST API definitions.

pub mod auth;
pub mod booking;
pub mod discount;
pub mod owner;
pub mod payment;
pub mod rental_history;
pub mod unit;
pub mod user;

use std::{fmt, str::FromStr};

use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Router,
};
use serde::Serialize;

use crate::{define_error, Error};

pub use self::{
    booking::Booking, discount::Discount, payment::Payment,
    rental_history::RentalHistory, unit::Unit, user::User,
};

/// Name of the [`tracing::Span`] for the API endpoints.
const SPAN_NAME: &str = "REST API call";

/// Builds the [`Router`] serving the whole REST API under `/api` prefix.
///
/// The [`Service`] is expected to be provided as an [`Extension`].
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
pub fn router() -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/units", get(unit::list).post(unit::create))
        .route("/units/:id", get(unit::get_by_id))
        .route("/units/:id/rented-offline", patch(unit::mark_rented_offline))
        .route("/bookings", get(booking::list).post(booking::create))
        .route("/bookings/:id", get(booking::get_by_id))
        .route("/bookings/:id/accept", put(booking::accept))
        .route("/bookings/:id/reject", put(booking::reject))
        .route(
            "/bookings/:id/confirm-offline",
            patch(booking::confirm_offline),
        )
        .route("/payments", post(payment::create))
        .route("/payments/:id", get(payment::get_by_id))
        .route("/discounts", get(discount::list).post(discount::create))
        .route("/rental-history", get(rental_history::list))
        .route("/owners/:owner_id/stats", get(owner::stats))
        .route("/owners/:owner_id/units", get(owner::units))
        .route("/owners/:owner_id/bookings", get(owner::bookings))
        .route(
            "/owners/:owner_id/bookings/pending",
            get(owner::pending_bookings),
        )
        .route("/owners/:owner_id/income", get(owner::income))
        .route(
            "/owners/:owner_id/activities/recent",
            get(owner::recent_activities),
        );

    Router::new().nest("/api", api)
}

/// JSON request body extractor and response body.
///
/// Rejects malformed bodies with an `INVALID_INPUT` [`Error`].
#[derive(Clone, Copy, Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Path parameters extractor.
///
/// Rejects malformed parameters with an `INVALID_INPUT` [`Error`].
#[derive(Clone, Copy, Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

/// Query string extractor.
///
/// Rejects malformed query strings with an `INVALID_INPUT` [`Error`].
#[derive(Clone, Copy, Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Query<T>(pub T);

/// Parses the `value` of the request `field` into a `T`ype.
///
/// # Errors
///
/// With `INVALID_INPUT` code if the `value` is not a valid `T`.
pub(crate) fn parse<T>(field: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::invalid_input(&format!("invalid `{field}`: {e}")))
}

/// Parses the optional `value` of the request `field` into a `T`ype.
///
/// # Errors
///
/// With `INVALID_INPUT` code if the `value` is present but is not a valid
/// `T`.
pub(crate) fn parse_opt<T>(
    field: &str,
    value: Option<&str>,
) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.map(|v| parse(field, v)).transpose()
}

define_error! {
    enum InputError {
        #[code = "INVALID_DATE_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "Provided date range is invalid"]
        InvalidDateRange,

        #[code = "INVALID_TRANSITION"]
        #[status = BAD_REQUEST]
        #[message = "`Booking` cannot make the requested transition"]
        InvalidTransition,
    }
}

define_error! {
    enum NotFoundError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` does not exist"]
        Booking,

        #[code = "PAYMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Payment` does not exist"]
        Payment,

        #[code = "UNIT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Unit` does not exist"]
        Unit,
    }
}

define_error! {
    enum PrivilegeError {
        #[code = "NOT_OWNER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be the owner"]
        Owner,
    }
}

#[cfg(test)]
mod spec {
    use common::Date;
    use service::domain::user;

    use super::{parse, parse_opt};

    #[test]
    fn parses_fields() {
        let date: Date = parse("start_date", "2025-01-01").unwrap();
        assert_eq!(date.to_string(), "2025-01-01");

        let err = parse::<Date>("start_date", "01/01/2025").unwrap_err();
        assert_eq!(err.code, "INVALID_INPUT");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("`start_date`"), "{}", err.message);
    }

    #[test]
    fn parses_optional_fields() {
        assert_eq!(parse_opt::<user::Phone>("phone", None).unwrap(), None);
        assert!(parse_opt::<user::Phone>("phone", Some("+62 812 3456 789"))
            .unwrap()
            .is_some());
        assert!(parse_opt::<user::Phone>("phone", Some("call me")).is_err());
    }
}
