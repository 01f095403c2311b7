//! Dashboard endpoints of [`api::Unit`] owners.

use common::{Date, Money, Period};
use serde::{Deserialize, Serialize};
use service::{
    domain::{booking, user},
    query::{self, report},
    read, Query as _,
};

use crate::{
    api::{self, Json, Path, Query},
    AsError, Context, Error,
};

/// Summary of an owner's [`api::Unit`]s and their [`api::Booking`]s.
#[derive(Clone, Debug, Serialize)]
pub struct Stats {
    /// Number of the owner's [`api::Unit`]s.
    pub total_units: usize,

    /// Number of [`api::Booking`]s of the owner's [`api::Unit`]s.
    pub total_bookings: usize,

    /// Sum of confirmed [`api::Booking`] totals, per currency.
    pub total_income: Vec<Money>,
}

/// Income of an owner within a calendar month.
#[derive(Clone, Debug, Serialize)]
pub struct Income {
    /// First day of the month.
    pub start_date: Date,

    /// Last day of the month.
    pub end_date: Date,

    /// Sum of confirmed [`api::Booking`] totals, per currency.
    pub income: Vec<Money>,
}

/// Parameters of the [`income()`] endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct IncomeParams {
    /// Calendar month, as `YYYY-MM`.
    pub period: String,
}

/// Checks that the authenticated [`api::User`] may see the dashboard of the
/// owner with the provided ID.
///
/// Admins may see any dashboard, owners only their own one.
async fn authorize(ctx: &Context, owner_id: user::Id) -> Result<(), Error> {
    let session = ctx
        .authorize(&[user::Role::Owner, user::Role::Admin])
        .await?;
    if session.role != user::Role::Admin && session.user_id != owner_id {
        return Err(api::PrivilegeError::Owner.into());
    }
    Ok(())
}

/// Returns the [`Stats`] of the owner.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `INSUFFICIENT_ROLE` - authenticated `User` is not an owner or an admin;
/// - `NOT_OWNER` - authenticated owner is not the requested one.
#[tracing::instrument(
    skip_all,
    fields(api.name = "ownerStats", otel.name = api::SPAN_NAME, owner_id = %owner_id),
)]
pub async fn stats(
    ctx: Context,
    Path(owner_id): Path<user::Id>,
) -> Result<Json<Stats>, Error> {
    authorize(&ctx, owner_id).await?;

    let report::owner_stats::Output {
        total_units,
        total_bookings,
        total_income,
    } = ctx
        .service()
        .execute(report::OwnerStats { owner_id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Stats {
        total_units,
        total_bookings,
        total_income,
    }))
}

/// Lists the [`api::Unit`]s of the owner, newest first.
///
/// # Errors
///
/// Same as [`stats()`].
#[tracing::instrument(
    skip_all,
    fields(api.name = "ownerUnits", otel.name = api::SPAN_NAME, owner_id = %owner_id),
)]
pub async fn units(
    ctx: Context,
    Path(owner_id): Path<user::Id>,
) -> Result<Json<Vec<api::Unit>>, Error> {
    authorize(&ctx, owner_id).await?;

    ctx.service()
        .execute(query::units::List::by(read::unit::list::Filter {
            owner_id: Some(owner_id),
        }))
        .await
        .map(|units| Json(units.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}

/// Lists all the [`api::Booking`]s of the owner's [`api::Unit`]s, newest
/// first.
///
/// # Errors
///
/// Same as [`stats()`].
#[tracing::instrument(
    skip_all,
    fields(api.name = "ownerBookings", otel.name = api::SPAN_NAME, owner_id = %owner_id),
)]
pub async fn bookings(
    ctx: Context,
    Path(owner_id): Path<user::Id>,
) -> Result<Json<Vec<api::Booking>>, Error> {
    authorize(&ctx, owner_id).await?;
    list_bookings(&ctx, owner_id, None).await
}

/// Lists the waiting [`api::Booking`]s of the owner's [`api::Unit`]s,
/// newest first.
///
/// # Errors
///
/// Same as [`stats()`].
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "ownerPendingBookings",
        otel.name = api::SPAN_NAME,
        owner_id = %owner_id,
    ),
)]
pub async fn pending_bookings(
    ctx: Context,
    Path(owner_id): Path<user::Id>,
) -> Result<Json<Vec<api::Booking>>, Error> {
    authorize(&ctx, owner_id).await?;
    list_bookings(&ctx, owner_id, Some(booking::Status::Waiting)).await
}

/// Returns the [`Income`] of the owner within the requested month.
///
/// # Errors
///
/// Possible error codes, besides the ones of [`stats()`]:
/// - `INVALID_INPUT` - `period` is not a `YYYY-MM` month.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "ownerIncome",
        otel.name = api::SPAN_NAME,
        owner_id = %owner_id,
        period = %params.period,
    ),
)]
pub async fn income(
    ctx: Context,
    Path(owner_id): Path<user::Id>,
    Query(params): Query<IncomeParams>,
) -> Result<Json<Income>, Error> {
    authorize(&ctx, owner_id).await?;

    let period = Period::month(&params.period).map_err(|e| {
        Error::invalid_input(&format!("invalid `period`: {e}"))
    })?;

    let report::income::Output { period, income } = ctx
        .service()
        .execute(report::Income { owner_id, period })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Income {
        start_date: period.start(),
        end_date: period.end(),
        income,
    }))
}

/// Lists the most recently requested [`api::Booking`]s of the owner's
/// [`api::Unit`]s.
///
/// # Errors
///
/// Same as [`stats()`].
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "ownerRecentActivities",
        otel.name = api::SPAN_NAME,
        owner_id = %owner_id,
    ),
)]
pub async fn recent_activities(
    ctx: Context,
    Path(owner_id): Path<user::Id>,
) -> Result<Json<Vec<api::Booking>>, Error> {
    authorize(&ctx, owner_id).await?;

    ctx.service()
        .execute(report::RecentActivities { owner_id })
        .await
        .map(|bookings| Json(bookings.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}

/// Lists the [`api::Booking`]s of the owner's [`api::Unit`]s, optionally
/// filtered by the [`booking::Status`].
async fn list_bookings(
    ctx: &Context,
    owner_id: user::Id,
    status: Option<booking::Status>,
) -> Result<Json<Vec<api::Booking>>, Error> {
    ctx.service()
        .execute(query::bookings::List::by(read::booking::list::Filter {
            owner_id: Some(owner_id),
            status,
            ..read::booking::list::Filter::default()
        }))
        .await
        .map(|bookings| Json(bookings.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}
