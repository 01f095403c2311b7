//! [`Discount`] endpoints.

use common::{Date, Percent, Period};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, discount, unit, user},
    query, read, Command as _, Query as _,
};

use crate::{
    api::{self, parse, Json},
    AsError, Context, Error,
};

/// Time-limited discount announced by an owner for an [`api::Unit`].
#[derive(Clone, Debug, Serialize)]
pub struct Discount {
    /// ID of this [`Discount`].
    pub id: discount::Id,

    /// ID of the discounted [`api::Unit`].
    pub unit_id: unit::Id,

    /// ID of the announcing [`api::User`].
    pub owner_id: user::Id,

    /// Name of this [`Discount`].
    pub name: String,

    /// Discount rate.
    pub percent: Percent,

    /// First day this [`Discount`] is valid on.
    pub start_date: Date,

    /// Last day this [`Discount`] is valid on.
    pub end_date: Date,

    /// Indicator whether this [`Discount`] is switched on.
    pub is_active: bool,

    /// When this [`Discount`] was created.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: discount::CreationDateTime,

    /// When this [`Discount`] was last modified.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: discount::ModificationDateTime,
}

impl From<domain::Discount> for Discount {
    fn from(discount: domain::Discount) -> Self {
        let domain::Discount {
            id,
            unit_id,
            owner_id,
            name,
            percent,
            period,
            is_active,
            created_at,
            updated_at,
        } = discount;

        Self {
            id,
            unit_id,
            owner_id,
            name: name.to_string(),
            percent,
            start_date: period.start(),
            end_date: period.end(),
            is_active,
            created_at,
            updated_at,
        }
    }
}

/// Request of announcing a new [`Discount`].
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// ID of the discounted [`api::Unit`].
    pub unit_id: unit::Id,

    /// Name of the [`Discount`].
    pub name: String,

    /// Discount rate.
    pub percent: Percent,

    /// First day the [`Discount`] is valid on, as `YYYY-MM-DD`.
    pub start_date: Date,

    /// Last day the [`Discount`] is valid on, as `YYYY-MM-DD`.
    pub end_date: Date,

    /// Indicator whether the [`Discount`] is switched on.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Default of the [`CreateRequest::is_active`] field.
const fn default_active() -> bool {
    true
}

/// Announces a new [`Discount`] by the authenticated owner.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `INVALID_DATE_RANGE` - validity period ends before it starts;
/// - `UNIT_NOT_EXISTS` - `Unit` with the provided ID does not exist.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "createDiscount",
        otel.name = api::SPAN_NAME,
        percent = %req.percent,
        unit_id = %req.unit_id,
    ),
)]
pub async fn create(
    ctx: Context,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Discount>), Error> {
    let session = ctx.current_session().await?;

    let CreateRequest {
        unit_id,
        name,
        percent,
        start_date,
        end_date,
        is_active,
    } = req;
    let period = Period::new(start_date, end_date)
        .ok_or_else(|| Error::from(api::InputError::InvalidDateRange))?;

    let discount = ctx
        .service()
        .execute(command::CreateDiscount {
            unit_id,
            owner_id: session.user_id,
            name: parse("name", &name)?,
            percent,
            period,
            is_active,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(discount.into())))
}

/// Lists the active [`Discount`]s of the authenticated owner, newest first.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated.
#[tracing::instrument(
    skip_all,
    fields(api.name = "listDiscounts", otel.name = api::SPAN_NAME),
)]
pub async fn list(ctx: Context) -> Result<Json<Vec<Discount>>, Error> {
    let session = ctx.current_session().await?;

    ctx.service()
        .execute(query::discounts::List::by(read::discount::list::Filter {
            owner_id: Some(session.user_id),
            active_only: true,
            effective_on: None,
        }))
        .await
        .map(|discounts| {
            Json(discounts.into_iter().map(Into::into).collect())
        })
        .map_err(AsError::into_error)
}

impl AsError for command::create_discount::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UnitNotExists(_) => Some(api::NotFoundError::Unit.into()),
        }
    }
}
