//! [`RentalHistory`] endpoints.

use common::{Date, Money};
use serde::{Deserialize, Serialize};
use service::{
    domain::{self, booking, payment, rental_history, unit, user},
    query, read, Query as _,
};

use crate::{
    api::{self, Json, Query},
    AsError, Context, Error,
};

/// Record of a settled [`api::Booking`].
#[derive(Clone, Debug, Serialize)]
pub struct RentalHistory {
    /// ID of this [`RentalHistory`] record.
    pub id: rental_history::Id,

    /// ID of the settled [`api::Booking`].
    pub booking_id: booking::Id,

    /// ID of the rented [`api::Unit`].
    pub unit_id: unit::Id,

    /// ID of the renting [`api::User`].
    pub tenant_id: user::Id,

    /// First rented day.
    pub start_date: Date,

    /// Last rented day.
    pub end_date: Date,

    /// Amount paid for the rent.
    pub total_paid: Money,

    /// [`payment::Method`] the rent was paid with.
    pub payment_method: payment::Method,

    /// When this [`RentalHistory`] record was created.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: rental_history::CreationDateTime,
}

impl From<domain::RentalHistory> for RentalHistory {
    fn from(record: domain::RentalHistory) -> Self {
        let domain::RentalHistory {
            id,
            booking_id,
            unit_id,
            tenant_id,
            period,
            total_paid,
            payment_method,
            created_at,
        } = record;

        Self {
            id,
            booking_id,
            unit_id,
            tenant_id,
            start_date: period.start(),
            end_date: period.end(),
            total_paid,
            payment_method,
            created_at,
        }
    }
}

/// Filter of the listed [`RentalHistory`] records.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// ID of the renting [`api::User`].
    pub tenant_id: Option<user::Id>,
}

/// Lists [`RentalHistory`] records, newest first.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "listRentalHistory",
        otel.name = api::SPAN_NAME,
        tenant_id = ?params.tenant_id,
    ),
)]
pub async fn list(
    ctx: Context,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<RentalHistory>>, Error> {
    _ = ctx.current_session().await?;

    ctx.service()
        .execute(query::rental_histories::List::by(
            read::rental_history::list::Filter {
                tenant_id: params.tenant_id,
            },
        ))
        .await
        .map(|records| Json(records.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}
