//! [`Unit`] endpoints.

use common::{Money, Percent};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, unit, user},
    query, read, Command as _, Query as _,
};

use crate::{
    api::{self, parse, parse_opt, Json, Path},
    define_error, AsError, Context, Error,
};

/// Rentable property listed by an owner.
#[derive(Clone, Debug, Serialize)]
pub struct Unit {
    /// ID of this [`Unit`].
    pub id: unit::Id,

    /// ID of the [`api::User`] owning this [`Unit`].
    pub owner_id: user::Id,

    /// Name of this [`Unit`].
    pub name: String,

    /// Description of this [`Unit`], if any.
    pub description: Option<String>,

    /// Street address of this [`Unit`], if any.
    pub address: Option<String>,

    /// City of this [`Unit`], if any.
    pub city: Option<String>,

    /// Latitude of this [`Unit`] in degrees, if known.
    pub latitude: Option<f64>,

    /// Longitude of this [`Unit`] in degrees, if known.
    pub longitude: Option<f64>,

    /// Price per one [`unit::RentalType`] period.
    pub price: Money,

    /// Discount applied to bookings made without a promotional code.
    pub discount_percent: Percent,

    /// [`unit::RentalType`] this [`Unit`] is billed by.
    pub rental_type: unit::RentalType,

    /// Indicator whether this [`Unit`] can be booked.
    pub is_available: bool,

    /// Indicator whether this [`Unit`] was rented outside the platform.
    pub rented_offline: bool,

    /// Image URL of this [`Unit`], if any.
    pub image: Option<String>,

    /// When this [`Unit`] was listed.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: unit::CreationDateTime,

    /// When this [`Unit`] was last modified.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: unit::ModificationDateTime,
}

impl From<domain::Unit> for Unit {
    fn from(unit: domain::Unit) -> Self {
        let domain::Unit {
            id,
            owner_id,
            name,
            description,
            address,
            city,
            coordinates,
            price,
            discount_percent,
            rental_type,
            is_available,
            rented_offline,
            image,
            created_at,
            updated_at,
        } = unit;

        Self {
            id,
            owner_id,
            name: name.to_string(),
            description: description.map(|d| d.to_string()),
            address: address.map(|a| a.to_string()),
            city: city.map(|c| c.to_string()),
            latitude: coordinates.map(|c| c.latitude()),
            longitude: coordinates.map(|c| c.longitude()),
            price,
            discount_percent,
            rental_type,
            is_available,
            rented_offline,
            image: image.map(|i| i.to_string()),
            created_at,
            updated_at,
        }
    }
}

/// Request of listing a new [`Unit`].
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// Name of the [`Unit`].
    pub name: String,

    /// Description of the [`Unit`].
    pub description: Option<String>,

    /// Street address of the [`Unit`].
    pub address: Option<String>,

    /// City of the [`Unit`].
    pub city: Option<String>,

    /// Latitude in degrees, provided along with the `longitude`.
    pub latitude: Option<f64>,

    /// Longitude in degrees, provided along with the `latitude`.
    pub longitude: Option<f64>,

    /// Price per one `rental_type` period, like `1500000IDR`.
    pub price: Money,

    /// Discount applied to bookings made without a promotional code.
    #[serde(default)]
    pub discount_percent: Percent,

    /// [`unit::RentalType`] the [`Unit`] is billed by.
    pub rental_type: unit::RentalType,

    /// Image URL of the [`Unit`].
    pub image: Option<String>,
}

/// Lists all the [`Unit`]s, newest first.
#[tracing::instrument(
    skip_all,
    fields(api.name = "listUnits", otel.name = api::SPAN_NAME),
)]
pub async fn list(ctx: Context) -> Result<Json<Vec<Unit>>, Error> {
    ctx.service()
        .execute(query::units::List::by(read::unit::list::Filter::default()))
        .await
        .map(|units| Json(units.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}

/// Returns the [`Unit`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `UNIT_NOT_EXISTS` - `Unit` with the provided ID does not exist.
#[tracing::instrument(
    skip_all,
    fields(api.name = "getUnit", otel.name = api::SPAN_NAME, unit_id = %id),
)]
pub async fn get_by_id(
    ctx: Context,
    Path(id): Path<unit::Id>,
) -> Result<Json<Unit>, Error> {
    ctx.service()
        .execute(query::unit::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|unit| Json(unit.into()))
        .ok_or_else(|| api::NotFoundError::Unit.into())
}

/// Lists a new [`Unit`] owned by the authenticated owner.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `INSUFFICIENT_ROLE` - authenticated `User` is not an owner or an admin;
/// - `INVALID_INPUT` - malformed fields or incomplete coordinates.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "createUnit",
        name = %req.name,
        otel.name = api::SPAN_NAME,
        price = %req.price,
    ),
)]
pub async fn create(
    ctx: Context,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Unit>), Error> {
    let session = ctx
        .authorize(&[user::Role::Owner, user::Role::Admin])
        .await?;

    let CreateRequest {
        name,
        description,
        address,
        city,
        latitude,
        longitude,
        price,
        discount_percent,
        rental_type,
        image,
    } = req;
    let coordinates = match (latitude, longitude) {
        (Some(lat), Some(lon)) => Some(
            unit::Coordinates::new(lat, lon).ok_or_else(|| {
                Error::invalid_input(&"coordinates are out of range")
            })?,
        ),
        (None, None) => None,
        (Some(_), None) | (None, Some(_)) => {
            return Err(Error::invalid_input(
                &"`latitude` and `longitude` must be provided together",
            ));
        }
    };

    let unit = ctx
        .service()
        .execute(command::CreateUnit {
            owner_id: session.user_id,
            name: parse("name", &name)?,
            description: parse_opt("description", description.as_deref())?,
            address: parse_opt("address", address.as_deref())?,
            city: parse_opt("city", city.as_deref())?,
            coordinates,
            price,
            discount_percent,
            rental_type,
            image: parse_opt("image", image.as_deref())?,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(unit.into())))
}

/// Marks the [`Unit`] as rented outside the platform, making it
/// unavailable for booking.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - request is not authenticated;
/// - `INSUFFICIENT_ROLE` - authenticated `User` is not an owner or an admin;
/// - `UNIT_NOT_EXISTS` - `Unit` with the provided ID does not exist.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "markUnitRentedOffline",
        otel.name = api::SPAN_NAME,
        unit_id = %id,
    ),
)]
pub async fn mark_rented_offline(
    ctx: Context,
    Path(id): Path<unit::Id>,
) -> Result<Json<Unit>, Error> {
    _ = ctx
        .authorize(&[user::Role::Owner, user::Role::Admin])
        .await?;

    ctx.service()
        .execute(command::MarkUnitRentedOffline { unit_id: id })
        .await
        .map(|unit| Json(unit.into()))
        .map_err(AsError::into_error)
}

impl AsError for command::create_unit::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USER_NOT_OWNER"]
                #[status = FORBIDDEN]
                #[message = "Only owners may list `Unit`s"]
                UserNotOwner,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotOwner(_) => Some(Error::UserNotOwner.into()),
            Self::UserNotExists(_) => None,
        }
    }
}

impl AsError for command::mark_unit_rented_offline::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UnitNotExists(_) => Some(api::NotFoundError::Unit.into()),
        }
    }
}
