//! [`Unit`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, marker, DateTimeOf, Money, Percent};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::{Booking, User};

/// Rentable property listed by an owner.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    /// ID of this [`Unit`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Unit`].
    pub owner_id: user::Id,

    /// [`Name`] of this [`Unit`].
    pub name: Name,

    /// [`Description`] of this [`Unit`].
    pub description: Option<Description>,

    /// [`Address`] of this [`Unit`].
    pub address: Option<Address>,

    /// [`City`] this [`Unit`] is located in.
    pub city: Option<City>,

    /// Geographic [`Coordinates`] of this [`Unit`].
    pub coordinates: Option<Coordinates>,

    /// Price of this [`Unit`] per one [`RentalType`] period.
    pub price: Money,

    /// Static discount applied to every [`Booking`] of this [`Unit`] made
    /// without a promotional code.
    pub discount_percent: Percent,

    /// [`RentalType`] this [`Unit`] is billed by.
    pub rental_type: RentalType,

    /// Indicator whether this [`Unit`] can be booked.
    pub is_available: bool,

    /// Indicator whether this [`Unit`] was rented outside of the platform.
    pub rented_offline: bool,

    /// [`Image`] of this [`Unit`].
    pub image: Option<Image>,

    /// [`DateTime`] when this [`Unit`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Unit`] was last modified.
    pub updated_at: ModificationDateTime,
}

/// ID of a [`Unit`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[case = "snake_case"]
    #[doc = "Billing period of a [`Unit`]."]
    enum RentalType {
        #[doc = "Billed per started calendar month."]
        Monthly = 1,

        #[doc = "Billed per started calendar year."]
        Yearly = 2,
    }
}

define_text! {
    #[doc = "Name of a [`Unit`]."]
    Name(max = 256)
}

define_text! {
    #[doc = "Free-form description of a [`Unit`]."]
    Description(max = 4096)
}

define_text! {
    #[doc = "Street address of a [`Unit`]."]
    Address(max = 1024)
}

define_text! {
    #[doc = "City a [`Unit`] is located in."]
    City(max = 128)
}

define_text! {
    #[doc = "URL of a [`Unit`] image."]
    Image(max = 2048)
}

/// Geographic coordinates in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    /// Latitude in `-90..=90` range.
    latitude: f64,

    /// Longitude in `-180..=180` range.
    longitude: f64,
}

impl Coordinates {
    /// Creates new [`Coordinates`] if both components are in range.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        ((-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude))
        .then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Returns the latitude of these [`Coordinates`].
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude of these [`Coordinates`].
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// [`DateTime`] when a [`Unit`] was created.
pub type CreationDateTime = DateTimeOf<(Unit, marker::Creation)>;

/// [`DateTime`] when a [`Unit`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Unit, marker::Modification)>;
