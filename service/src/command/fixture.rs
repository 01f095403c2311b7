//! Fixtures of [`Command`] specs.
//!
//! [`Command`]: super::Command

use std::time::Duration;

use common::{money::Currency, operations::Insert, DateTime, Money, Percent};
use rust_decimal::Decimal;

use crate::{
    domain::{
        pricing::NegativeTotal,
        unit::{self, RentalType},
        user::{self, Role},
        Unit, User,
    },
    infra::{Database as _, Memory},
    Config, Service,
};

/// Password of every [`User`] created by [`user()`].
pub(crate) const PASSWORD: &str = "s3cret-pass";

/// Creates a new [`Service`] over an empty [`Memory`] database.
pub(crate) fn service() -> Service<Memory> {
    Service::new(
        Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(b"spec"),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"spec"),
            session_expiration: Duration::from_secs(60 * 60),
            negative_total: NegativeTotal::default(),
        },
        Memory::new(),
    )
}

/// Stores a new [`User`] with the provided [`Role`].
pub(crate) async fn user(service: &Service<Memory>, role: Role) -> User {
    let id = user::Id::new();
    let now = DateTime::now();
    let user = User {
        id,
        name: user::Name::new(format!("{role} {id}")).unwrap(),
        email: user::Email::new(format!("{id}@example.com")).unwrap(),
        password_hash: user::PasswordHash::new(
            &user::Password::new(PASSWORD).unwrap(),
        )
        .unwrap(),
        phone: None,
        role,
        address: None,
        created_at: now.coerce(),
        updated_at: now.coerce(),
    };
    service.database().execute(Insert(user.clone())).await.unwrap();
    user
}

/// Stores a new available monthly [`Unit`] of the provided owner.
pub(crate) async fn unit(
    service: &Service<Memory>,
    owner_id: user::Id,
    monthly_price: Decimal,
    discount_percent: Percent,
) -> Unit {
    let now = DateTime::now();
    let unit = Unit {
        id: unit::Id::new(),
        owner_id,
        name: unit::Name::new("Ruko Blok A").unwrap(),
        description: None,
        address: None,
        city: unit::City::new("Jakarta"),
        coordinates: None,
        price: Money {
            amount: monthly_price,
            currency: Currency::Idr,
        },
        discount_percent,
        rental_type: RentalType::Monthly,
        is_available: true,
        rented_offline: false,
        image: None,
        created_at: now.coerce(),
        updated_at: now.coerce(),
    };
    service.database().execute(Insert(unit.clone())).await.unwrap();
    unit
}
