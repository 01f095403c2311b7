//! [`Command`] for listing a new [`Unit`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Money, Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::unit::{
    Address, City, Coordinates, Description, Image, Name, RentalType,
};
use crate::{
    domain::{
        unit,
        user::{self, Role},
        Unit, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for listing a new [`Unit`].
#[derive(Clone, Debug)]
pub struct CreateUnit {
    /// ID of the [`User`] owning a new [`Unit`].
    pub owner_id: user::Id,

    /// [`Name`] of a new [`Unit`].
    pub name: unit::Name,

    /// [`Description`] of a new [`Unit`].
    pub description: Option<unit::Description>,

    /// [`Address`] of a new [`Unit`].
    pub address: Option<unit::Address>,

    /// [`City`] of a new [`Unit`].
    pub city: Option<unit::City>,

    /// [`Coordinates`] of a new [`Unit`].
    pub coordinates: Option<unit::Coordinates>,

    /// Price of a new [`Unit`] per one [`RentalType`] period.
    pub price: Money,

    /// Static discount of a new [`Unit`].
    pub discount_percent: Percent,

    /// [`RentalType`] of a new [`Unit`].
    pub rental_type: unit::RentalType,

    /// [`Image`] of a new [`Unit`].
    pub image: Option<unit::Image>,
}

impl<Db> Command<CreateUnit> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Unit>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Unit;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUnit) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUnit {
            owner_id,
            name,
            description,
            address,
            city,
            coordinates,
            price,
            discount_percent,
            rental_type,
            image,
        } = cmd;

        let owner = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(owner_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(owner_id))
            .map_err(tracerr::wrap!())?;
        if owner.role == Role::Tenant {
            return Err(tracerr::new!(E::UserNotOwner(owner_id)));
        }

        let now = DateTime::now();
        let unit = Unit {
            id: unit::Id::new(),
            owner_id,
            name,
            description,
            address,
            city,
            coordinates,
            price,
            discount_percent,
            rental_type,
            is_available: true,
            rented_offline: false,
            image,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(unit.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(unit.id = %unit.id, owner.id = %owner_id, "`Unit` created");

        Ok(unit)
    }
}

/// Error of [`CreateUnit`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] is not allowed to own [`Unit`]s.
    #[display("`User(id: {_0})` is not an owner")]
    UserNotOwner(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Money, Percent};
    use rust_decimal_macros::dec;

    use crate::{
        command::fixture,
        domain::{
            unit::{self, RentalType},
            user::{self, Role},
        },
        Command as _,
    };

    use super::{CreateUnit, ExecutionError};

    fn cmd(owner_id: user::Id) -> CreateUnit {
        CreateUnit {
            owner_id,
            name: unit::Name::new("Ruko Kelapa Gading").unwrap(),
            description: None,
            address: None,
            city: None,
            coordinates: unit::Coordinates::new(-6.16, 106.9),
            price: Money {
                amount: dec!(12000000),
                currency: Currency::Idr,
            },
            discount_percent: Percent::ZERO,
            rental_type: RentalType::Yearly,
            image: None,
        }
    }

    #[tokio::test]
    async fn lists_available_unit() {
        let service = fixture::service();
        let owner = fixture::user(&service, Role::Owner).await;

        let unit = service.execute(cmd(owner.id)).await.unwrap();

        assert_eq!(unit.owner_id, owner.id);
        assert!(unit.is_available);
        assert!(!unit.rented_offline);
    }

    #[tokio::test]
    async fn tenants_cannot_list_units() {
        let service = fixture::service();
        let tenant = fixture::user(&service, Role::Tenant).await;

        let err = service.execute(cmd(tenant.id)).await.unwrap_err();
        assert!(matches!(err.into_inner(), ExecutionError::UserNotOwner(_)));

        let err = service.execute(cmd(user::Id::new())).await.unwrap_err();
        assert!(matches!(err.into_inner(), ExecutionError::UserNotExists(_)));
    }
}
