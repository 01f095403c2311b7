//! [`Command`] for announcing a [`Discount`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Percent, Period,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{discount, unit, user, Discount, Unit},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for announcing a [`Discount`] on a [`Unit`].
#[derive(Clone, Debug)]
pub struct CreateDiscount {
    /// ID of the discounted [`Unit`].
    pub unit_id: unit::Id,

    /// ID of the owner announcing the [`Discount`].
    pub owner_id: user::Id,

    /// [`discount::Name`] of a new [`Discount`].
    pub name: discount::Name,

    /// Discount rate.
    pub percent: Percent,

    /// [`Period`] a new [`Discount`] is valid within.
    pub period: Period,

    /// Indicator whether a new [`Discount`] is switched on.
    pub is_active: bool,
}

impl<Db> Command<CreateDiscount> for Service<Db>
where
    Db: Database<
            Select<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Discount>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Discount;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateDiscount,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateDiscount {
            unit_id,
            owner_id,
            name,
            percent,
            period,
            is_active,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<Unit>, _>::new(unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(unit_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let now = DateTime::now();
        let discount = Discount {
            id: discount::Id::new(),
            unit_id,
            owner_id,
            name,
            percent,
            period,
            is_active,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(discount.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(discount)
    }
}

/// Error of [`CreateDiscount`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Unit`] with the provided ID does not exist.
    #[display("`Unit(id: {_0})` does not exist")]
    UnitNotExists(#[error(not(source))] unit::Id),
}

#[cfg(test)]
mod spec {
    use common::{Percent, Period};
    use rust_decimal_macros::dec;

    use crate::{
        command::fixture,
        domain::{discount, unit, user::Role},
        Command as _,
    };

    use super::{CreateDiscount, ExecutionError};

    #[tokio::test]
    async fn requires_existing_unit() {
        let service = fixture::service();
        let owner = fixture::user(&service, Role::Owner).await;
        let unit =
            fixture::unit(&service, owner.id, dec!(1000), Percent::ZERO).await;
        let cmd = CreateDiscount {
            unit_id: unit.id,
            owner_id: owner.id,
            name: discount::Name::new("Lebaran").unwrap(),
            percent: Percent::new(dec!(15)).unwrap(),
            period: Period::month("2025-04").unwrap(),
            is_active: true,
        };

        let discount = service.execute(cmd.clone()).await.unwrap();
        assert_eq!(discount.unit_id, unit.id);

        let err = service
            .execute(CreateDiscount {
                unit_id: unit::Id::new(),
                ..cmd
            })
            .await
            .unwrap_err()
            .into_inner();
        assert!(matches!(err, ExecutionError::UnitNotExists(_)));
    }
}
