//! [`Command`] for marking a [`Unit`] as rented outside of the platform.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{unit, Unit},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`Unit`] as rented outside of the platform.
///
/// Such a [`Unit`] cannot be booked anymore.
#[derive(Clone, Copy, Debug)]
pub struct MarkUnitRentedOffline {
    /// ID of the [`Unit`] to be marked.
    pub unit_id: unit::Id,
}

impl<Db> Command<MarkUnitRentedOffline> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Lock<By<Unit, unit::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        > + Database<Update<Unit>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Unit;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkUnitRentedOffline,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkUnitRentedOffline { unit_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::<Unit, _>::new(unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut unit = tx
            .execute(Select(By::<Option<Unit>, _>::new(unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(unit_id))
            .map_err(tracerr::wrap!())?;

        if unit.rented_offline && !unit.is_available {
            return Ok(unit);
        }

        unit.rented_offline = true;
        unit.is_available = false;
        unit.updated_at = DateTime::now().coerce();

        tx.execute(Update(unit.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(unit.id = %unit.id, "`Unit` rented offline");

        Ok(unit)
    }
}

/// Error of [`MarkUnitRentedOffline`] [`Command`] execution.
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
    use common::{
        operations::{By, Select},
        Percent,
    };
    use rust_decimal_macros::dec;

    use crate::{
        command::fixture,
        domain::{unit, user::Role, Unit},
        infra::Database as _,
        Command as _,
    };

    use super::{ExecutionError, MarkUnitRentedOffline};

    #[tokio::test]
    async fn takes_unit_off_the_market() {
        let service = fixture::service();
        let owner = fixture::user(&service, Role::Owner).await;
        let unit =
            fixture::unit(&service, owner.id, dec!(1000), Percent::ZERO).await;

        let marked = service
            .execute(MarkUnitRentedOffline { unit_id: unit.id })
            .await
            .unwrap();
        assert!(marked.rented_offline);
        assert!(!marked.is_available);

        let stored = service
            .database()
            .execute(Select(By::<Option<Unit>, _>::new(unit.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, marked);
    }

    #[tokio::test]
    async fn fails_on_unknown_unit() {
        let service = fixture::service();

        let err = service
            .execute(MarkUnitRentedOffline {
                unit_id: unit::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::UnitNotExists(_)));
    }
}
