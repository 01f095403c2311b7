//! [`OwnerStats`] definition.

use common::{
    operations::{By, Select},
    Money,
};
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking, Unit},
    infra::{database, Database},
    read, Query, Service,
};

/// [`Query`] summarizing the [`Unit`]s of an owner and their [`Booking`]s.
#[derive(Clone, Copy, Debug)]
pub struct OwnerStats {
    /// ID of the owner.
    pub owner_id: user::Id,
}

/// Output of the [`OwnerStats`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Number of [`Unit`]s of the owner.
    pub total_units: usize,

    /// Number of [`Booking`]s of the owner's [`Unit`]s.
    pub total_bookings: usize,

    /// Sum of confirmed [`Booking`] totals, per currency.
    pub total_income: Vec<Money>,
}

impl<Db> Query<OwnerStats> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Unit>, read::unit::list::Filter>>,
            Ok = Vec<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Booking>, read::booking::list::Filter>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        OwnerStats { owner_id }: OwnerStats,
    ) -> Result<Self::Ok, Self::Err> {
        let units = self
            .database()
            .execute(Select(By::<Vec<Unit>, _>::new(read::unit::list::Filter {
                owner_id: Some(owner_id),
            })))
            .await
            .map_err(tracerr::wrap!())?;

        let bookings = self
            .database()
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::list::Filter {
                    owner_id: Some(owner_id),
                    ..read::booking::list::Filter::default()
                },
            )))
            .await
            .map_err(tracerr::wrap!())?;

        let total_income = Money::sum_by_currency(
            bookings
                .iter()
                .filter(|b| b.status == booking::Status::Confirmed)
                .map(|b| b.total_price),
        );

        Ok(Output {
            total_units: units.len(),
            total_bookings: bookings.len(),
            total_income,
        })
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal_macros::dec;

    use crate::{
        command::fixture,
        domain::{booking::Status, user},
        Query as _,
    };

    use super::{
        super::spec::{booking, idr, unit},
        OwnerStats,
    };

    #[tokio::test]
    async fn counts_only_owned_and_confirmed() {
        let service = fixture::service();
        let db = service.database();
        let owner = user::Id::new();
        let first = unit(db, owner).await;
        let second = unit(db, owner).await;
        let foreign = unit(db, user::Id::new()).await;

        let period = ("2025-01-01", "2025-01-31");
        _ = booking(db, first.id, period, dec!(1100), Status::Confirmed).await;
        _ = booking(db, second.id, period, dec!(2200), Status::Confirmed).await;
        _ = booking(db, second.id, period, dec!(500), Status::Waiting).await;
        _ = booking(db, foreign.id, period, dec!(900), Status::Confirmed).await;

        let stats = service
            .execute(OwnerStats { owner_id: owner })
            .await
            .unwrap();

        assert_eq!(stats.total_units, 2);
        assert_eq!(stats.total_bookings, 3);
        assert_eq!(stats.total_income, vec![idr(dec!(3300))]);
    }
}
