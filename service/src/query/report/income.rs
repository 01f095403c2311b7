//! [`Income`] definition.

use common::{
    operations::{By, Select},
    Money, Period,
};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Unit;
use crate::{
    domain::{booking, user, Booking},
    infra::{database, Database},
    read, Query, Service,
};

/// [`Query`] summing the income of an owner within a [`Period`].
///
/// Only confirmed [`Booking`]s lying within the [`Period`] entirely are
/// counted.
#[derive(Clone, Copy, Debug)]
pub struct Income {
    /// ID of the owner of the [`Unit`]s.
    pub owner_id: user::Id,

    /// [`Period`] to sum the income within, usually a calendar month.
    pub period: Period,
}

/// Output of the [`Income`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// [`Period`] the income is summed within.
    pub period: Period,

    /// Income per currency.
    pub income: Vec<Money>,
}

impl<Db> Query<Income> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Booking>, read::booking::list::Filter>>,
        Ok = Vec<Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Income { owner_id, period }: Income,
    ) -> Result<Self::Ok, Self::Err> {
        let bookings = self
            .database()
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::list::Filter {
                    owner_id: Some(owner_id),
                    status: Some(booking::Status::Confirmed),
                    ..read::booking::list::Filter::default()
                },
            )))
            .await
            .map_err(tracerr::wrap!())?;

        let income = Money::sum_by_currency(
            bookings
                .iter()
                .filter(|b| period.contains(&b.period))
                .map(|b| b.total_price),
        );

        Ok(Output { period, income })
    }
}

#[cfg(test)]
mod spec {
    use common::Period;
    use rust_decimal_macros::dec;

    use crate::{
        command::fixture,
        domain::{booking::Status, user},
        Query as _,
    };

    use super::{
        super::spec::{booking, idr, unit},
        Income,
    };

    #[tokio::test]
    async fn sums_bookings_within_month() {
        let service = fixture::service();
        let db = service.database();
        let owner = user::Id::new();
        let u = unit(db, owner).await;

        let within = ("2025-11-01", "2025-11-30");
        _ = booking(db, u.id, within, dec!(1000), Status::Confirmed).await;
        _ = booking(db, u.id, ("2025-11-10", "2025-11-20"), dec!(300), Status::Confirmed)
            .await;
        _ = booking(db, u.id, within, dec!(700), Status::Rejected).await;
        _ = booking(db, u.id, ("2025-10-15", "2025-11-15"), dec!(50), Status::Confirmed)
            .await;
        _ = booking(db, u.id, ("2025-11-15", "2025-12-01"), dec!(60), Status::Confirmed)
            .await;

        let out = service
            .execute(Income {
                owner_id: owner,
                period: Period::month("2025-11").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(out.income, vec![idr(dec!(1300))]);
    }

    #[tokio::test]
    async fn empty_month_has_no_income() {
        let service = fixture::service();

        let out = service
            .execute(Income {
                owner_id: user::Id::new(),
                period: Period::month("2025-02").unwrap(),
            })
            .await
            .unwrap();

        assert!(out.income.is_empty());
    }
}
