//! [`RecentActivities`] definition.

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Unit;
use crate::{
    domain::{user, Booking},
    infra::{database, Database},
    read, Query, Service,
};

/// [`Query`] of the most recently requested [`Booking`]s of an owner's
/// [`Unit`]s, newest first.
#[derive(Clone, Copy, Debug)]
pub struct RecentActivities {
    /// ID of the owner of the [`Unit`]s.
    pub owner_id: user::Id,
}

impl RecentActivities {
    /// Maximum number of returned [`Booking`]s.
    pub const LIMIT: usize = 5;
}

impl<Db> Query<RecentActivities> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Booking>, read::booking::list::Filter>>,
        Ok = Vec<Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        RecentActivities { owner_id }: RecentActivities,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::list::Filter {
                    owner_id: Some(owner_id),
                    limit: Some(RecentActivities::LIMIT),
                    ..read::booking::list::Filter::default()
                },
            )))
            .await
            .map_err(tracerr::wrap!())
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
        super::spec::{backdate, booking, unit},
        RecentActivities,
    };

    #[tokio::test]
    async fn returns_five_newest() {
        let service = fixture::service();
        let db = service.database();
        let owner = user::Id::new();
        let u = unit(db, owner).await;

        let period = ("2025-01-01", "2025-01-31");
        let mut created = vec![];
        for age in (0..7).rev() {
            let b = booking(db, u.id, period, dec!(1), Status::Waiting).await;
            backdate(db, b.clone(), age * 60).await;
            created.push(b.id);
        }

        let recent = service
            .execute(RecentActivities { owner_id: owner })
            .await
            .unwrap();

        let ids = recent.iter().map(|b| b.id).collect::<Vec<_>>();
        let expected = created.iter().rev().take(5).copied().collect::<Vec<_>>();
        assert_eq!(ids, expected);
    }
}
