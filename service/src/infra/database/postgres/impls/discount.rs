//! [`Discount`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Period,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::Discount,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Vec<Discount>, read::discount::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Discount>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Discount>, read::discount::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::discount::list::Filter {
            owner_id,
            active_only,
            effective_on,
        } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let owner_idx = owner_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });
        let date_idx = effective_on.as_ref().map(|date| {
            ps.push(date);
            ps.len()
        });

        let sql = format!(
            "SELECT id, unit_id, owner_id, name, percent, \
                    start_date, end_date, is_active, \
                    created_at, updated_at \
             FROM discounts \
             WHERE TRUE \
                   {owner_filtering} \
                   {active_filtering} \
                   {date_filtering} \
             ORDER BY created_at DESC, id",
            owner_filtering = owner_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND owner_id = ${idx}::UUID"))
            }),
            active_filtering = if active_only { "AND is_active" } else { "" },
            date_filtering = date_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!(
                    "AND is_active \
                     AND start_date <= ${idx}::DATE \
                     AND ${idx}::DATE <= end_date"
                ))
            }),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Discount {
                id: row.get("id"),
                unit_id: row.get("unit_id"),
                owner_id: row.get("owner_id"),
                name: row.get("name"),
                percent: row.get("percent"),
                period: Period::new(row.get("start_date"), row.get("end_date"))
                    .expect("`discounts_check` constraint"),
                is_active: row.get("is_active"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })
            .collect())
    }
}

impl<C> Database<Insert<Discount>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(discount): Insert<Discount>,
    ) -> Result<Self::Ok, Self::Err> {
        let Discount {
            id,
            unit_id,
            owner_id,
            name,
            percent,
            period,
            is_active,
            created_at,
            updated_at,
        } = discount;

        const SQL: &str = "\
            INSERT INTO discounts (\
                id, unit_id, owner_id, name, percent, \
                start_date, end_date, is_active, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::VARCHAR, $5::NUMERIC, \
                $6::DATE, $7::DATE, $8::BOOLEAN, \
                $9::TIMESTAMPTZ, $10::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &unit_id,
                &owner_id,
                &name,
                &percent,
                &period.start(),
                &period.end(),
                &is_active,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
