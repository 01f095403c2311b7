//! [`Booking`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money, Period,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `bookings` table in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    b.id, b.unit_id, b.tenant_id, b.start_date, b.end_date, \
    b.total_amount, b.total_currency, \
    b.status, b.payment_status, b.payment_method, b.offline_verified_by, \
    b.created_at, b.updated_at";

/// Builds a [`Booking`] out of the provided [`Row`].
fn from_row(row: &Row) -> Booking {
    Booking {
        id: row.get("id"),
        unit_id: row.get("unit_id"),
        tenant_id: row.get("tenant_id"),
        period: Period::new(row.get("start_date"), row.get("end_date"))
            .expect("`bookings_check` constraint"),
        total_price: Money {
            amount: row.get("total_amount"),
            currency: row.get("total_currency"),
        },
        status: row.get("status"),
        payment_status: row.get("payment_status"),
        payment_method: row.get("payment_method"),
        offline_verified_by: row.get("offline_verified_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings AS b \
             WHERE b.id = $1::UUID",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Booking>, read::booking::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::list::Filter {
            tenant_id,
            owner_id,
            status,
            limit,
        } = by.into_inner();
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let tenant_idx = tenant_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });
        let owner_idx = owner_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });
        let status_idx = status.as_ref().map(|st| {
            ps.push(st);
            ps.len()
        });
        let limit_idx = limit.as_ref().map(|l| {
            ps.push(l);
            ps.len()
        });

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings AS b \
             INNER JOIN units AS u ON u.id = b.unit_id \
             WHERE TRUE \
                   {tenant_filtering} \
                   {owner_filtering} \
                   {status_filtering} \
             ORDER BY b.created_at DESC, b.id \
             {limit}",
            tenant_filtering =
                tenant_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND b.tenant_id = ${idx}::UUID"))
                }),
            owner_filtering = owner_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND u.owner_id = ${idx}::UUID"))
            }),
            status_filtering =
                status_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND b.status = ${idx}::INT2"))
                }),
            limit = limit_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("LIMIT ${idx}::INT8"))
            }),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Booking>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(booking)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            unit_id,
            tenant_id,
            period,
            total_price,
            status,
            payment_status,
            payment_method,
            offline_verified_by,
            created_at,
            updated_at,
        } = booking;

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, unit_id, tenant_id, start_date, end_date, \
                total_amount, total_currency, \
                status, payment_status, payment_method, offline_verified_by, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::DATE, $5::DATE, \
                $6::NUMERIC, $7::INT2, \
                $8::INT2, $9::INT2, $10::INT2, $11::UUID, \
                $12::TIMESTAMPTZ, $13::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                payment_status = EXCLUDED.payment_status, \
                offline_verified_by = EXCLUDED.offline_verified_by, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &unit_id,
                &tenant_id,
                &period.start(),
                &period.end(),
                &total_price.amount,
                &total_price.currency,
                &status,
                &payment_status,
                &payment_method,
                &offline_verified_by,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO bookings_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
