//! [`RentalHistory`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Money, Period,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, RentalHistory},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `rental_histories` table in the order [`from_row()`]
/// expects.
const COLUMNS: &str = "\
    id, booking_id, unit_id, tenant_id, start_date, end_date, \
    total_amount, total_currency, payment_method, created_at";

/// Builds a [`RentalHistory`] out of the provided [`Row`].
fn from_row(row: &Row) -> RentalHistory {
    RentalHistory {
        id: row.get("id"),
        booking_id: row.get("booking_id"),
        unit_id: row.get("unit_id"),
        tenant_id: row.get("tenant_id"),
        period: Period::new(row.get("start_date"), row.get("end_date"))
            .expect("copied from a valid `Booking`"),
        total_paid: Money {
            amount: row.get("total_amount"),
            currency: row.get("total_currency"),
        },
        payment_method: row.get("payment_method"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<RentalHistory>, booking::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<RentalHistory>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RentalHistory>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let booking_id: booking::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM rental_histories \
             WHERE booking_id = $1::UUID",
        );
        Ok(self
            .query_opt(&sql, &[&booking_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C>
    Database<
        Select<By<Vec<RentalHistory>, read::rental_history::list::Filter>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<RentalHistory>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<RentalHistory>, read::rental_history::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental_history::list::Filter { tenant_id } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let tenant_idx = tenant_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM rental_histories \
             WHERE TRUE \
                   {tenant_filtering} \
             ORDER BY created_at DESC, id",
            tenant_filtering =
                tenant_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND tenant_id = ${idx}::UUID"))
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

impl<C> Database<Insert<RentalHistory>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<RentalHistory>,
    ) -> Result<Self::Ok, Self::Err> {
        let RentalHistory {
            id,
            booking_id,
            unit_id,
            tenant_id,
            period,
            total_paid,
            payment_method,
            created_at,
        } = record;

        // At most one record per `Booking`, the first one wins.
        const SQL: &str = "\
            INSERT INTO rental_histories (\
                id, booking_id, unit_id, tenant_id, start_date, end_date, \
                total_amount, total_currency, payment_method, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, $5::DATE, $6::DATE, \
                $7::NUMERIC, $8::INT2, $9::INT2, $10::TIMESTAMPTZ\
            ) \
            ON CONFLICT (booking_id) DO NOTHING";
        self.exec(
            SQL,
            &[
                &id,
                &booking_id,
                &unit_id,
                &tenant_id,
                &period.start(),
                &period.end(),
                &total_paid.amount,
                &total_paid.currency,
                &payment_method,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
