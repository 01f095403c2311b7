//! [`Payment`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, payment, Payment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `payments` table in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, booking_id, method, amount, currency, proof, \
    status, confirmed_by, paid_at, created_at";

/// Builds a [`Payment`] out of the provided [`Row`].
fn from_row(row: &Row) -> Payment {
    Payment {
        id: row.get("id"),
        booking_id: row.get("booking_id"),
        method: row.get("method"),
        amount: Money {
            amount: row.get("amount"),
            currency: row.get("currency"),
        },
        proof: row.get("proof"),
        status: row.get("status"),
        confirmed_by: row.get("confirmed_by"),
        paid_at: row.get("paid_at"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Payment>, payment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: payment::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM payments \
             WHERE id = $1::UUID",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Payment>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let booking_id: booking::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM payments \
             WHERE booking_id = $1::UUID \
             ORDER BY created_at DESC, id",
        );
        Ok(self
            .query(&sql, &[&booking_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Payment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Payment {
            id,
            booking_id,
            method,
            amount,
            proof,
            status,
            confirmed_by,
            paid_at,
            created_at,
        } = payment;

        const SQL: &str = "\
            INSERT INTO payments (\
                id, booking_id, method, amount, currency, proof, \
                status, confirmed_by, paid_at, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::INT2, $4::NUMERIC, $5::INT2, \
                $6::VARCHAR, $7::INT2, $8::UUID, \
                $9::TIMESTAMPTZ, $10::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &booking_id,
                &method,
                &amount.amount,
                &amount.currency,
                &proof,
                &status,
                &confirmed_by,
                &paid_at,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
