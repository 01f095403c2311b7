//! [`Unit`]-related [`Database`] implementations.

use common::{
    operations::{Acquire, By, Insert, Lock, Select, Update},
    DateTime, Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        unit::{self, Coordinates},
        Unit,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `units` table in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, owner_id, name, description, address, city, latitude, longitude, \
    price_amount, price_currency, discount_percent, rental_type, \
    is_available, rented_offline, image, created_at, updated_at";

/// Builds a [`Unit`] out of the provided [`Row`].
fn from_row(row: &Row) -> Unit {
    let latitude: Option<f64> = row.get("latitude");
    let longitude: Option<f64> = row.get("longitude");
    Unit {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        description: row.get("description"),
        address: row.get("address"),
        city: row.get("city"),
        coordinates: latitude
            .zip(longitude)
            .and_then(|(lat, lon)| Coordinates::new(lat, lon)),
        price: Money {
            amount: row.get("price_amount"),
            currency: row.get("price_currency"),
        },
        discount_percent: row.get("discount_percent"),
        rental_type: row.get("rental_type"),
        is_available: row.get("is_available"),
        rented_offline: row.get("rented_offline"),
        image: row.get("image"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Unit>, unit::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Unit>, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: unit::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM units \
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

impl<C> Database<Select<By<Vec<Unit>, read::unit::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Unit>, read::unit::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::unit::list::Filter { owner_id } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let owner_idx = owner_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM units \
             WHERE TRUE \
                   {owner_filtering} \
             ORDER BY created_at DESC, id",
            owner_filtering = owner_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND owner_id = ${idx}::UUID"))
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

impl<C> Database<Insert<Unit>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Unit>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(unit): Insert<Unit>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(unit)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Unit>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(unit): Update<Unit>,
    ) -> Result<Self::Ok, Self::Err> {
        let Unit {
            id,
            owner_id,
            name,
            description,
            address,
            city,
            coordinates,
            price,
            discount_percent,
            rental_type,
            is_available,
            rented_offline,
            image,
            created_at,
            updated_at,
        } = unit;
        let latitude = coordinates.map(|c| c.latitude());
        let longitude = coordinates.map(|c| c.longitude());

        const SQL: &str = "\
            INSERT INTO units (\
                id, owner_id, name, description, address, city, \
                latitude, longitude, \
                price_amount, price_currency, discount_percent, rental_type, \
                is_available, rented_offline, image, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, $6::VARCHAR, \
                $7::FLOAT8, $8::FLOAT8, \
                $9::NUMERIC, $10::INT2, $11::NUMERIC, $12::INT2, \
                $13::BOOLEAN, $14::BOOLEAN, $15::VARCHAR, \
                $16::TIMESTAMPTZ, $17::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                description = EXCLUDED.description, \
                address = EXCLUDED.address, \
                city = EXCLUDED.city, \
                latitude = EXCLUDED.latitude, \
                longitude = EXCLUDED.longitude, \
                price_amount = EXCLUDED.price_amount, \
                price_currency = EXCLUDED.price_currency, \
                discount_percent = EXCLUDED.discount_percent, \
                rental_type = EXCLUDED.rental_type, \
                is_available = EXCLUDED.is_available, \
                rented_offline = EXCLUDED.rented_offline, \
                image = EXCLUDED.image, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &name,
                &description,
                &address,
                &city,
                &latitude,
                &longitude,
                &price.amount,
                &price.currency,
                &discount_percent,
                &rental_type,
                &is_available,
                &rented_offline,
                &image,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Unit, unit::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Unit, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: unit::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO units_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Acquire<By<Unit, unit::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Acquire(by): Acquire<By<Unit, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: unit::Id = by.into_inner();
        let now: unit::ModificationDateTime = DateTime::now().coerce();

        // Single conditional write, so two concurrent acquisitions of the
        // same `Unit` never both succeed.
        const SQL: &str = "\
            UPDATE units \
            SET is_available = FALSE, \
                updated_at = $2::TIMESTAMPTZ \
            WHERE id = $1::UUID \
              AND is_available";
        self.exec(SQL, &[&id, &now])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected == 1)
    }
}
