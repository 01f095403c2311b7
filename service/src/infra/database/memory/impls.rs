//! [`Database`] implementations.

use std::cmp::Reverse;

use common::{
    operations::{Acquire, By, Insert, Lock, Select, Update},
    DateTime,
};
use tracerr::Traced;

use crate::{
    domain::{
        booking, payment, unit, user, Booking, Discount, Payment,
        RentalHistory, Unit, User,
    },
    infra::database::{self, Database},
    read,
};

use super::{Access, Memory};

impl<C: Access> Database<Select<By<Option<User>, user::Id>>> for Memory<C> {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with(|s| s.users.get(&id).cloned()).await
    }
}

impl<'e, C: Access> Database<Select<By<Option<User>, &'e user::Email>>>
    for Memory<C>
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        self.with(|s| s.users.values().find(|u| &u.email == email).cloned())
            .await
    }
}

impl<C: Access> Database<Insert<User>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|s| drop(s.users.insert(user.id, user))).await
    }
}

impl<C> Database<Lock<By<User, user::Email>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<User, user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<C: Access> Database<Select<By<Option<Unit>, unit::Id>>> for Memory<C> {
    type Ok = Option<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Unit>, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with(|s| s.units.get(&id).cloned()).await
    }
}

impl<C: Access> Database<Select<By<Vec<Unit>, read::unit::list::Filter>>>
    for Memory<C>
{
    type Ok = Vec<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Unit>, read::unit::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::unit::list::Filter { owner_id } = by.into_inner();
        self.with(|s| {
            let mut units = s
                .units
                .values()
                .filter(|u| owner_id.map_or(true, |id| u.owner_id == id))
                .cloned()
                .collect::<Vec<_>>();
            units.sort_by_key(|u| Reverse(u.created_at));
            units
        })
        .await
    }
}

impl<C: Access> Database<Insert<Unit>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(unit): Insert<Unit>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|s| drop(s.units.insert(unit.id, unit))).await
    }
}

impl<C: Access> Database<Update<Unit>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(unit): Update<Unit>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|s| drop(s.units.insert(unit.id, unit))).await
    }
}

impl<C> Database<Lock<By<Unit, unit::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Unit, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<C: Access> Database<Acquire<By<Unit, unit::Id>>> for Memory<C> {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Acquire(by): Acquire<By<Unit, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with(|s| {
            s.units.get_mut(&id).is_some_and(|unit| {
                let acquired = unit.is_available;
                unit.is_available = false;
                if acquired {
                    unit.updated_at = DateTime::now().coerce();
                }
                acquired
            })
        })
        .await
    }
}

impl<C: Access> Database<Select<By<Option<Booking>, booking::Id>>>
    for Memory<C>
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with(|s| s.bookings.get(&id).cloned()).await
    }
}

impl<C: Access>
    Database<Select<By<Vec<Booking>, read::booking::list::Filter>>>
    for Memory<C>
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
        self.with(|s| {
            let mut bookings = s
                .bookings
                .values()
                .filter(|b| tenant_id.map_or(true, |id| b.tenant_id == id))
                .filter(|b| status.map_or(true, |st| b.status == st))
                .filter(|b| {
                    owner_id.map_or(true, |id| {
                        s.units.get(&b.unit_id).is_some_and(|u| u.owner_id == id)
                    })
                })
                .cloned()
                .collect::<Vec<_>>();
            bookings.sort_by_key(|b| Reverse(b.created_at));
            if let Some(limit) = limit {
                bookings.truncate(limit);
            }
            bookings
        })
        .await
    }
}

impl<C: Access> Database<Insert<Booking>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|s| drop(s.bookings.insert(booking.id, booking)))
            .await
    }
}

impl<C: Access> Database<Update<Booking>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|s| drop(s.bookings.insert(booking.id, booking)))
            .await
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<C: Access> Database<Select<By<Option<Payment>, payment::Id>>>
    for Memory<C>
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with(|s| s.payments.get(&id).cloned()).await
    }
}

impl<C: Access> Database<Select<By<Vec<Payment>, booking::Id>>>
    for Memory<C>
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let booking_id = by.into_inner();
        self.with(|s| {
            let mut payments = s
                .payments
                .values()
                .filter(|p| p.booking_id == booking_id)
                .cloned()
                .collect::<Vec<_>>();
            payments.sort_by_key(|p| Reverse(p.created_at));
            payments
        })
        .await
    }
}

impl<C: Access> Database<Insert<Payment>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|s| drop(s.payments.insert(payment.id, payment)))
            .await
    }
}

impl<C: Access> Database<Select<By<Option<RentalHistory>, booking::Id>>>
    for Memory<C>
{
    type Ok = Option<RentalHistory>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RentalHistory>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with(|s| {
            s.rental_histories
                .values()
                .find(|h| h.booking_id == id)
                .cloned()
        })
        .await
    }
}

impl<C: Access>
    Database<
        Select<By<Vec<RentalHistory>, read::rental_history::list::Filter>>,
    > for Memory<C>
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
        self.with(|s| {
            let mut records = s
                .rental_histories
                .values()
                .filter(|h| tenant_id.map_or(true, |id| h.tenant_id == id))
                .cloned()
                .collect::<Vec<_>>();
            records.sort_by_key(|h| Reverse(h.created_at));
            records
        })
        .await
    }
}

impl<C: Access> Database<Insert<RentalHistory>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<RentalHistory>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|s| {
            let exists = s
                .rental_histories
                .values()
                .any(|h| h.booking_id == record.booking_id);
            if !exists {
                drop(s.rental_histories.insert(record.id, record));
            }
        })
        .await
    }
}

impl<C: Access>
    Database<Select<By<Vec<Discount>, read::discount::list::Filter>>>
    for Memory<C>
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
        self.with(|s| {
            let mut discounts = s
                .discounts
                .values()
                .filter(|d| owner_id.map_or(true, |id| d.owner_id == id))
                .filter(|d| !active_only || d.is_active)
                .filter(|d| effective_on.map_or(true, |on| d.is_effective_on(on)))
                .cloned()
                .collect::<Vec<_>>();
            discounts.sort_by_key(|d| Reverse(d.created_at));
            discounts
        })
        .await
    }
}

impl<C: Access> Database<Insert<Discount>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(discount): Insert<Discount>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|s| drop(s.discounts.insert(discount.id, discount)))
            .await
    }
}
