//! Reports for [`Unit`] owners.
//!
//! [`Unit`]: crate::domain::Unit

pub mod income;
pub mod owner_stats;
pub mod recent_activities;

pub use self::{
    income::Income, owner_stats::OwnerStats,
    recent_activities::RecentActivities,
};

#[cfg(test)]
mod spec {
    use common::{
        money::Currency,
        operations::{Insert, Update},
        DateTime, Money, Period,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{
        domain::{
            booking::{self, PaymentMethod, PaymentStatus, Status},
            unit, user, Booking, Unit,
        },
        infra::{Database as _, Memory},
    };

    pub(super) fn idr(amount: Decimal) -> Money {
        Money {
            amount,
            currency: Currency::Idr,
        }
    }

    pub(super) async fn unit(db: &Memory, owner_id: user::Id) -> Unit {
        let now = DateTime::now();
        let unit = Unit {
            id: unit::Id::new(),
            owner_id,
            name: unit::Name::new("Ruko").unwrap(),
            description: None,
            address: None,
            city: None,
            coordinates: None,
            price: idr(dec!(1000)),
            discount_percent: common::Percent::ZERO,
            rental_type: unit::RentalType::Monthly,
            is_available: true,
            rented_offline: false,
            image: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        db.execute(Insert(unit.clone())).await.unwrap();
        unit
    }

    pub(super) async fn booking(
        db: &Memory,
        unit_id: unit::Id,
        period: (&str, &str),
        total: Decimal,
        status: Status,
    ) -> Booking {
        let now = DateTime::now();
        let booking = Booking {
            id: booking::Id::new(),
            unit_id,
            tenant_id: user::Id::new(),
            period: Period::new(
                period.0.parse().unwrap(),
                period.1.parse().unwrap(),
            )
            .unwrap(),
            total_price: idr(total),
            status,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::Online,
            offline_verified_by: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        db.execute(Insert(booking.clone())).await.unwrap();
        booking
    }

    pub(super) async fn backdate(db: &Memory, mut booking: Booking, secs: i64) {
        booking.created_at =
            DateTime::from_unix_timestamp(DateTime::now().unix_timestamp() - secs)
                .unwrap()
                .coerce();
        db.execute(Update(booking)).await.unwrap();
    }
}
