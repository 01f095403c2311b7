//! Pricing of [`Booking`]s.
//!
//! ```text
//! subtotal = price × duration
//! tax      = subtotal × 10%
//! discount = subtotal × discount%
//! total    = subtotal + tax − discount
//! ```

use common::{Money, Percent, Period};
use derive_more::{Display, Error};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::domain::unit::RentalType;
#[cfg(doc)]
use crate::domain::{Booking, Unit};

/// Tax rate applied to every subtotal.
#[expect(unsafe_code, reason = "constant is in range")]
// SAFETY: `10` is within `0..=100` range.
pub const TAX_RATE: Percent = unsafe { Percent::new_unchecked(Decimal::TEN) };

/// The only promotional code accepted on [`Booking`] creation.
pub const PROMO_CODE: &str = "PROMO10";

/// Resolves the discount granted by the provided promotional `code`.
///
/// Codes must match exactly, ignoring ASCII case only. Unknown codes resolve
/// to [`None`].
#[must_use]
pub fn promo_discount(code: &str) -> Option<Percent> {
    code.eq_ignore_ascii_case(PROMO_CODE)
        .then(|| Percent::new(Decimal::TEN))
        .flatten()
}

/// Policy of handling a [`Quote::total`] below zero.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, SmartDefault,
)]
#[serde(rename_all = "snake_case")]
pub enum NegativeTotal {
    /// Negative totals are kept as is.
    #[default]
    Preserve,

    /// Negative totals are raised to zero.
    Clamp,
}

/// Price breakdown of a [`Booking`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Quote {
    /// Number of billed [`RentalType`] periods.
    pub duration: u32,

    /// Price of the whole `duration` before tax and discount.
    pub subtotal: Money,

    /// Tax on the `subtotal`.
    pub tax: Money,

    /// Discount from the `subtotal`.
    pub discount: Money,

    /// Amount to pay.
    pub total: Money,
}

/// Error of a [`Period`] too short to be billed.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("`{period}` is shorter than one `{rental_type}` period")]
pub struct InvalidDateRange {
    /// Rejected [`Period`].
    pub period: Period,

    /// [`RentalType`] the [`Period`] was billed by.
    pub rental_type: RentalType,
}

/// Calculates the [`Quote`] for renting a [`Unit`] with the provided
/// `price` during the `period`.
///
/// Duration is the difference of calendar months (or years) between the
/// ends of the `period`, and is never less than one.
///
/// # Errors
///
/// If the `period` yields no billable duration.
pub fn quote(
    price: Money,
    rental_type: RentalType,
    period: Period,
    discount: Percent,
    policy: NegativeTotal,
) -> Result<Quote, InvalidDateRange> {
    let (start, end) = (period.start(), period.end());
    let diff = match rental_type {
        RentalType::Monthly => start.months_until(end),
        RentalType::Yearly => start.years_until(end),
    };
    let duration = u32::try_from(diff.max(1))
        .ok()
        .filter(|d| *d >= 1)
        .ok_or(InvalidDateRange {
            period,
            rental_type,
        })?;

    let subtotal = price.amount * Decimal::from(duration);
    let tax = TAX_RATE.of(subtotal);
    let discount = discount.of(subtotal);
    let mut total = subtotal + tax - discount;
    if policy == NegativeTotal::Clamp && total.is_sign_negative() {
        total = Decimal::ZERO;
    }

    Ok(Quote {
        duration,
        subtotal: price.with_amount(subtotal),
        tax: price.with_amount(tax),
        discount: price.with_amount(discount),
        total: price.with_amount(total),
    })
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Money, Percent, Period};
    use rust_decimal_macros::dec;

    use crate::domain::unit::RentalType;

    use super::{promo_discount, quote, NegativeTotal};

    fn idr(amount: rust_decimal::Decimal) -> Money {
        Money {
            amount,
            currency: Currency::Idr,
        }
    }

    fn period(start: &str, end: &str) -> Period {
        Period::new(start.parse().unwrap(), end.parse().unwrap()).unwrap()
    }

    #[test]
    fn bills_whole_months() {
        let q = quote(
            idr(dec!(1000000)),
            RentalType::Monthly,
            period("2025-01-01", "2025-03-01"),
            Percent::ZERO,
            NegativeTotal::Preserve,
        )
        .unwrap();

        assert_eq!(q.duration, 2);
        assert_eq!(q.subtotal, idr(dec!(2000000)));
        assert_eq!(q.tax, idr(dec!(200000)));
        assert_eq!(q.discount, idr(dec!(0)));
        assert_eq!(q.total, idr(dec!(2200000)));
    }

    #[test]
    fn same_month_bills_one_month() {
        let q = quote(
            idr(dec!(1000000)),
            RentalType::Monthly,
            period("2025-01-01", "2025-01-15"),
            Percent::new(dec!(10)).unwrap(),
            NegativeTotal::Preserve,
        )
        .unwrap();

        assert_eq!(q.duration, 1);
        assert_eq!(q.subtotal, idr(dec!(1000000)));
        assert_eq!(q.tax, idr(dec!(100000)));
        assert_eq!(q.discount, idr(dec!(100000)));
        assert_eq!(q.total, idr(dec!(1000000)));
    }

    #[test]
    fn same_year_bills_one_year() {
        let q = quote(
            idr(dec!(12000000)),
            RentalType::Yearly,
            period("2025-02-01", "2025-11-30"),
            Percent::ZERO,
            NegativeTotal::Preserve,
        )
        .unwrap();

        assert_eq!(q.duration, 1);
        assert_eq!(q.total, idr(dec!(13200000)));
    }

    #[test]
    fn counts_calendar_boundaries_only() {
        let q = quote(
            idr(dec!(100)),
            RentalType::Monthly,
            period("2024-12-31", "2025-01-01"),
            Percent::ZERO,
            NegativeTotal::Preserve,
        )
        .unwrap();
        assert_eq!(q.duration, 1);

        let q = quote(
            idr(dec!(100)),
            RentalType::Yearly,
            period("2023-06-15", "2025-01-01"),
            Percent::ZERO,
            NegativeTotal::Preserve,
        )
        .unwrap();
        assert_eq!(q.duration, 2);
    }

    #[test]
    fn negative_total_policy() {
        #[expect(unsafe_code, reason = "out-of-range discount")]
        // SAFETY: Intentionally exceeds the range to produce negative totals.
        let huge = unsafe { Percent::new_unchecked(dec!(150)) };
        let args = (
            idr(dec!(1000)),
            RentalType::Monthly,
            period("2025-01-01", "2025-01-02"),
            huge,
        );

        let preserved =
            quote(args.0, args.1, args.2, args.3, NegativeTotal::Preserve)
                .unwrap();
        assert_eq!(preserved.total, idr(dec!(-400)));

        let clamped =
            quote(args.0, args.1, args.2, args.3, NegativeTotal::Clamp)
                .unwrap();
        assert_eq!(clamped.total, idr(dec!(0)));
        assert_eq!(clamped.discount, idr(dec!(1500)));
    }

    #[test]
    fn promo_code_is_case_insensitive() {
        let expected = Percent::new(dec!(10));

        assert_eq!(promo_discount("PROMO10"), expected);
        assert_eq!(promo_discount("promo10"), expected);
        assert_eq!(promo_discount("Promo10"), expected);
        assert_eq!(promo_discount(" PROMO10 "), None);
        assert_eq!(promo_discount("PROMO20"), None);
        assert_eq!(promo_discount(""), None);
    }
}
