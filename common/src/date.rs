//! Calendar [`Date`] and [`Period`] definitions.

use std::{fmt, str::FromStr};

use derive_more::{Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use time::{
    format_description::BorrowedFormatItem, macros::format_description, Month,
};

/// Format of a [`Date`] in its textual representation.
const FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Calendar date without a time of day.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Date(time::Date);

impl Date {
    /// Creates a new [`Date`] from the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_calendar(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Returns the month of this [`Date`] (`1..=12`).
    #[must_use]
    pub fn month(self) -> u8 {
        self.0.month().into()
    }

    /// Returns the day of month of this [`Date`].
    #[must_use]
    pub fn day(self) -> u8 {
        self.0.day()
    }

    /// Returns the number of calendar month boundaries between this [`Date`]
    /// and the `later` one.
    ///
    /// Days are not taken into account: `Jan 31` and `Feb 1` are one month
    /// apart, while `Jan 1` and `Jan 31` are zero months apart.
    #[must_use]
    pub fn months_until(self, later: Self) -> i64 {
        let years = i64::from(later.year()) - i64::from(self.year());
        let months = i64::from(later.month()) - i64::from(self.month());
        years * 12 + months
    }

    /// Returns the number of calendar year boundaries between this [`Date`]
    /// and the `later` one.
    #[must_use]
    pub fn years_until(self, later: Self) -> i64 {
        i64::from(later.year()) - i64::from(self.year())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.format(FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl FromStr for Date {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s, FORMAT)
            .map(Self)
            .map_err(|_| ParseError::Date)
    }
}

impl From<time::Date> for Date {
    fn from(date: time::Date) -> Self {
        Self(date)
    }
}

impl From<Date> for time::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

/// Error of parsing a [`Date`] or a [`Period`] from a string.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum ParseError {
    /// String is not a `YYYY-MM-DD` date.
    #[display("expected `YYYY-MM-DD` date")]
    Date,

    /// String is not a `YYYY-MM` month.
    #[display("expected `YYYY-MM` month")]
    Month,
}

/// Inclusive range of calendar [`Date`]s.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Period {
    /// First [`Date`] of this [`Period`].
    start: Date,

    /// Last [`Date`] of this [`Period`].
    end: Date,
}

impl Period {
    /// Creates a new [`Period`] spanning from `start` to `end` inclusively.
    ///
    /// [`None`] is returned if `end` precedes `start`.
    #[must_use]
    pub fn new(start: Date, end: Date) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Creates a new [`Period`] covering the whole month denoted by a
    /// `YYYY-MM` string.
    ///
    /// # Errors
    ///
    /// If the string is not a valid `YYYY-MM` month.
    pub fn month(s: &str) -> Result<Self, ParseError> {
        let (year, month) = s.split_once('-').ok_or(ParseError::Month)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(ParseError::Month);
        }
        let year: i32 = year.parse().map_err(|_| ParseError::Month)?;
        let month: u8 = month.parse().map_err(|_| ParseError::Month)?;

        let start =
            Date::from_calendar(year, month, 1).ok_or(ParseError::Month)?;
        let (next_year, next_month) =
            if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let end = Date::from_calendar(next_year, next_month, 1)
            .and_then(|d| d.0.previous_day())
            .map(Date)
            .ok_or(ParseError::Month)?;

        Ok(Self { start, end })
    }

    /// Returns the first [`Date`] of this [`Period`].
    #[must_use]
    pub fn start(&self) -> Date {
        self.start
    }

    /// Returns the last [`Date`] of this [`Period`].
    #[must_use]
    pub fn end(&self) -> Date {
        self.end
    }

    /// Indicates whether the `other` [`Period`] lies completely within this
    /// one.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use std::str::FromStr as _;

    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::Date;

    impl Serialize for Date {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Date {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let s = <std::borrow::Cow<'de, str>>::deserialize(d)?;
            Self::from_str(&s).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Date, ParseError, Period};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_formats() {
        let d = date("2025-03-01");
        assert_eq!((d.year(), d.month(), d.day()), (2025, 3, 1));
        assert_eq!(d.to_string(), "2025-03-01");

        assert_eq!("2025-3-1".parse::<Date>(), Err(ParseError::Date));
        assert_eq!("2025-02-30".parse::<Date>(), Err(ParseError::Date));
        assert_eq!("01/03/2025".parse::<Date>(), Err(ParseError::Date));
    }

    #[test]
    fn counts_calendar_boundaries() {
        assert_eq!(date("2025-01-01").months_until(date("2025-03-01")), 2);
        assert_eq!(date("2025-01-01").months_until(date("2025-01-31")), 0);
        assert_eq!(date("2025-01-31").months_until(date("2025-02-01")), 1);
        assert_eq!(date("2024-11-15").months_until(date("2025-02-15")), 3);

        assert_eq!(date("2025-01-01").years_until(date("2025-12-31")), 0);
        assert_eq!(date("2024-12-31").years_until(date("2026-01-01")), 2);
    }

    #[test]
    fn rejects_reversed_period() {
        assert!(Period::new(date("2025-02-01"), date("2025-01-01")).is_none());
        assert!(Period::new(date("2025-01-01"), date("2025-01-01")).is_some());
    }

    #[test]
    fn builds_month_period() {
        let feb = Period::month("2024-02").unwrap();
        assert_eq!(feb.start(), date("2024-02-01"));
        assert_eq!(feb.end(), date("2024-02-29"));

        let dec = Period::month("2025-12").unwrap();
        assert_eq!(dec.end(), date("2025-12-31"));

        assert_eq!(Period::month("2025-13"), Err(ParseError::Month));
        assert_eq!(Period::month("2025"), Err(ParseError::Month));
        assert_eq!(Period::month("25-01"), Err(ParseError::Month));
    }

    #[test]
    fn containment_is_inclusive() {
        let month = Period::month("2025-11").unwrap();
        let inside =
            Period::new(date("2025-11-01"), date("2025-11-30")).unwrap();
        let crossing =
            Period::new(date("2025-11-20"), date("2025-12-05")).unwrap();

        assert!(month.contains(&inside));
        assert!(!month.contains(&crossing));
    }
}
