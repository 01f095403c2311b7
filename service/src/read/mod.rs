//! Read entities definitions.

pub mod booking;
pub mod discount;
pub mod rental_history;
pub mod unit;
