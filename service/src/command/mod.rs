//! [`Command`] definition.

pub mod accept_booking;
pub mod authorize_user_session;
pub mod confirm_booking_offline;
pub mod create_booking;
pub mod create_discount;
pub mod create_unit;
pub mod create_user;
pub mod create_user_session;
pub mod mark_unit_rented_offline;
pub mod record_payment;
pub mod reject_booking;
mod settle_booking;

#[cfg(test)]
pub(crate) mod fixture;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    accept_booking::AcceptBooking,
    authorize_user_session::AuthorizeUserSession,
    confirm_booking_offline::ConfirmBookingOffline,
    create_booking::CreateBooking, create_discount::CreateDiscount,
    create_unit::CreateUnit, create_user::CreateUser,
    create_user_session::CreateUserSession,
    mark_unit_rented_offline::MarkUnitRentedOffline,
    record_payment::RecordPayment, reject_booking::RejectBooking,
};
