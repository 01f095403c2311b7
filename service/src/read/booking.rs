//! [`Booking`] read model definition.
//!
//! [`Booking`]: crate::domain::Booking

pub mod list {
    //! [`Booking`]s list definitions.

    use crate::domain::{booking, user};
    #[cfg(doc)]
    use crate::domain::{Booking, Unit, User};

    /// Filter of a [`Booking`]s list.
    ///
    /// [`Booking`]s are listed from the most recently created.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// ID of the [`User`] renting.
        pub tenant_id: Option<user::Id>,

        /// ID of the [`User`] owning the booked [`Unit`]s.
        pub owner_id: Option<user::Id>,

        /// [`booking::Status`] of the listed [`Booking`]s.
        pub status: Option<booking::Status>,

        /// Maximum number of the listed [`Booking`]s.
        pub limit: Option<usize>,
    }
}
