//! [`RentalHistory`] read model definition.
//!
//! [`RentalHistory`]: crate::domain::RentalHistory

pub mod list {
    //! [`RentalHistory`] list definitions.

    use crate::domain::user;
    #[cfg(doc)]
    use crate::domain::{RentalHistory, User};

    /// Filter of a [`RentalHistory`] list.
    ///
    /// Records are listed from the most recently created.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// ID of the [`User`] who rented.
        pub tenant_id: Option<user::Id>,
    }
}
