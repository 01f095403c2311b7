//! [`Discount`] read model definition.
//!
//! [`Discount`]: crate::domain::Discount

pub mod list {
    //! [`Discount`]s list definitions.

    use common::Date;

    use crate::domain::user;
    #[cfg(doc)]
    use crate::domain::{Discount, User};

    /// Filter of a [`Discount`]s list.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// ID of the [`User`] who announced the listed [`Discount`]s.
        pub owner_id: Option<user::Id>,

        /// Indicator whether only active [`Discount`]s are listed.
        pub active_only: bool,

        /// [`Date`] the listed [`Discount`]s must be effective on.
        pub effective_on: Option<Date>,
    }
}
