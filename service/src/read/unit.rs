//! [`Unit`] read model definition.
//!
//! [`Unit`]: crate::domain::Unit

pub mod list {
    //! [`Unit`]s list definitions.

    use crate::domain::user;
    #[cfg(doc)]
    use crate::domain::{Unit, User};

    /// Filter of a [`Unit`]s list.
    ///
    /// [`Unit`]s are listed from the most recently created.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// ID of the [`User`] owning the listed [`Unit`]s.
        pub owner_id: Option<user::Id>,
    }
}
