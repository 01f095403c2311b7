//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{marker::Expiration, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Authenticated [`User`] session, encoded as [JWT] claims.
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    #[serde(rename = "sub")]
    pub user_id: user::Id,

    /// [`user::Role`] of the [`User`] at the moment of authentication.
    pub role: user::Role,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// Indicates whether this [`Session`] is granted one of the provided
    /// [`user::Role`]s.
    #[must_use]
    pub fn has_any_role(&self, roles: &[user::Role]) -> bool {
        roles.contains(&self.role)
    }
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, Expiration)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::user::{self, Role};

    use super::Session;

    #[test]
    fn checks_granted_roles() {
        let tenant = Session {
            user_id: user::Id::new(),
            role: Role::Tenant,
            expires_at: DateTime::now().coerce(),
        };

        assert!(!tenant.has_any_role(&[Role::Owner, Role::Admin]));
        assert!(tenant.has_any_role(&[Role::Tenant]));
        assert!(!tenant.has_any_role(&[]));
    }
}
