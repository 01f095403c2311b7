//! [`User`] representation.

use serde::Serialize;
use service::domain::{self, user};

/// Registered person: a tenant, an owner or an admin.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    /// ID of this [`User`].
    pub id: user::Id,

    /// Name of this [`User`].
    pub name: String,

    /// Email this [`User`] logs in with.
    pub email: String,

    /// Phone number of this [`User`], if any.
    pub phone: Option<String>,

    /// [`user::Role`] of this [`User`].
    pub role: user::Role,

    /// Postal address of this [`User`], if any.
    pub address: Option<String>,

    /// When this [`User`] was registered.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: user::CreationDateTime,

    /// When this [`User`] was last modified.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: user::ModificationDateTime,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        let domain::User {
            id,
            name,
            email,
            password_hash: _,
            phone,
            role,
            address,
            created_at,
            updated_at,
        } = user;

        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.map(|p| p.to_string()),
            role,
            address: address.map(|a| a.to_string()),
            created_at,
            updated_at,
        }
    }
}
