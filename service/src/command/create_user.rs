//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Address, Email, Name, Password, Phone, Role};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Phone`] of a new [`User`].
    pub phone: Option<user::Phone>,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,

    /// [`Address`] of a new [`User`].
    pub address: Option<user::Address>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'e> Database<
            Select<By<Option<User>, &'e user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<User, user::Email>>, Err = Traced<database::Error>>
        + Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            email,
            password,
            phone,
            role,
            address,
        } = cmd;

        let password_hash = user::PasswordHash::new(password.expose_secret())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent registrations with the same `Email`.
        tx.execute(Lock(By::<User, _>::new(email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let existing = tx
            .execute(Select(By::<Option<User>, _>::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let now = DateTime::now();
        let user = User {
            id: user::Id::new(),
            name,
            email,
            password_hash,
            phone,
            role,
            address,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(user.id = %user.id, user.role = %user.role, "`User` created");

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Email`] is already occupied.
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`Password`] hashing error.
    #[display("Failed to hash a password: {_0}")]
    #[from]
    PasswordHash(#[error(not(source))] password_hash::Error),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::fixture,
        domain::user::{self, Role},
        Command as _,
    };

    use super::{CreateUser, ExecutionError};

    fn cmd(email: &str) -> CreateUser {
        CreateUser {
            name: user::Name::new("Jane Doe").unwrap(),
            email: user::Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new("s3cret-pass").unwrap(),
            )),
            phone: None,
            role: Role::Tenant,
            address: None,
        }
    }

    #[tokio::test]
    async fn creates_user_with_hashed_password() {
        let service = fixture::service();

        let user = service.execute(cmd("jane@example.com")).await.unwrap();

        assert_eq!(AsRef::<str>::as_ref(&user.email), "jane@example.com");
        assert!(user
            .password_hash
            .verify(&user::Password::new("s3cret-pass").unwrap()));
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let service = fixture::service();
        _ = service.execute(cmd("jane@example.com")).await.unwrap();

        let err = service
            .execute(cmd("JANE@example.com"))
            .await
            .unwrap_err()
            .into_inner();

        assert!(
            matches!(err, ExecutionError::EmailOccupied(_)),
            "wrong error: {err}",
        );
    }
}
