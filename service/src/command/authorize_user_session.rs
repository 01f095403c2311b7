//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a [`Session`] token.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        // Signature and expiration are checked here.
        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        drop(
            self.database()
                .execute(Select(By::new(session.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(session.user_id))
                .map_err(tracerr::wrap!())?,
        );

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{DateTime, DateTimeOf};
    use jsonwebtoken::{EncodingKey, Header};

    use crate::{
        command::fixture,
        domain::user::{self, session::Token, Role, Session},
        Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    /// Signs the provided [`Session`] claims with the provided `secret`.
    #[expect(unsafe_code, reason = "signed right here")]
    fn sign(session: &Session, secret: &[u8]) -> Token {
        let token = jsonwebtoken::encode(
            &Header::default(),
            session,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();
        // SAFETY: Produced by `jsonwebtoken::encode()` above.
        unsafe { Token::new_unchecked(token) }
    }

    /// Creates [`Session`] claims expiring in `secs` seconds from now.
    fn session(user_id: user::Id, role: Role, secs: i64) -> Session {
        Session {
            user_id,
            role,
            expires_at: DateTimeOf::from_unix_timestamp(
                DateTime::now().unix_timestamp() + secs,
            )
            .unwrap(),
        }
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let service = fixture::service();
        let owner = fixture::user(&service, Role::Owner).await;

        let authorized = service
            .execute(AuthorizeUserSession {
                token: sign(&session(owner.id, Role::Owner, 600), b"spec"),
            })
            .await
            .unwrap();

        assert_eq!(authorized.user_id, owner.id);
        assert_eq!(authorized.role, Role::Owner);
    }

    #[tokio::test]
    async fn rejects_malformed_token() {
        let service = fixture::service();

        #[expect(unsafe_code, reason = "malformed on purpose")]
        // SAFETY: Only checks rejection of an invalid token.
        let token = unsafe { Token::new_unchecked("not.a.jwt".into()) };
        let err = service
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err()
            .into_inner();

        assert!(matches!(err, ExecutionError::JsonWebTokenDecodeError(_)));
    }

    #[tokio::test]
    async fn rejects_token_signed_by_another_secret() {
        let service = fixture::service();
        let owner = fixture::user(&service, Role::Owner).await;

        let err = service
            .execute(AuthorizeUserSession {
                token: sign(&session(owner.id, Role::Owner, 600), b"forged"),
            })
            .await
            .unwrap_err()
            .into_inner();

        assert!(matches!(err, ExecutionError::JsonWebTokenDecodeError(_)));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let service = fixture::service();
        let tenant = fixture::user(&service, Role::Tenant).await;

        let err = service
            .execute(AuthorizeUserSession {
                token: sign(&session(tenant.id, Role::Tenant, -3600), b"spec"),
            })
            .await
            .unwrap_err()
            .into_inner();

        assert!(matches!(err, ExecutionError::JsonWebTokenDecodeError(_)));
    }

    #[tokio::test]
    async fn rejects_token_of_missing_user() {
        let service = fixture::service();

        let err = service
            .execute(AuthorizeUserSession {
                token: sign(&session(user::Id::new(), Role::Admin, 600), b"spec"),
            })
            .await
            .unwrap_err()
            .into_inner();

        assert!(matches!(err, ExecutionError::UserNotExists(_)));
    }
}
