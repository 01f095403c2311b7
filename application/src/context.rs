//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::user::{self, session, Session},
};
use tokio::sync::OnceCell;

use crate::{define_error, AsError, Error, Service};

/// Request context.
///
/// Extracted from every request, provides the [`Service`] and lazily
/// authenticates the [`Session`] of the caller.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Parts of the HTTP request.
    parts: http::request::Parts,

    /// Current [`Session`].
    current_session: OnceCell<Session>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the current [`Session`] for this [`Context`].
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the provided authentication token is invalid or expired.
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.current_session
            .get_or_try_init(|| self.do_authentication())
            .await
            .copied()
    }

    /// Returns the current [`Session`] if it has one of the provided
    /// [`user::Role`]s.
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the [`Session`] has none of the `roles`.
    pub async fn authorize(
        &self,
        roles: &[user::Role],
    ) -> Result<Session, Error> {
        let session = self.current_session().await?;
        if !session.has_any_role(roles) {
            tracing::debug!(
                user_id = %session.user_id,
                role = %session.role,
                "insufficient role",
            );
            return Err(AuthError::InsufficientRole.into());
        }
        Ok(session)
    }

    /// Performs the [`Session`] authentication.
    ///
    /// # Errors
    ///
    /// Errors if the provided authentication token is invalid.
    async fn do_authentication(&self) -> Result<Session, Error> {
        let res = self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await;
        match res {
            Ok(TypedHeader(Authorization(bearer))) => {
                #[expect(unsafe_code, reason = "specified in correct header")]
                let token = unsafe {
                    session::Token::new_unchecked(bearer.token().to_owned())
                };
                self.service
                    .execute(command::AuthorizeUserSession { token })
                    .await
                    .map_err(AsError::into_error)
            }
            Err(e) => {
                if e.is_missing() {
                    Err(AuthError::AuthorizationRequired.into())
                } else {
                    Err(e.into_error())
                }
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        Ok(Self {
            service,
            parts: parts.clone(),
            current_session: OnceCell::new(),
        })
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::UserNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Valid authorization token required"]
        AuthorizationRequired,

        #[code = "INSUFFICIENT_ROLE"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` has no privilege for this action"]
        InsufficientRole,
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use service::{
        domain::user::{self, Role, Session},
        infra::Postgres,
    };
    use tokio::sync::OnceCell;

    use crate::{Config, Service};

    use super::Context;

    /// Creates a [`Context`] of a request without any headers, authenticated
    /// with the provided [`Session`], if any.
    fn context(session: Option<Session>) -> Context {
        let conf = Config::default();
        // Connections are established lazily, so none is made here.
        let postgres = Postgres::new(&conf.postgres.into()).unwrap();
        let (parts, ()) = http::Request::new(()).into_parts();

        Context {
            service: Service::new(conf.service.into(), postgres),
            parts,
            current_session: OnceCell::new_with(session),
        }
    }

    fn session(role: Role) -> Session {
        Session {
            user_id: user::Id::new(),
            role,
            expires_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn tenant_has_insufficient_role() {
        let ctx = context(Some(session(Role::Tenant)));

        let err = ctx
            .authorize(&[Role::Owner, Role::Admin])
            .await
            .unwrap_err();

        assert_eq!(err.code, "INSUFFICIENT_ROLE");
        assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn owner_is_authorized() {
        let owner = session(Role::Owner);
        let ctx = context(Some(owner));

        let authorized =
            ctx.authorize(&[Role::Owner, Role::Admin]).await.unwrap();

        assert_eq!(authorized.user_id, owner.user_id);
    }

    #[tokio::test]
    async fn missing_token_requires_authorization() {
        let ctx = context(None);

        let err = ctx.current_session().await.unwrap_err();

        assert_eq!(err.code, "AUTHORIZATION_REQUIRED");
        assert_eq!(err.status_code, http::StatusCode::UNAUTHORIZED);
    }
}
