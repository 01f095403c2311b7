//! Authentication endpoints.

use http::StatusCode;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{command, domain::user, Command as _};

use crate::{
    api::{self, parse, parse_opt, Json},
    define_error, AsError, Context, Error,
};

/// Request of registering a new [`api::User`].
#[derive(Clone, Debug, Deserialize)]
pub struct RegisterRequest {
    /// Name of the [`api::User`].
    pub name: String,

    /// Email to log in with.
    pub email: String,

    /// Password to log in with, 6 to 128 characters.
    pub password: String,

    /// Phone number, if any.
    pub phone: Option<String>,

    /// [`user::Role`] of the [`api::User`].
    pub role: user::Role,

    /// Postal address, if any.
    pub address: Option<String>,
}

/// Request of logging in.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    /// Email of the [`api::User`].
    pub email: String,

    /// Password of the [`api::User`].
    pub password: String,
}

/// Issued access token along with its [`api::User`].
#[derive(Clone, Debug, Serialize)]
pub struct SessionResponse {
    /// Bearer token to authorize requests with.
    pub token: String,

    /// When the `token` expires.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub expires_at: user::session::ExpirationDateTime,

    /// Authenticated [`api::User`].
    pub user: api::User,
}

impl From<command::create_user_session::Output> for SessionResponse {
    fn from(output: command::create_user_session::Output) -> Self {
        Self {
            token: output.token.to_string(),
            expires_at: output.expires_at,
            user: output.user.into(),
        }
    }
}

/// Registers a new [`api::User`] and issues its access token.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_INPUT` - malformed name, email, password or phone;
/// - `EMAIL_OCCUPIED` - provided email is used by another `User`.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "register",
        email = %req.email,
        otel.name = api::SPAN_NAME,
        role = %req.role,
    ),
)]
pub async fn register(
    ctx: Context,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), Error> {
    let RegisterRequest {
        name,
        email,
        password,
        phone,
        role,
        address,
    } = req;
    let password: user::Password = parse("password", &password)?;

    let user = ctx
        .service()
        .execute(command::CreateUser {
            name: parse("name", &name)?,
            email: parse("email", &email)?,
            password: SecretBox::init_with(move || password),
            phone: parse_opt("phone", phone.as_deref())?,
            role,
            address: parse_opt("address", address.as_deref())?,
        })
        .await
        .map_err(AsError::into_error)?;

    let output = ctx
        .service()
        .execute(command::CreateUserSession::ByUserId(user.id))
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(output.into())))
}

/// Checks the provided credentials and issues an access token.
///
/// # Errors
///
/// Possible error codes:
/// - `WRONG_CREDENTIALS` - provided credentials do not match any `User`.
#[tracing::instrument(
    skip_all,
    fields(
        api.name = "login",
        email = %req.email,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn login(
    ctx: Context,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, Error> {
    let LoginRequest { email, password } = req;
    let (Some(email), Some(password)) =
        (user::Email::new(email), user::Password::new(password))
    else {
        return Err(CredentialsError::Wrong.into());
    };

    ctx.service()
        .execute(command::CreateUserSession::ByCredentials {
            email,
            password: SecretBox::init_with(move || password),
        })
        .await
        .map(|output| Json(output.into()))
        .map_err(AsError::into_error)
}

define_error! {
    enum CredentialsError {
        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Provided credentials do not match any `User`"]
        Wrong,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "Email is occupied by another `User`"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(CredentialsError::Wrong.into())
            }
        }
    }
}
