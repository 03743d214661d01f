use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::token::TokenService;
use crate::error::{AppError, INVALID_CREDENTIALS};
use crate::state::AppState;

/// Name of the cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// The user resolved from a verified access token.
///
/// Lives for one request only. Protected handlers take it as their first
/// argument; if the credential is missing or invalid the extractor fails and
/// the handler never runs. Handlers that do not ask for an `Identity` are
/// never gated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// Reads the access token cookie and verifies it.
pub fn authenticate(req: &HttpRequest, tokens: &TokenService) -> Result<Identity, AppError> {
    let cookie = req
        .cookie(ACCESS_TOKEN_COOKIE)
        .filter(|cookie| !cookie.value().is_empty())
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    tokens.verify(cookie.value())
}

impl FromRequest for Identity {
    type Error = ActixError; // AppError is converted through ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => authenticate(req, &state.tokens),
            None => Err(AppError::unexpected(
                "AppState is not registered; cannot authenticate request",
            )),
        };
        ready(result.map_err(Into::into))
    }
}
