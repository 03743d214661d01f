use crate::{
    auth::{
        access_token_cookie, hash_password, verify_password, Identity, LoginRequest,
        RegisterRequest, LOGIN_SCHEMA, REGISTER_SCHEMA,
    },
    error::AppError,
    models::{user::USER_ALREADY_REGISTERED, User},
    response::Envelope,
    state::AppState,
    validation::validate,
};
use actix_web::{post, web, HttpResponse};
use serde_json::Value;

/// Register a new user
///
/// Validates the payload, rejects an email or username that is already
/// taken, and stores the account with a bcrypt hash of the password.
///
/// ## Responses:
/// - `201 Created`: account created, no data.
/// - `400 Bad Request`: validation issues, or "User already registered.".
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<Envelope, AppError> {
    let input: RegisterRequest = validate(&body.into_inner(), &REGISTER_SCHEMA)?;

    if state
        .store
        .find_user_by_email_or_username(&input.email, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(USER_ALREADY_REGISTERED.into()));
    }

    let password_hash = hash_password(&input.password, state.config.bcrypt_cost)?;
    let user = state.store.create_user(User::new(input, password_hash)).await?;

    log::info!("User [{}] has been created.", user.id);

    Ok(Envelope::created("User has been created successfully.", None))
}

/// Login user
///
/// Checks the password of the user matching `identifier` (email or username)
/// and, on success, sets the `accessToken` cookie.
///
/// ## Responses:
/// - `200 OK`: cookie set, no data.
/// - `400 Bad Request`: validation issues.
/// - `401 Unauthorized`: wrong password.
/// - `404 Not Found`: no such user.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let input: LoginRequest = validate(&body.into_inner(), &LOGIN_SCHEMA)?;

    let user = state
        .store
        .find_user_by_identifier(&input.identifier)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".into()))?;

    if !verify_password(&input.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials.".into()));
    }

    let token = state.tokens.sign(&Identity {
        id: user.id,
        email: user.email,
    })?;

    let envelope = Envelope::ok("Login successfully.", None);
    Ok(HttpResponse::build(envelope.status())
        .cookie(access_token_cookie(token, &state.config))
        .json(envelope))
}
