#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::NormalizePath;
use actix_web::{test, web, App, Error};
use serde_json::{json, Value};
use taskgate::auth::ACCESS_TOKEN_COOKIE;
use taskgate::config::Config;
use taskgate::routes;
use taskgate::state::AppState;
use taskgate::store::MemoryStore;

pub const PASSWORD: &str = "Password123";

/// Fresh state on an empty in-memory store, with the cheapest bcrypt cost.
pub fn test_state() -> web::Data<AppState> {
    let config = Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some("integration_test_secret".to_string()),
        "APP_ENV" => Some("test".to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("Test configuration should be valid");

    web::Data::new(AppState::new(config, Arc::new(MemoryStore::new())))
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(NormalizePath::trim())
            .configure(routes::config)
            .default_service(web::to(routes::not_found)),
    )
    .await
}

pub fn register_payload(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": PASSWORD,
        "name": "Integration User",
        "birthdate": "1990-05-17",
        "gender": "female"
    })
}

pub async fn register<S>(app: &S, username: &str, email: &str)
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(register_payload(username, email))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert_eq!(
        status,
        actix_web::http::StatusCode::CREATED,
        "Registration failed. Body: {:?}",
        String::from_utf8_lossy(&body)
    );
}

/// Logs in and returns the access token cookie from the response.
pub async fn login<S>(app: &S, identifier: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "identifier": identifier, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.into_owned())
        .expect("Login should set the access token cookie")
}

pub async fn register_and_login<S>(app: &S, username: &str, email: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    register(app, username, email).await;
    login(app, email).await
}
