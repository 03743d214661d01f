pub mod extractors;
pub mod password;
pub mod token;

use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::config::Config;
use crate::models::user::Gender;
use crate::validation::{Field, Schema};

// Re-export necessary items
pub use extractors::{authenticate, Identity, ACCESS_TOKEN_COOKIE};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService, TOKEN_TTL_DAYS};

lazy_static! {
    static ref UPPERCASE_REGEX: Regex = Regex::new(r"[A-Z]").unwrap();

    /// Rules for `POST /api/auth/login`.
    pub static ref LOGIN_SCHEMA: Schema = Schema::new()
        .field(
            Field::text("identifier")
                .required("Email or Username is required.")
                .min_length(3, "Email or Username must be at least 3 characters long."),
        )
        .field(
            Field::text("password")
                .required("Password is required.")
                .min_length(6, "Password must be at least 6 characters long."),
        );

    /// Rules for `POST /api/auth/register`.
    pub static ref REGISTER_SCHEMA: Schema = Schema::new()
        .field(
            Field::text("username")
                .required("Username is required.")
                .min_length(3, "Username must be at least 3 characters long.")
                .max_length(20, "Username must be at most 20 characters long."),
        )
        .field(
            Field::text("email")
                .required("Email is required.")
                .email("Invalid email address."),
        )
        .field(
            Field::text("password")
                .required("Password is required.")
                .min_length(6, "Password must be at least 6 characters long.")
                .pattern(
                    UPPERCASE_REGEX.clone(),
                    "Password must contain at least one uppercase letter.",
                ),
        )
        .field(
            Field::text("name")
                .required("Name is required.")
                .max_length(50, "Name must be at most 50 characters long."),
        )
        .field(
            Field::date("birthdate")
                .required("Birthdate is required.")
                .type_message("Invalid date."),
        )
        .field(
            Field::one_of("gender", Gender::VALUES).required("Gender is required."),
        );
}

/// Validated payload of a login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address or username.
    pub identifier: String,
    pub password: String,
}

/// Validated payload of a registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub birthdate: DateTime<Utc>,
    pub gender: Gender,
}

/// Builds the cookie that carries the access token back to the client.
///
/// `httpOnly` always, `secure` only in production, expiring together with
/// the token.
pub fn access_token_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(config.environment.is_production())
        .max_age(CookieDuration::days(TOKEN_TTL_DAYS))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::validation::validate;
    use serde_json::json;

    fn issues(result: Result<impl std::fmt::Debug, AppError>) -> Vec<String> {
        match result {
            Err(AppError::Validation { issues }) => issues,
            other => panic!("Expected a validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_login_request_validation() {
        let valid = json!({ "identifier": "test@example.com", "password": "password123" });
        let login: LoginRequest = validate(&valid, &LOGIN_SCHEMA).unwrap();
        assert_eq!(login.identifier, "test@example.com");

        let short = json!({ "identifier": "ab", "password": "123" });
        assert_eq!(
            issues(validate::<LoginRequest>(&short, &LOGIN_SCHEMA)),
            vec![
                "Email or Username must be at least 3 characters long.",
                "Password must be at least 6 characters long.",
            ]
        );

        let missing = json!({ "identifier": "test@example.com" });
        assert_eq!(
            issues(validate::<LoginRequest>(&missing, &LOGIN_SCHEMA)),
            vec!["Password is required."]
        );
    }

    #[test]
    fn test_register_request_validation() {
        let valid = json!({
            "username": "test_user-123",
            "email": "test@example.com",
            "password": "Password123",
            "name": "Test User",
            "birthdate": "2000-01-01",
            "gender": "unknown"
        });
        let register: RegisterRequest = validate(&valid, &REGISTER_SCHEMA).unwrap();
        assert_eq!(register.gender, Gender::Unknown);
        assert_eq!(register.birthdate.to_rfc3339(), "2000-01-01T00:00:00+00:00");

        let invalid = json!({
            "username": "tu",
            "email": "testexample.com",
            "password": "password",
            "name": "n".repeat(51),
            "birthdate": "yesterday",
            "gender": "other"
        });
        assert_eq!(
            issues(validate::<RegisterRequest>(&invalid, &REGISTER_SCHEMA)),
            vec![
                "Username must be at least 3 characters long.",
                "Invalid email address.",
                "Password must contain at least one uppercase letter.",
                "Name must be at most 50 characters long.",
                "Invalid date.",
                "Invalid enum value. Expected 'male' | 'female' | 'unknown', received 'other'",
            ]
        );
    }

    #[test]
    fn test_access_token_cookie() {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("secret".into()),
            "APP_ENV" => Some("production".into()),
            _ => None,
        })
        .unwrap();

        let cookie = access_token_cookie("token".into(), &config);
        assert_eq!(cookie.name(), "accessToken");
        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(7)));
    }
}
