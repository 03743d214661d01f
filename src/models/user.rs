use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::RegisterRequest;

/// Reported when a registration collides with an existing email or username.
pub const USER_ALREADY_REGISTERED: &str = "User already registered.";

/// Corresponds to the `gender` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    /// Accepted wire values, in declaration order.
    pub const VALUES: &'static [&'static str] = &["male", "female", "unknown"];
}

/// A registered account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub name: String,
    pub birthdate: DateTime<Utc>,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new `User` from a validated registration and the password hash.
    pub fn new(input: RegisterRequest, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: input.username,
            email: input.email,
            password_hash,
            name: input.name,
            birthdate: input.birthdate,
            gender: input.gender,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when `identifier` is this user's email or username.
    pub fn matches(&self, identifier: &str) -> bool {
        self.email == identifier || self.username == identifier
    }
}
