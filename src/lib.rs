#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "This crate contains the request pipeline of the task API: schema validation,"]
#![doc = "the error taxonomy and its translation, token authentication, the response"]
#![doc = "envelope, persistence, and the route handlers that tie them together."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

pub use crate::error::AppError;
pub use crate::response::Envelope;
pub use crate::state::AppState;
