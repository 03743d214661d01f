pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{web, HttpResponse};

use crate::error::AppError;

/// Registers every API route under `/api`.
///
/// The caller supplies `web::Data<AppState>` and should also install
/// [`not_found`] as the app's default service so paths outside `/api` get the
/// same envelope.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .service(web::resource("/health").to(health::health))
            .service(
                web::scope("/auth")
                    .service(auth::login)
                    .service(auth::register),
            )
            .service(
                web::scope("/tasks")
                    .service(tasks::get_tasks)
                    .service(tasks::create_task)
                    .service(tasks::get_task)
                    .service(tasks::update_task)
                    .service(tasks::delete_task),
            )
            .default_service(web::to(not_found)),
    );
}

/// Body extraction failures go through the error translator like any other
/// failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| AppError::from(err).into())
}

/// Fallback for unknown paths and methods.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Not found.".into()))
}
