use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{http::header, web, App, HttpServer};
use dotenv::dotenv;
use taskgate::config::Config;
use taskgate::routes;
use taskgate::state::AppState;
use taskgate::store::{MemoryStore, PgStore, Store};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await.map_err(|e| {
                log::error!("Failed to connect to database: {}", e);
                io::Error::new(io::ErrorKind::Other, e.to_string())
            })?;
            log::info!("Connected to database");
            Arc::new(store)
        }
        None => {
            log::warn!("DATABASE_URL is not set, data will be kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let bind_address = (config.server_host.clone(), config.server_port);
    let cors_origin = config.cors_origin.clone();
    log::info!("Starting server at {}", config.server_url());

    let state = web::Data::new(AppState::new(config, store));

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .supports_credentials()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(NormalizePath::trim())
            .wrap(cors)
            .wrap(Logger::new("%r %s %b - %D ms"))
            .configure(routes::config)
            .default_service(web::to(routes::not_found))
    })
    .bind(&bind_address)
    .map_err(|e| {
        log::error!("Failed to bind {}:{}: {}", bind_address.0, bind_address.1, e);
        e
    })?
    .run()
    .await
}
