use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::store::Store;

/// Everything a request may read, built once at startup and shared through
/// `web::Data`. Nothing in here is mutated after construction.
pub struct AppState {
    pub config: Config,
    pub tokens: TokenService,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let tokens = TokenService::new(&config.jwt_secret);
        Self {
            config,
            tokens,
            store,
        }
    }
}
