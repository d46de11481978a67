use chrono::Duration;
use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::Gateway;

/// Everything a handler may depend on, passed explicitly through axum state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>, tokens: TokenIssuer) -> Self {
        Self { gateway, tokens }
    }

    pub fn from_config(config: &AppConfig, gateway: Arc<dyn Gateway>) -> Self {
        let tokens = TokenIssuer::new(
            &config.security.jwt_secret,
            Duration::minutes(config.security.jwt_expiry_minutes),
        );
        Self::new(gateway, tokens)
    }
}
