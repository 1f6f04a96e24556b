use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::PgPool;

use crate::{
    ApiConfig,
    config::{Environment, FacebookConfig},
    facebook::client::GraphClient,
};

#[derive(Clone)]
pub struct ApiState {
    pub pool: PgPool,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub refresh_token_expiry_days: i64,
    pub cookie_key: Key,
    pub cookie_domain: String,
    pub environment: Environment,
    pub bcrypt_cost: u32,
    pub low_stock_threshold: i32,
    pub facebook: FacebookConfig,
    pub graph: GraphClient,
}

impl ApiState {
    pub fn new(config: ApiConfig, pool: PgPool) -> anyhow::Result<Self> {
        let cookie_key = Key::try_from(config.cookie_secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid COOKIE_SECRET: {e}"))?;
        let graph = GraphClient::new(&config.facebook)?;

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret,
            jwt_expiry_hours: config.jwt_expiry_hours,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
            cookie_key,
            cookie_domain: config.cookie_domain,
            environment: config.env,
            bcrypt_cost: config.bcrypt_cost,
            low_stock_threshold: config.low_stock_threshold,
            facebook: config.facebook,
            graph,
        })
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("environment", &self.environment)
            .field("cookie_domain", &self.cookie_domain)
            .field("low_stock_threshold", &self.low_stock_threshold)
            .finish_non_exhaustive()
    }
}

/// Settings the auth extractor needs from the state
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            jwt_secret: state.jwt_secret.clone(),
        }
    }
}

impl FromRef<ApiState> for Key {
    fn from_ref(state: &ApiState) -> Self {
        state.cookie_key.clone()
    }
}
