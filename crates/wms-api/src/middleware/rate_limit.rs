//! Rate limiting for the credential endpoints.

use std::sync::Arc;

use governor::{clock::QuantaInstant, middleware::NoOpMiddleware};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

/// Seconds needed to replenish one request token on `/auth/login` and `/auth/refresh`
pub const AUTH_REPLENISH_SECONDS: u64 = 2;
/// Requests a single client may send in a burst before being limited
pub const AUTH_BURST_SIZE: u32 = 10;

/// Layer type keyed on the client IP (`X-Forwarded-For`, `X-Real-IP`,
/// `Forwarded`, then the peer address).
pub type RateLimiterLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Limiter for login and token refresh: a burst of 10, then one request
/// every 2 seconds per client. Exceeding it answers `429 Too Many Requests`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(AUTH_REPLENISH_SECONDS)
        .burst_size(AUTH_BURST_SIZE)
        .finish()
        .expect("auth rate limiter config with non-zero period and burst is valid");

    GovernorLayer::new(Arc::new(config))
}
