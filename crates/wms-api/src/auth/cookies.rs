use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::Environment;

pub const AUTH_COOKIE: &str = "auth_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Cookie carrying the access token.
///
/// HttpOnly and `SameSite=Lax`; `Secure` everywhere except development,
/// which runs over plain HTTP.
pub fn create_auth_cookie(
    token: String,
    environment: Environment,
    expiry_hours: i64,
    cookie_domain: &str,
) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .max_age(time::Duration::hours(expiry_hours))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!environment.is_development())
        .domain(cookie_domain.to_string())
        .build()
}

/// Cookie carrying the opaque refresh token, scoped to the auth routes.
pub fn create_refresh_token_cookie(
    token: String,
    environment: Environment,
    expiry_days: i64,
    cookie_domain: &str,
) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/auth")
        .max_age(time::Duration::days(expiry_days))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(!environment.is_development())
        .domain(cookie_domain.to_string())
        .build()
}

/// Cookies that, once removed from the jar, clear both tokens in the browser.
pub fn removal_cookies(cookie_domain: &str) -> [Cookie<'static>; 2] {
    [
        Cookie::build(AUTH_COOKIE)
            .path("/")
            .domain(cookie_domain.to_string())
            .build(),
        Cookie::build(REFRESH_COOKIE)
            .path("/auth")
            .domain(cookie_domain.to_string())
            .build(),
    ]
}
