use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    routing::{get, post},
};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use super::{
    cookies::{self, REFRESH_COOKIE},
    guard::PermissionGuard,
    jwt,
    middleware::AuthUser,
    models::{AuthResponse, LoginRequest, MeResponse, RefreshRequest, TokenResponse},
    refresh_token as rt, service,
};
use crate::{
    ApiState, error::ApiError, metrics::record_auth_event, middleware::rate_limit,
};
use validator::Validate;
use wms_db::repositories::user as user_repo;

pub fn routes() -> Router<ApiState> {
    let credential_routes = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .layer(rate_limit::auth_rate_limiter());

    Router::new()
        .merge(credential_routes)
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        // `to_str` only accepts visible ASCII, so byte slicing is safe
        .map(|v| &v[..v.len().min(255)])
}

fn client_ip(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

async fn login(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<(PrivateCookieJar, Json<AuthResponse>), ApiError> {
    payload.validate()?;

    let credentials = match service::authenticate(&state.pool, &payload.login, &payload.password)
        .await
    {
        Ok(credentials) => credentials,
        Err(e) => {
            record_auth_event("login", false);
            return Err(e);
        }
    };

    let user = user_repo::find_by_id(&state.pool, credentials.id)
        .await?
        .ok_or_else(|| ApiError::Auth("User not found".to_string()))?;

    let token = jwt::generate_jwt_token(
        user.id,
        user.email.clone(),
        &state.jwt_secret,
        state.jwt_expiry_hours,
    )?;
    let refresh_token = rt::issue_refresh_token(
        &state.pool,
        user.id,
        user_agent(&headers),
        client_ip(&headers),
        state.refresh_token_expiry_days,
    )
    .await?;

    let jar = jar
        .add(cookies::create_auth_cookie(
            token.clone(),
            state.environment,
            state.jwt_expiry_hours,
            &state.cookie_domain,
        ))
        .add(cookies::create_refresh_token_cookie(
            refresh_token.clone(),
            state.environment,
            state.refresh_token_expiry_days,
            &state.cookie_domain,
        ));

    record_auth_event("login", true);
    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        jar,
        Json(AuthResponse {
            token,
            refresh_token,
            token_type: "Bearer",
            expires_in: state.jwt_expiry_hours * 3600,
            user,
        }),
    ))
}

async fn refresh(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(PrivateCookieJar, Json<TokenResponse>), ApiError> {
    let presented = body
        .and_then(|Json(body)| body.refresh_token)
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned()))
        .ok_or_else(|| ApiError::Auth("No refresh token found".to_string()))?;

    let (user_id, new_refresh_token) = match rt::verify_and_rotate_refresh_token(
        &state.pool,
        &presented,
        state.refresh_token_expiry_days,
    )
    .await
    {
        Ok(rotated) => rotated,
        Err(e) => {
            record_auth_event("refresh", false);
            return Err(e);
        }
    };

    let user = user_repo::find_by_id(&state.pool, user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::Auth("User not found or disabled".to_string()))?;

    let token = jwt::generate_jwt_token(
        user.id,
        user.email,
        &state.jwt_secret,
        state.jwt_expiry_hours,
    )?;

    let jar = jar
        .add(cookies::create_auth_cookie(
            token.clone(),
            state.environment,
            state.jwt_expiry_hours,
            &state.cookie_domain,
        ))
        .add(cookies::create_refresh_token_cookie(
            new_refresh_token.clone(),
            state.environment,
            state.refresh_token_expiry_days,
            &state.cookie_domain,
        ));

    record_auth_event("refresh", true);

    Ok((
        jar,
        Json(TokenResponse {
            token,
            refresh_token: new_refresh_token,
            token_type: "Bearer",
            expires_in: state.jwt_expiry_hours * 3600,
        }),
    ))
}

async fn logout(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(PrivateCookieJar, Json<serde_json::Value>), ApiError> {
    let presented = body
        .and_then(|Json(body)| body.refresh_token)
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned()));

    if let Some(token) = presented {
        rt::revoke_refresh_token(&state.pool, &token).await?;
    }

    let jar = cookies::removal_cookies(&state.cookie_domain)
        .into_iter()
        .fold(jar, |jar, cookie| jar.remove(cookie));

    record_auth_event("logout", true);

    Ok((jar, Json(json!({ "message": "Logged out successfully" }))))
}

async fn me(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<MeResponse>, ApiError> {
    let authorized = PermissionGuard::new(&state.pool, &auth_user).load().await?;

    Ok(Json(MeResponse {
        user: authorized.user,
        permissions: authorized.permissions.into_iter().collect(),
    }))
}
