use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use uuid::Uuid;

use super::{cookies::AUTH_COOKIE, jwt::verify_jwt_token};
use crate::{error::ApiError, state::AuthConfig};

/// Authenticated user extractor.
///
/// The access token is read from an `Authorization: Bearer` header first,
/// then from the private `auth_token` cookie. A missing or invalid token
/// rejects the request with 401. Permission checks are done separately with
/// [`PermissionGuard`](super::guard::PermissionGuard).
///
/// # Example
/// ```
/// use axum::extract::State;
/// use wms_api::{ApiState, auth::{AuthUser, Permission}, error::ApiError};
///
/// async fn list_things(
///     auth_user: AuthUser,
///     State(state): State<ApiState>,
/// ) -> Result<(), ApiError> {
///     auth_user.require(&state.pool, &[Permission::CustomersRead]).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_config = AuthConfig::from_ref(state);

        let token = match bearer_token(parts) {
            Some(token) => token,
            None => {
                let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
                    .await
                    .map_err(|_| ApiError::Auth("Failed to read cookies".to_string()))?;

                jar.get(AUTH_COOKIE)
                    .ok_or_else(|| ApiError::Auth("Not authenticated".to_string()))?
                    .value()
                    .to_owned()
            }
        };

        let claims = verify_jwt_token(&token, &auth_config.jwt_secret)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Auth("Invalid user ID in token".to_string()))?;

        Ok(Self {
            user_id,
            email: claims.email,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_is_extracted() {
        assert_eq!(
            bearer_token(&parts(Some("Bearer abc.def.ghi"))).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn test_other_schemes_are_ignored() {
        assert_eq!(bearer_token(&parts(Some("Basic dXNlcjpwYXNz"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }
}
