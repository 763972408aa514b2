use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::Role;
use crate::error::ApiError;

/// Authentication stage of the gate: a verified Bearer token.
#[derive(Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized("Unauthorized (no token)"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Unauthorized (no token)"))?;

        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthorized("Unauthorized (invalid token)")
        })?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Authorization stage: an authenticated user whose role is admin.
#[derive(Debug)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            warn!(user_id = %user.id, "non-admin attempted admin operation");
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::{header::AUTHORIZATION, Request};

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/cars");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    fn token_for(state: &AppState, role: Role) -> String {
        let keys = JwtKeys::from_ref(state);
        keys.sign(Uuid::new_v4(), "someone@example.com", role)
            .expect("sign")
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized("Unauthorized (no token)")));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwdw=="));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Bearer garbage"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized("Unauthorized (invalid token)")));
    }

    #[tokio::test]
    async fn regular_user_is_forbidden_from_admin_gate() {
        let state = AppState::fake();
        let token = token_for(&state, Role::User);
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[tokio::test]
    async fn admin_passes_both_stages() {
        let state = AppState::fake();
        let token = token_for(&state, Role::Admin);
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let AdminUser(user) = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .expect("admin should pass");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.email, "someone@example.com");
    }
}
