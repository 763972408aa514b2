use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            LoginRequest, LoginResponse, MakeAdminRequest, MakeAdminResponse, PublicUser,
            RegisterRequest,
        },
        extractors::AdminUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{Role, User},
    },
    error::ApiError,
    extract::ApiJson,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/make-admin", post(make_admin))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_string();

    let mut details = Vec::new();
    if !is_valid_email(&payload.email) {
        details.push("Invalid email".to_string());
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        details.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if !details.is_empty() {
        warn!(email = %payload.email, "register rejected");
        return Err(ApiError::BadRequest(details));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::bad_request("Email already registered"));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(PublicUser {
            id: user.id,
            email: user.email,
            role: user.role,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = payload.email.trim().to_string();

    // Unknown email and wrong password collapse into one answer so the
    // endpoint never discloses which accounts exist.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Unauthorized("Invalid credentials"));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, user.role)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        token,
        role: user.role,
        email: user.email,
    }))
}

/// Promote a user to admin. The observed system left this endpoint open;
/// here it requires an existing admin's token. The first admin is promoted
/// out-of-band (direct SQL).
#[instrument(skip(state, payload, admin))]
pub async fn make_admin(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiJson(payload): ApiJson<MakeAdminRequest>,
) -> Result<Json<MakeAdminResponse>, ApiError> {
    let email = payload.email.trim();

    let user = User::set_role(&state.db, email, Role::Admin)
        .await?
        .ok_or_else(|| ApiError::bad_request("No user with this email"))?;

    info!(
        user_id = %user.id,
        email = %user.email,
        promoted_by = %admin.0.id,
        "user promoted to admin"
    );
    Ok(Json(MakeAdminResponse {
        message: "Role updated".into(),
        email: user.email,
        role: user.role,
    }))
}
