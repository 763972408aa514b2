use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo::Role;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for role promotion.
#[derive(Debug, Deserialize)]
pub struct MakeAdminRequest {
    pub email: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MakeAdminResponse {
    pub message: String,
    pub email: String,
    pub role: Role,
}
