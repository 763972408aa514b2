use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a path segment as a record id. Malformed input is a client fault
/// (400 `Invalid id`), distinct from a well-formed id that matches nothing.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId)
}

/// `Json<T>` with rejections mapped into the uniform error envelope, so a
/// malformed body yields the same `{error, details}` shape as any other
/// validation failure instead of axum's plain-text rejection.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rej: JsonRejection| ApiError::BadRequest(vec![rej.body_text()]))?;
        Ok(ApiJson(value))
    }
}
