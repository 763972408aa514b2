use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error taxonomy for the whole API. Malformed identifiers and absent
/// records stay distinct kinds internally even though both surface as
/// client-side 4xx responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Forbidden (admin only)")]
    Forbidden,

    #[error("Bad Request")]
    BadRequest(Vec<String>),

    #[error("Invalid id")]
    InvalidId,

    #[error("Not Found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        ApiError::BadRequest(vec![detail.into()])
    }
}

/// Uniform error envelope: `{error, details?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: msg.to_string(),
                    details: None,
                },
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    error: "Forbidden (admin only)".into(),
                    details: None,
                },
            ),
            ApiError::BadRequest(details) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Bad Request".into(),
                    details: Some(details),
                },
            ),
            ApiError::InvalidId => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Invalid id".into(),
                    details: None,
                },
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "Not Found".into(),
                    details: None,
                },
            ),
            ApiError::Internal(e) => {
                // Full detail stays server-side.
                error!(error = ?e, "unhandled internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Server error".into(),
                        details: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_lists_every_detail() {
        let err = ApiError::BadRequest(vec![
            "rating must be between 1 and 5".into(),
            "comment is required (min 2 chars)".into(),
        ]);
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body_json(res).await;
        assert_eq!(json["error"], "Bad Request");
        assert_eq!(json["details"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn internal_error_never_leaks_detail() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3:5432"));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(res).await;
        assert_eq!(json["error"], "Server error");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn invalid_id_and_not_found_stay_distinct() {
        let invalid = ApiError::InvalidId.into_response();
        let absent = ApiError::NotFound.into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(absent.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(invalid).await["error"], "Invalid id");
        assert_eq!(body_json(absent).await["error"], "Not Found");
    }
}
