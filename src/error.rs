//! Unified service error for the sync engine
//!
//! Maps every failure onto the HTTP contract the upstream platform's retry
//! policy keys off: rejections and processing failures answer 400 so webhook
//! redelivery engages; an overlapping sweep answers 409; the internal trigger
//! without a valid token answers 401.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid sync trigger token")]
    TriggerUnauthorized,

    #[error("cost sync already in progress")]
    SyncInProgress,

    #[error("upstream api: {0}")]
    Upstream(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl SyncError {
    pub fn status(&self) -> StatusCode {
        match self {
            SyncError::TriggerUnauthorized => StatusCode::UNAUTHORIZED,
            SyncError::SyncInProgress => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::Upstream(e.to_string())
    }
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = %status, error = %self, "Request failed");
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_are_bad_request() {
        assert_eq!(
            SyncError::MissingHeader("x-shopify-topic").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(SyncError::InvalidSignature.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            SyncError::Upstream("timeout".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn trigger_paths_have_their_own_statuses() {
        assert_eq!(
            SyncError::TriggerUnauthorized.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(SyncError::SyncInProgress.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn messages_name_the_missing_header() {
        let err = SyncError::MissingHeader("x-shopify-hmac-sha256");
        assert_eq!(err.to_string(), "missing x-shopify-hmac-sha256 header");
    }
}
