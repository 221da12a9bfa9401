//! POST /internal/sync-costs — operator-triggered full cost re-sync
//!
//! Deliberately a separate endpoint from the signed webhook path: it is meant
//! for internal callers and is protected by a static bearer token instead of
//! a payload signature.

use axum::Json;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;

use crate::error::SyncError;
use crate::state::AppState;
use crate::sync::full::{self, SyncRunSummary};

pub async fn trigger_cost_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SyncRunSummary>, SyncError> {
    authorize(&headers, &state.sync_trigger_token)?;

    let summary = full::run_cost_sync(&state).await?;
    Ok(Json(summary))
}

fn authorize(headers: &HeaderMap, expected: &str) -> Result<(), SyncError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(SyncError::TriggerUnauthorized)?;

    if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(SyncError::TriggerUnauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_the_configured_token() {
        assert!(authorize(&headers_with("Bearer sweep-token"), "sweep-token").is_ok());
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(
            authorize(&HeaderMap::new(), "sweep-token"),
            Err(SyncError::TriggerUnauthorized)
        ));
    }

    #[test]
    fn rejects_wrong_scheme_or_token() {
        assert!(authorize(&headers_with("Basic sweep-token"), "sweep-token").is_err());
        assert!(authorize(&headers_with("Bearer other"), "sweep-token").is_err());
        assert!(authorize(&headers_with("Bearer "), "sweep-token").is_err());
    }
}
