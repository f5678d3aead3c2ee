// src/server/handlers.rs
// =============================================================================
// The POST /check-links endpoint.
//
// The handler only checks the request: it needs a non-empty "url". The
// checking itself happens in BatchChecker, and errors become JSON bodies
// through ApiError.
//
// Axum concepts:
// - Extractors: State and Json pull typed values out of the request
// - Result<Json<...>, JsonRejection>: taking the rejection ourselves lets
//   bad JSON get the same { "error": ... } shape as every other error
// =============================================================================

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::dto::{CheckLinksRequest, CheckLinksResponse};
use super::error::ApiError;
use super::AppState;

/// Checks every link on the page at `url`.
///
/// # Endpoint
///
/// `POST /check-links`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "total_links": 3,
///   "summary": { "total": 3, "working": 1, "broken": 2 },
///   "broken_links": [
///     { "url": "https://example.com/missing", "status": 404, "message": "HTTP 404" },
///     { "url": "https://linkedin.com/in/someone", "status": "Restricted", "message": "Domain blocks automated checks" }
///   ],
///   "working_links": [
///     { "url": "https://example.com/ok", "status": 200, "message": "HTTP 200" }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - 400 when the body is not JSON, `url` is missing/empty or not an http(s) URL
/// - 502 when the page itself cannot be fetched
/// - 504 when the check runs past its deadline
pub async fn check_links_handler(
    State(state): State<AppState>,
    payload: Result<Json<CheckLinksRequest>, JsonRejection>,
) -> Result<Json<CheckLinksResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let url = request
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::bad_request("URL is required"))?;

    let report = state.checker.check(url).await?;

    Ok(Json(CheckLinksResponse::from(&report)))
}
