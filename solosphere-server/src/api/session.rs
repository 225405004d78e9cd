//! Session API Handlers
//!
//! Token issuance, logout, and the extractor that resolves the caller from
//! the session cookie.

use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{HeaderMap, HeaderValue, header::SET_COOKIE, request::Parts},
    response::IntoResponse,
};
use cookie::Cookie;
use solosphere_core::dto::session::{SessionResponse, TokenRequest};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::auth::cookies::{extract_session_token, logout_cookie, session_cookie};
use crate::auth::{AuthError, Identity};

// =============================================================================
// Caller Extraction
// =============================================================================

/// Identity verified from the request's session cookie
///
/// Rejects with 401 when the cookie is absent or the token does not verify.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Identity);

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_session_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let identity = state.auth.verify(&token)?;
        Ok(CallerIdentity(identity))
    }
}

// =============================================================================
// Session Endpoints
// =============================================================================

/// POST /jwt
/// Issue a session token and set it as an HttpOnly cookie
pub async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!("Issuing session for {}", req.email);

    let token = state.auth.issue(&req)?;
    let headers = set_cookie_headers(session_cookie(&token, &state.cookies))?;

    Ok((headers, Json(SessionResponse { success: true })))
}

/// POST /logOut
/// Clear the session cookie
pub async fn log_out(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let headers = set_cookie_headers(logout_cookie(&state.cookies))?;
    Ok((headers, Json(SessionResponse { success: true })))
}

fn set_cookie_headers(cookie: Cookie<'static>) -> ApiResult<HeaderMap> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| ApiError::InternalError(format!("Invalid cookie header: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value);
    Ok(headers)
}
