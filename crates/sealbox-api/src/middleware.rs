use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use sealbox_session::SESSION_COOKIE_NAME;

use crate::auth::AppState;
use crate::cookie::cookie_value;
use crate::error::ApiError;

/// Extract and verify the session cookie, injecting the caller identity as a
/// request extension. Every failure mode (no cookie, bad signature, expired)
/// collapses into the same generic Unauthorized.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token =
        cookie_value(cookie_header, SESSION_COOKIE_NAME).ok_or(ApiError::Unauthorized)?;

    let identity = state
        .sessions
        .decrypt_session(token)
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
