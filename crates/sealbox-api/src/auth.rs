use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use uuid::Uuid;

use sealbox_db::Database;
use sealbox_db::models::AccountRow;
use sealbox_engine::IntegrityEngine;
use sealbox_session::SessionManager;
use sealbox_types::api::{AuthResponse, LoginRequest, OkResponse, RegisterRequest};
use sealbox_types::models::Role;

use crate::cookie::{clear_session_cookie, session_cookie};
use crate::error::{ApiError, join_error};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub engine: IntegrityEngine,
    pub sessions: SessionManager,
    pub secure_cookies: bool,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !req.email.contains('@') || req.password.chars().count() < 6 {
        return Err(ApiError::Validation(
            "Invalid email or password (min 6 chars)".to_string(),
        ));
    }

    let db = state.db.clone();
    let email = req.email.clone();
    let existing = tokio::task::spawn_blocking(move || db.find_account_by_email(&email))
        .await
        .map_err(join_error)??;
    if existing.is_some() {
        return Err(ApiError::EmailTaken);
    }

    let user_id = Uuid::new_v4().to_string();

    // scrypt is deliberately slow; keep it off the async runtime along with
    // the insert.
    let db = state.db.clone();
    let (id, email, password) = (user_id.clone(), req.email.clone(), req.password.clone());
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let password_hash = sealbox_session::hash_password(&password)?;
        db.create_account(&id, &email, &password_hash, Role::User.as_str())
    })
    .await
    .map_err(join_error)??;

    let (token, expires_at) = state
        .sessions
        .create_session(&user_id, Role::User, &req.email)?;

    Ok((
        StatusCode::CREATED,
        [(
            header::SET_COOKIE,
            session_cookie(&token, expires_at, state.secure_cookies),
        )],
        Json(AuthResponse {
            user_id,
            email: req.email,
            role: Role::User,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let (email, password) = (req.email.clone(), req.password.clone());

    let account = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<AccountRow>> {
        let Some(account) = db.find_account_by_email(&email)? else {
            return Ok(None);
        };
        if sealbox_session::verify_password(&password, &account.password) {
            Ok(Some(account))
        } else {
            Ok(None)
        }
    })
    .await
    .map_err(join_error)??
    .ok_or(ApiError::InvalidCredentials)?;

    let role = Role::from_db(&account.role).ok_or_else(|| {
        ApiError::Internal(anyhow::anyhow!(
            "corrupt role '{}' on account '{}'",
            account.role,
            account.id
        ))
    })?;

    let (token, expires_at) = state
        .sessions
        .create_session(&account.id, role, &account.email)?;

    Ok((
        [(
            header::SET_COOKIE,
            session_cookie(&token, expires_at, state.secure_cookies),
        )],
        Json(AuthResponse {
            user_id: account.id,
            email: account.email,
            role,
        }),
    ))
}

/// Stateless sessions have nothing to revoke server-side; logout just drops
/// the cookie on the client.
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(OkResponse { success: true }),
    )
}
