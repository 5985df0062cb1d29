use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use tracing::warn;

use sealbox_db::models::EntryRow;
use sealbox_types::api::{
    CreateEntryRequest, EntryResponse, OkResponse, TamperRequest, VerifyResponse,
};
use sealbox_types::models::{Identity, IntegrityStatus};

use crate::auth::AppState;
use crate::error::{ApiError, join_error};

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    let row = tokio::task::spawn_blocking(move || engine.create(&req.text, &identity))
        .await
        .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(entry_response(row))))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    let rows = tokio::task::spawn_blocking(move || engine.list(&identity))
        .await
        .map_err(join_error)??;

    let entries: Vec<EntryResponse> = rows.into_iter().map(entry_response).collect();
    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    let row = tokio::task::spawn_blocking(move || engine.get(&entry_id, &identity))
        .await
        .map_err(join_error)??;

    Ok(Json(entry_response(row)))
}

pub async fn verify_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    let result = tokio::task::spawn_blocking(move || engine.verify(&entry_id, &identity))
        .await
        .map_err(join_error)??;

    Ok(Json(VerifyResponse { result }))
}

pub async fn tamper_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<TamperRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    tokio::task::spawn_blocking(move || {
        engine.tamper(
            &entry_id,
            &req.new_text,
            &identity,
            req.secret_key.as_deref(),
        )
    })
    .await
    .map_err(join_error)??;

    Ok(Json(OkResponse { success: true }))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    tokio::task::spawn_blocking(move || engine.delete(&entry_id, &identity))
        .await
        .map_err(join_error)??;

    Ok(Json(OkResponse { success: true }))
}

fn entry_response(row: EntryRow) -> EntryResponse {
    let created_at = row
        .created_at
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') default stores "YYYY-MM-DD HH:MM:SS"
            // without timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on entry '{}': {}", row.created_at, row.id, e);
            DateTime::default()
        });

    // Unknown labels from older iterations surface as null rather than a
    // guessed mapping.
    let integrity_status = IntegrityStatus::from_db(&row.integrity_status);
    if integrity_status.is_none() {
        warn!(
            "Unrecognized integrity_status '{}' on entry '{}'",
            row.integrity_status, row.id
        );
    }

    EntryResponse {
        id: row.id,
        text: row.text,
        hash: row.hash,
        text_length: row.text_length.max(0) as u64,
        integrity_status,
        user_id: row.user_id,
        created_at,
    }
}
