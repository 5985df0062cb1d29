use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Identity, IntegrityStatus, Role};

// -- Session payload --

/// The signed session payload. Canonical definition lives here in
/// sealbox-types so the token codec and the HTTP middleware share one shape.
///
/// Field order and naming are part of the cookie wire format:
/// `{"userId":..,"role":..,"email":..,"expiresAt":..}` with `expiresAt` in
/// epoch milliseconds. Do not reorder fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub user_id: String,
    pub role: Role,
    pub email: String,
    pub expires_at: i64,
}

impl SessionData {
    pub fn into_identity(self) -> Identity {
        Identity {
            user_id: self.user_id,
            role: self.role,
            email: self.email,
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

// -- Entries --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEntryRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: String,
    pub text: String,
    pub hash: String,
    pub text_length: u64,
    pub integrity_status: Option<IntegrityStatus>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub result: IntegrityStatus,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TamperRequest {
    pub new_text: String,
    /// Only consulted when the server runs the shared-secret tamper policy.
    pub secret_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub success: bool,
}
