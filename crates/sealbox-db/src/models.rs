/// Database row types — these map directly to SQLite rows.
/// Distinct from sealbox-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct AccountRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct EntryRow {
    pub id: String,
    pub text: String,
    pub hash: String,
    pub text_length: i64,
    pub integrity_status: String,
    pub user_id: Option<String>,
    pub created_at: String,
}

/// Outcome of an ownership-scoped delete. "Row exists but is not yours" is
/// kept distinct from "row absent" so the caller can answer Unauthorized vs
/// NotFound without a second query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotOwned,
    NotFound,
}
