/// Sealbox integrity engine
///
/// Owns the content-fingerprint contract: a SHA-256 hex digest computed over
/// the raw bytes of the stored text, with deliberately no normalization — the
/// point is to detect *any* byte-level change, including whitespace and
/// Unicode-form drift.
///
/// Every operation authorizes against the caller identity before touching
/// the store. The tamper operation is the intentional defect-injection
/// primitive: it rewrites the text while leaving the stored hash stale, so
/// the next verify reports Changed.
pub mod error;
pub mod policy;

use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use sealbox_db::Database;
use sealbox_db::models::{DeleteOutcome, EntryRow};
use sealbox_types::models::{Identity, IntegrityStatus, Role};

pub use error::EngineError;
pub use policy::TamperPolicy;

const MAX_TEXT_CHARS: usize = 10_000;

/// Deterministic fingerprint over the raw byte representation of `text`.
pub fn compute_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone)]
pub struct IntegrityEngine {
    db: Arc<Database>,
    tamper_policy: TamperPolicy,
}

impl IntegrityEngine {
    pub fn new(db: Arc<Database>, tamper_policy: TamperPolicy) -> Self {
        Self { db, tamper_policy }
    }

    /// Store new content, sealed with its fingerprint. Any authenticated
    /// caller may create entries for themselves.
    pub fn create(&self, content: &str, identity: &Identity) -> Result<EntryRow, EngineError> {
        if content.trim().is_empty() {
            return Err(EngineError::validation("Text cannot be empty"));
        }
        if content.chars().count() > MAX_TEXT_CHARS {
            return Err(EngineError::validation("Text exceeds 10,000 characters"));
        }

        // Hash before persistence; the stored row is born consistent.
        let entry = EntryRow {
            id: Uuid::new_v4().to_string(),
            text: content.to_string(),
            hash: compute_hash(content),
            text_length: content.chars().count() as i64,
            integrity_status: IntegrityStatus::NotChecked.as_str().to_string(),
            user_id: Some(identity.user_id.clone()),
            created_at: Utc::now().to_rfc3339(),
        };

        self.db.create_entry(&entry)?;
        Ok(entry)
    }

    /// Recompute the fingerprint of the current stored text and persist the
    /// verdict. Owner or ADMIN only.
    ///
    /// The read-recompute-write runs as one atomic unit inside the storage
    /// layer, so a concurrent tamper on the same row can never produce a
    /// status computed from text the row no longer holds.
    pub fn verify(&self, entry_id: &str, identity: &Identity) -> Result<IntegrityStatus, EngineError> {
        let entry = self
            .db
            .find_entry_by_id(entry_id)?
            .ok_or(EngineError::NotFound)?;
        authorize_owner(identity, entry.user_id.as_deref())?;

        // Ownership never changes after creation, so the pre-read check
        // above remains valid for the atomic re-read below.
        let status = self
            .db
            .verify_entry(entry_id, |row| {
                if compute_hash(&row.text) == row.hash {
                    IntegrityStatus::Match
                } else {
                    IntegrityStatus::Changed
                }
            })?
            .ok_or(EngineError::NotFound)?;

        Ok(status)
    }

    /// Deliberately desynchronize an entry: overwrite its text without
    /// touching the stored hash or cached status. Gated by the configured
    /// tamper policy; unauthorized callers mutate nothing.
    pub fn tamper(
        &self,
        entry_id: &str,
        new_text: &str,
        identity: &Identity,
        provided_key: Option<&str>,
    ) -> Result<(), EngineError> {
        if !self.tamper_policy.authorize(identity, provided_key) {
            return Err(EngineError::Unauthorized);
        }

        if self.db.update_entry_text(entry_id, new_text)? {
            Ok(())
        } else {
            Err(EngineError::NotFound)
        }
    }

    /// Fetch a single entry. Owner or ADMIN only; a row that exists but
    /// belongs to someone else surfaces as the same generic Unauthorized as
    /// any other denied check.
    pub fn get(&self, entry_id: &str, identity: &Identity) -> Result<EntryRow, EngineError> {
        let entry = self
            .db
            .find_entry_by_id(entry_id)?
            .ok_or(EngineError::NotFound)?;
        authorize_owner(identity, entry.user_id.as_deref())?;
        Ok(entry)
    }

    /// Entries newest-first: ADMIN sees every row, everyone else only their
    /// own.
    pub fn list(&self, identity: &Identity) -> Result<Vec<EntryRow>, EngineError> {
        let owner = match identity.role {
            Role::Admin => None,
            Role::User => Some(identity.user_id.as_str()),
        };
        Ok(self.db.list_entries(owner)?)
    }

    /// Delete an entry. The storage layer's ownership-scoped delete
    /// distinguishes "absent" from "not yours" so the two map to NotFound
    /// and Unauthorized respectively.
    pub fn delete(&self, entry_id: &str, identity: &Identity) -> Result<(), EngineError> {
        let owner = match identity.role {
            Role::Admin => None,
            Role::User => Some(identity.user_id.as_str()),
        };

        match self.db.delete_entry(entry_id, owner)? {
            DeleteOutcome::Deleted => Ok(()),
            DeleteOutcome::NotOwned => Err(EngineError::Unauthorized),
            DeleteOutcome::NotFound => Err(EngineError::NotFound),
        }
    }
}

/// Owner-or-ADMIN gate shared by verify/get. Legacy rows with no recorded
/// owner are admin-only.
fn authorize_owner(identity: &Identity, owner: Option<&str>) -> Result<(), EngineError> {
    if identity.role == Role::Admin {
        return Ok(());
    }
    match owner {
        Some(uid) if uid == identity.user_id => Ok(()),
        _ => Err(EngineError::Unauthorized),
    }
}
