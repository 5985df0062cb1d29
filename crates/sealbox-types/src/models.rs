use serde::{Deserialize, Serialize};

/// Account role. Serialized as "USER"/"ADMIN" both in the session payload
/// and in the accounts table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn from_db(s: &str) -> Option<Role> {
        match s {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Cached integrity judgment for an entry. Only an explicit verify call ever
/// moves it; between verifies it may be stale relative to the current text.
///
/// These names are the stable internal vocabulary. Earlier iterations of the
/// feature shipped other labels ("Checked", "Verified", "Tampered"); any
/// user-facing relabeling belongs in the presentation layer, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrityStatus {
    NotChecked,
    Match,
    Changed,
}

impl IntegrityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrityStatus::NotChecked => "NotChecked",
            IntegrityStatus::Match => "Match",
            IntegrityStatus::Changed => "Changed",
        }
    }

    pub fn from_db(s: &str) -> Option<IntegrityStatus> {
        match s {
            "NotChecked" => Some(IntegrityStatus::NotChecked),
            "Match" => Some(IntegrityStatus::Match),
            "Changed" => Some(IntegrityStatus::Changed),
            _ => None,
        }
    }
}

/// The caller identity recovered from a verified session token.
/// Reconstructed fresh from the signed cookie on every request; never
/// persisted server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub email: String,
}
