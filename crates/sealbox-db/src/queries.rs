use crate::Database;
use crate::models::{AccountRow, DeleteOutcome, EntryRow};
use anyhow::Result;
use rusqlite::Connection;
use sealbox_types::models::IntegrityStatus;

impl Database {
    // -- Accounts --

    pub fn create_account(&self, id: &str, email: &str, password_hash: &str, role: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO accounts (id, email, password, role) VALUES (?1, ?2, ?3, ?4)",
                (id, email, password_hash, role),
            )?;
            Ok(())
        })
    }

    pub fn find_account_by_email(&self, email: &str) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| query_account_by_email(conn, email))
    }

    /// Returns false if no account carries that email.
    pub fn update_account_role(&self, email: &str, role: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE accounts SET role = ?2 WHERE email = ?1",
                (email, role),
            )?;
            Ok(changed > 0)
        })
    }

    /// Returns false if no account carries that email.
    pub fn update_account_password(&self, email: &str, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE accounts SET password = ?2 WHERE email = ?1",
                (email, password_hash),
            )?;
            Ok(changed > 0)
        })
    }

    // -- Entries --

    pub fn create_entry(&self, entry: &EntryRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO entries (id, text, hash, text_length, integrity_status, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    entry.id,
                    entry.text,
                    entry.hash,
                    entry.text_length,
                    entry.integrity_status,
                    entry.user_id,
                    entry.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn find_entry_by_id(&self, id: &str) -> Result<Option<EntryRow>> {
        self.with_conn(|conn| query_entry_by_id(conn, id))
    }

    /// Entries newest-first, optionally scoped to one owner.
    pub fn list_entries(&self, owner: Option<&str>) -> Result<Vec<EntryRow>> {
        self.with_conn(|conn| {
            let sql_all = "SELECT id, text, hash, text_length, integrity_status, user_id, created_at
                 FROM entries ORDER BY created_at DESC, rowid DESC";
            let sql_owned = "SELECT id, text, hash, text_length, integrity_status, user_id, created_at
                 FROM entries WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC";

            let mut stmt = conn.prepare(if owner.is_some() { sql_owned } else { sql_all })?;
            let rows = match owner {
                Some(uid) => stmt.query_map([uid], map_entry_row)?.collect::<std::result::Result<Vec<_>, _>>()?,
                None => stmt.query_map([], map_entry_row)?.collect::<std::result::Result<Vec<_>, _>>()?,
            };
            Ok(rows)
        })
    }

    /// Re-judge an entry's integrity and persist the verdict in one atomic
    /// unit: the row is read, judged, and updated while the connection lock
    /// is held, so a concurrent text mutation can never interleave between
    /// the read and the status write.
    ///
    /// Returns `None` if the entry vanished before the read.
    pub fn verify_entry<F>(&self, id: &str, judge: F) -> Result<Option<IntegrityStatus>>
    where
        F: FnOnce(&EntryRow) -> IntegrityStatus,
    {
        self.with_conn(|conn| {
            let Some(row) = query_entry_by_id(conn, id)? else {
                return Ok(None);
            };
            let status = judge(&row);
            conn.execute(
                "UPDATE entries SET integrity_status = ?2 WHERE id = ?1",
                (id, status.as_str()),
            )?;
            Ok(Some(status))
        })
    }

    /// Overwrite an entry's text, leaving hash and integrity_status alone.
    /// Returns false if no such entry exists.
    pub fn update_entry_text(&self, id: &str, new_text: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE entries SET text = ?2 WHERE id = ?1",
                (id, new_text),
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete an entry, optionally constrained to an owner. With a
    /// constraint, a miss is disambiguated into NotOwned vs NotFound under
    /// the same connection lock.
    pub fn delete_entry(&self, id: &str, owner: Option<&str>) -> Result<DeleteOutcome> {
        self.with_conn(|conn| {
            let changed = match owner {
                Some(uid) => conn.execute(
                    "DELETE FROM entries WHERE id = ?1 AND user_id = ?2",
                    (id, uid),
                )?,
                None => conn.execute("DELETE FROM entries WHERE id = ?1", [id])?,
            };

            if changed > 0 {
                return Ok(DeleteOutcome::Deleted);
            }

            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM entries WHERE id = ?1)",
                [id],
                |row| row.get(0),
            )?;

            if exists {
                Ok(DeleteOutcome::NotOwned)
            } else {
                Ok(DeleteOutcome::NotFound)
            }
        })
    }
}

fn query_account_by_email(conn: &Connection, email: &str) -> Result<Option<AccountRow>> {
    let mut stmt = conn
        .prepare("SELECT id, email, password, role, created_at FROM accounts WHERE email = ?1")?;

    let row = stmt
        .query_row([email], |row| {
            Ok(AccountRow {
                id: row.get(0)?,
                email: row.get(1)?,
                password: row.get(2)?,
                role: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_entry_by_id(conn: &Connection, id: &str) -> Result<Option<EntryRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, hash, text_length, integrity_status, user_id, created_at
         FROM entries WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], map_entry_row).optional()?;
    Ok(row)
}

fn map_entry_row(row: &rusqlite::Row<'_>) -> std::result::Result<EntryRow, rusqlite::Error> {
    Ok(EntryRow {
        id: row.get(0)?,
        text: row.get(1)?,
        hash: row.get(2)?,
        text_length: row.get(3)?,
        integrity_status: row.get(4)?,
        user_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn entry(id: &str, owner: Option<&str>) -> EntryRow {
        EntryRow {
            id: id.to_string(),
            text: "hello".to_string(),
            hash: "abc123".to_string(),
            text_length: 5,
            integrity_status: "NotChecked".to_string(),
            user_id: owner.map(str::to_string),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn duplicate_email_rejected() {
        let db = db();
        db.create_account("u1", "a@b.c", "s:k", "USER").unwrap();
        assert!(db.create_account("u2", "a@b.c", "s:k", "USER").is_err());
    }

    #[test]
    fn account_lookup_roundtrip() {
        let db = db();
        db.create_account("u1", "a@b.c", "s:k", "ADMIN").unwrap();

        let row = db.find_account_by_email("a@b.c").unwrap().unwrap();
        assert_eq!(row.id, "u1");
        assert_eq!(row.role, "ADMIN");
        assert!(db.find_account_by_email("x@y.z").unwrap().is_none());
    }

    #[test]
    fn role_and_password_updates_report_misses() {
        let db = db();
        db.create_account("u1", "a@b.c", "s:k", "USER").unwrap();

        assert!(db.update_account_role("a@b.c", "ADMIN").unwrap());
        assert!(!db.update_account_role("x@y.z", "ADMIN").unwrap());
        assert!(db.update_account_password("a@b.c", "s2:k2").unwrap());
        assert!(!db.update_account_password("x@y.z", "s2:k2").unwrap());

        let row = db.find_account_by_email("a@b.c").unwrap().unwrap();
        assert_eq!(row.role, "ADMIN");
        assert_eq!(row.password, "s2:k2");
    }

    #[test]
    fn verify_entry_persists_judgment() {
        let db = db();
        db.create_entry(&entry("e1", None)).unwrap();

        let status = db
            .verify_entry("e1", |_| IntegrityStatus::Changed)
            .unwrap()
            .unwrap();
        assert_eq!(status, IntegrityStatus::Changed);

        let row = db.find_entry_by_id("e1").unwrap().unwrap();
        assert_eq!(row.integrity_status, "Changed");
    }

    #[test]
    fn verify_entry_missing_row() {
        let db = db();
        assert!(db.verify_entry("nope", |_| IntegrityStatus::Match).unwrap().is_none());
    }

    #[test]
    fn update_text_leaves_hash_alone() {
        let db = db();
        db.create_entry(&entry("e1", None)).unwrap();

        assert!(db.update_entry_text("e1", "mutated").unwrap());
        let row = db.find_entry_by_id("e1").unwrap().unwrap();
        assert_eq!(row.text, "mutated");
        assert_eq!(row.hash, "abc123");
        assert_eq!(row.integrity_status, "NotChecked");

        assert!(!db.update_entry_text("nope", "x").unwrap());
    }

    #[test]
    fn scoped_delete_disambiguates_outcomes() {
        let db = db();
        db.create_account("u1", "a@b.c", "s:k", "USER").unwrap();
        db.create_entry(&entry("e1", Some("u1"))).unwrap();

        assert_eq!(
            db.delete_entry("e1", Some("intruder")).unwrap(),
            DeleteOutcome::NotOwned
        );
        assert!(db.find_entry_by_id("e1").unwrap().is_some());

        assert_eq!(db.delete_entry("e1", Some("u1")).unwrap(), DeleteOutcome::Deleted);
        assert_eq!(db.delete_entry("e1", Some("u1")).unwrap(), DeleteOutcome::NotFound);
        assert_eq!(db.delete_entry("e1", None).unwrap(), DeleteOutcome::NotFound);
    }

    #[test]
    fn list_scopes_to_owner() {
        let db = db();
        db.create_account("u1", "a@b.c", "s:k", "USER").unwrap();
        db.create_account("u2", "d@e.f", "s:k", "USER").unwrap();
        db.create_entry(&entry("e1", Some("u1"))).unwrap();
        db.create_entry(&entry("e2", Some("u2"))).unwrap();
        db.create_entry(&entry("e3", None)).unwrap();

        assert_eq!(db.list_entries(None).unwrap().len(), 3);
        let mine = db.list_entries(Some("u1")).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "e1");
    }
}
