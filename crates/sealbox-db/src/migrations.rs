use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS accounts (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            role        TEXT NOT NULL DEFAULT 'USER',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS entries (
            id                  TEXT PRIMARY KEY,
            text                TEXT NOT NULL,
            hash                TEXT NOT NULL,
            text_length         INTEGER NOT NULL,
            integrity_status    TEXT NOT NULL DEFAULT 'NotChecked',
            -- Nullable: legacy rows predate per-account ownership.
            user_id             TEXT REFERENCES accounts(id),
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_entries_owner
            ON entries(user_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
