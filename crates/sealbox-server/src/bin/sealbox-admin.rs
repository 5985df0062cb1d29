//! Maintenance commands that go around the HTTP surface: promoting an
//! account to ADMIN and resetting a password. Both talk to the database
//! directly, so run them on the host that owns the SQLite file.

use std::path::Path;

use anyhow::{Result, bail};

use sealbox_db::Database;
use sealbox_types::models::Role;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let db_path = std::env::var("SEALBOX_DB_PATH").unwrap_or_else(|_| "sealbox.db".into());

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["promote-user", email] => {
            let db = Database::open(Path::new(&db_path))?;
            if db.update_account_role(email, Role::Admin.as_str())? {
                println!("Success! Account '{}' is now an ADMIN.", email);
            } else {
                bail!("No account found for '{}'.", email);
            }
        }
        ["reset-password", email, new_password] => {
            if new_password.chars().count() < 6 {
                bail!("Password must be at least 6 characters long.");
            }
            let db = Database::open(Path::new(&db_path))?;
            let password_hash = sealbox_session::hash_password(new_password)?;
            if db.update_account_password(email, &password_hash)? {
                println!("Success! Password for '{}' has been updated.", email);
            } else {
                bail!("No account found for '{}'.", email);
            }
        }
        _ => {
            eprintln!("Usage: sealbox-admin promote-user <email>");
            eprintln!("       sealbox-admin reset-password <email> <new-password>");
            std::process::exit(2);
        }
    }

    Ok(())
}
