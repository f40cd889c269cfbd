//! Operation history kept in `<vault_dir>/audit.db` (SQLite).
//!
//! Each row records what happened and to which entry path.  Usernames
//! and secret values are never written here.  Recording is best-effort:
//! [`log_audit`] never fails the command that calls it.  Without the
//! `audit-log` feature it compiles to nothing.

use crate::vault::VaultLayout;

#[cfg(feature = "audit-log")]
pub use sqlite::{AuditEntry, AuditLog};

/// File name of the audit database inside the vault directory.
pub const DB_FILE: &str = "audit.db";

/// Record `op` (and optionally the entry path and a short note) for the
/// vault at `layout`.  Failures are logged at debug level and dropped.
#[cfg(feature = "audit-log")]
pub fn log_audit(layout: &VaultLayout, op: &str, entry_path: Option<&str>, details: Option<&str>) {
    // Never create a vault directory just to log into it.
    if !layout.root().is_dir() {
        return;
    }
    let outcome = AuditLog::open(layout.root()).and_then(|log| log.record(op, entry_path, details));
    if let Err(e) = outcome {
        tracing::debug!(op, error = %e, "audit record skipped");
    }
}

#[cfg(not(feature = "audit-log"))]
pub fn log_audit(
    _layout: &VaultLayout,
    _op: &str,
    _entry_path: Option<&str>,
    _details: Option<&str>,
) {
}

#[cfg(feature = "audit-log")]
mod sqlite {
    use std::path::Path;

    use chrono::{DateTime, Utc};
    use rusqlite::{params, Connection};

    use super::DB_FILE;
    use crate::errors::{PassVaultError, Result};

    const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS events (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        at          TEXT NOT NULL,
        operation   TEXT NOT NULL,
        entry_path  TEXT,
        details     TEXT
    );";

    /// One recorded operation.
    #[derive(Debug, Clone)]
    pub struct AuditEntry {
        pub id: i64,
        pub timestamp: DateTime<Utc>,
        pub operation: String,
        pub entry_path: Option<String>,
        pub details: Option<String>,
    }

    /// Handle on the audit database.
    pub struct AuditLog {
        conn: Connection,
    }

    fn db_err(context: &str) -> impl Fn(rusqlite::Error) -> PassVaultError + '_ {
        move |e| PassVaultError::AuditError(format!("{context}: {e}"))
    }

    impl AuditLog {
        /// Open `<vault_dir>/audit.db`, creating the file (0600) and the
        /// table on first use.
        pub fn open(vault_dir: &Path) -> Result<Self> {
            let file = vault_dir.join(DB_FILE);
            let conn = Connection::open(&file).map_err(db_err("open"))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o600))?;
            }

            conn.execute_batch(SCHEMA).map_err(db_err("schema"))?;
            Ok(Self { conn })
        }

        /// Append one event stamped with the current time.
        pub fn record(
            &self,
            operation: &str,
            entry_path: Option<&str>,
            details: Option<&str>,
        ) -> Result<()> {
            self.conn
                .execute(
                    "INSERT INTO events (at, operation, entry_path, details) VALUES (?1, ?2, ?3, ?4)",
                    params![Utc::now().to_rfc3339(), operation, entry_path, details],
                )
                .map_err(db_err("insert"))?;
            Ok(())
        }

        /// The `limit` most recent events, newest first.
        pub fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>> {
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            let mut stmt = self
                .conn
                .prepare(
                    "SELECT id, at, operation, entry_path, details
                     FROM events ORDER BY id DESC LIMIT ?1",
                )
                .map_err(db_err("prepare"))?;

            let rows = stmt
                .query_map(params![limit], |row| {
                    let at: String = row.get(1)?;
                    Ok(AuditEntry {
                        id: row.get(0)?,
                        timestamp: DateTime::parse_from_rfc3339(&at)
                            .map(|t| t.with_timezone(&Utc))
                            .unwrap_or_default(),
                        operation: row.get(2)?,
                        entry_path: row.get(3)?,
                        details: row.get(4)?,
                    })
                })
                .map_err(db_err("query"))?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(db_err("row"))
        }
    }

}
