use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::error::{CritiqueError, Result};

use super::DocumentSource;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reports (
            source     TEXT PRIMARY KEY,
            body       TEXT NOT NULL,
            fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

/// Insert `(source, body)` pairs in one transaction; existing sources are
/// left untouched. Returns how many rows were new.
pub fn insert_reports(conn: &Connection, reports: &[(String, String)]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare("INSERT OR IGNORE INTO reports (source, body) VALUES (?1, ?2)")?;
        for (source, body) in reports {
            count += stmt.execute(rusqlite::params![source, body])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

/// Reports deposited in a SQLite `reports` table by an external retriever.
pub struct SqliteSource {
    conn: Connection,
    label: String,
}

impl SqliteSource {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = connect(path)?;
        init_schema(&conn)?;
        Ok(Self::from_connection(conn, path.display().to_string()))
    }

    pub fn from_connection(conn: Connection, label: impl Into<String>) -> Self {
        SqliteSource {
            conn,
            label: label.into(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl DocumentSource for SqliteSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn identifiers(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT source FROM reports ORDER BY source")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    fn load(&self, id: &str) -> Result<String> {
        self.conn
            .query_row("SELECT body FROM reports WHERE source = ?1", [id], |row| row.get(0))
            .optional()?
            .ok_or_else(|| CritiqueError::Source {
                name: self.label.clone(),
                reason: format!("no report '{}'", id),
            })
    }
}

// ── Tests ──
