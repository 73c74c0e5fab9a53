//! Sqlite-backed config store and book catalog.

use std::path::Path;

use anyhow::Context as _;
use bookimport_core::{CatalogRecord, CatalogRepository, ConfigStore, SETTINGS_KEY, Settings};
use rusqlite::{Connection, OptionalExtension as _};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("open sqlite db at {}", path.as_ref().display()))?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    fn migrate(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (unixepoch())
            );

            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY,
                file_name TEXT NOT NULL UNIQUE,
                book_url TEXT NOT NULL,
                added_at INTEGER NOT NULL DEFAULT (unixepoch())
            );
            "#,
        )?;

        match self
            .conn
            .execute("ALTER TABLE books ADD COLUMN title TEXT NOT NULL DEFAULT ''", [])
        {
            Ok(_) => {}
            Err(err) => {
                let msg = err.to_string();
                if !msg.contains("duplicate column name") {
                    return Err(err).context("add books.title column");
                }
            }
        }

        Ok(())
    }

    pub fn load_settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match self.get(SETTINGS_KEY)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
                warn!(error = %err, "stored settings are invalid, using defaults");
                Settings::default()
            }),
            None => Settings::default(),
        };
        settings.normalize();
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> anyhow::Result<()> {
        let mut settings = settings.clone();
        settings.normalize();
        let json = serde_json::to_string(&settings)?;
        self.set(SETTINGS_KEY, &json)
    }

    pub fn upsert_book(&self, record: &CatalogRecord) -> anyhow::Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO books (file_name, book_url, title) VALUES (?, ?, ?)
            ON CONFLICT(file_name) DO UPDATE SET
                book_url = excluded.book_url,
                title = excluded.title
            "#,
            (&record.file_name, &record.book_url, &record.title),
        )?;
        debug!(file_name = %record.file_name, "catalog record stored");
        Ok(())
    }

    pub fn list_books(&self) -> anyhow::Result<Vec<CatalogRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT file_name, book_url, title FROM books ORDER BY file_name COLLATE NOCASE",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CatalogRecord {
                file_name: row.get(0)?,
                book_url: row.get(1)?,
                title: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_book_by_file_name(&self, file_name: &str) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM books WHERE file_name = ?", [file_name])?;
        Ok(())
    }
}

impl ConfigStore for Storage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM config WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("read config key {key}"))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO config (key, value, updated_at) VALUES (?, ?, unixepoch())
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                (key, value),
            )
            .with_context(|| format!("write config key {key}"))?;
        Ok(())
    }
}

impl CatalogRepository for Storage {
    fn find_by_file_name(&self, name: &str) -> anyhow::Result<Option<CatalogRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT file_name, book_url, title FROM books WHERE file_name = ?",
                [name],
                |row| {
                    Ok(CatalogRecord {
                        file_name: row.get(0)?,
                        book_url: row.get(1)?,
                        title: row.get(2)?,
                    })
                },
            )
            .optional()
            .with_context(|| format!("look up catalog record {name}"))?;
        Ok(record)
    }
}
