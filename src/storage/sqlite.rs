//! SQLite backend for local runs and tests

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use super::{BoardStore, CountPredicate};
use crate::models::{CompanyBoard, HarvestItem};

/// SQLite implementation of [`BoardStore`]
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database file
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;

        // WAL lets worker processes write while the parent reads
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA busy_timeout=5000;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite store initialized");
        Ok(store)
    }

    /// Create in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory SQLite")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection lock poisoned"))
    }

    fn create_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS company_urls (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    url TEXT NOT NULL UNIQUE,
                    company_name TEXT,
                    provider TEXT,
                    is_enabled BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                );

                CREATE INDEX IF NOT EXISTS idx_company_urls_enabled
                    ON company_urls(is_enabled);

                CREATE TABLE IF NOT EXISTS greenhouse_job_departments (
                    id TEXT PRIMARY KEY,
                    department_id TEXT,
                    department_name TEXT,
                    department_category TEXT,
                    created_at BIGINT,
                    updated_at BIGINT,
                    source TEXT,
                    company_name TEXT,
                    run_hash TEXT
                );

                CREATE TABLE IF NOT EXISTS greenhouse_jobs_outline (
                    id TEXT PRIMARY KEY,
                    department_ids TEXT,
                    office_ids TEXT,
                    opening_title TEXT,
                    opening_link TEXT,
                    location TEXT,
                    created_at BIGINT,
                    updated_at BIGINT,
                    source TEXT,
                    run_hash TEXT
                );

                CREATE TABLE IF NOT EXISTS lever_jobs_outline (
                    id TEXT PRIMARY KEY,
                    department_names TEXT,
                    opening_title TEXT,
                    opening_link TEXT,
                    workplace_type TEXT,
                    location TEXT,
                    company_name TEXT,
                    created_at BIGINT,
                    updated_at BIGINT,
                    source TEXT,
                    run_hash TEXT
                );
                "#,
        )
        .context("Failed to create SQLite schema")?;

        Ok(())
    }
}

#[async_trait]
impl BoardStore for SqliteStore {
    async fn upsert_board_url(&self, board: &CompanyBoard) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn
            .execute(
                "INSERT INTO company_urls (url, company_name, provider, is_enabled)
                 VALUES (?1, ?2, ?3, TRUE)
                 ON CONFLICT(url) DO NOTHING",
                params![board.url, board.company_name, board.provider.as_str()],
            )
            .context("Failed to upsert company url")?;

        Ok(inserted == 1)
    }

    async fn set_enabled(&self, url: &str, enabled: bool) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn
            .execute(
                "UPDATE company_urls SET is_enabled = ?1, updated_at = CURRENT_TIMESTAMP WHERE url = ?2",
                params![enabled, url],
            )
            .context("Failed to update is_enabled")?;

        Ok(updated > 0)
    }

    async fn is_enabled(&self, url: &str) -> Result<Option<bool>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT is_enabled FROM company_urls WHERE url = ?1",
            params![url],
            |row| row.get::<_, bool>(0),
        )
        .optional()
        .context("Failed to read is_enabled")
    }

    async fn enabled_urls(&self, limit: Option<usize>) -> Result<Vec<String>> {
        let conn = self.conn()?;
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = conn
            .prepare("SELECT url FROM company_urls WHERE is_enabled = TRUE ORDER BY id LIMIT ?1")
            .context("Failed to prepare enabled url query")?;

        let urls = stmt
            .query_map(params![limit], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read enabled urls")?;

        Ok(urls)
    }

    async fn query_urls(&self, sql: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(sql)
            .with_context(|| format!("Failed to prepare query: {sql}"))?;

        let urls = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read query results")?;

        Ok(urls)
    }

    async fn count_where(&self, predicate: CountPredicate) -> Result<u64> {
        let conn = self.conn()?;
        let count: i64 = match predicate {
            CountPredicate::All => {
                conn.query_row("SELECT COUNT(*) FROM company_urls", [], |row| row.get(0))
            }
            CountPredicate::Enabled => conn.query_row(
                "SELECT COUNT(*) FROM company_urls WHERE is_enabled = TRUE",
                [],
                |row| row.get(0),
            ),
            CountPredicate::Provider(provider) => conn.query_row(
                "SELECT COUNT(*) FROM company_urls WHERE url LIKE ?1",
                params![provider.url_pattern()],
                |row| row.get(0),
            ),
        }
        .context("Failed to count company urls")?;

        Ok(count.max(0) as u64)
    }

    async fn insert_item(&self, item: &HarvestItem) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = match item {
            HarvestItem::Department(d) => conn.execute(
                "INSERT INTO greenhouse_job_departments
                    (id, department_id, department_name, department_category,
                     created_at, updated_at, source, company_name, run_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO NOTHING",
                params![
                    d.id,
                    d.department_id,
                    d.department_name,
                    d.department_category,
                    d.created_at,
                    d.updated_at,
                    d.source,
                    d.company_name,
                    d.run_hash
                ],
            ),
            HarvestItem::Opening(o) => conn.execute(
                "INSERT INTO greenhouse_jobs_outline
                    (id, department_ids, office_ids, opening_title, opening_link,
                     location, created_at, updated_at, source, run_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO NOTHING",
                params![
                    o.id,
                    o.department_ids,
                    o.office_ids,
                    o.opening_title,
                    o.opening_link,
                    o.location,
                    o.created_at,
                    o.updated_at,
                    o.source,
                    o.run_hash
                ],
            ),
            HarvestItem::LeverOpening(o) => conn.execute(
                "INSERT INTO lever_jobs_outline
                    (id, department_names, opening_title, opening_link, workplace_type,
                     location, company_name, created_at, updated_at, source, run_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(id) DO NOTHING",
                params![
                    o.id,
                    o.department_names,
                    o.opening_title,
                    o.opening_link,
                    o.workplace_type,
                    o.location,
                    o.company_name,
                    o.created_at,
                    o.updated_at,
                    o.source,
                    o.run_hash
                ],
            ),
        }
        .with_context(|| format!("Failed to insert harvested record {}", item.id()))?;

        Ok(inserted == 1)
    }
}
