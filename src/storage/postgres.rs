//! PostgreSQL backend, selected when `PG_HOST` is configured

use anyhow::{Context, Result};
use async_trait::async_trait;
use deadpool_postgres::{Config as PoolConfig, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

use super::{BoardStore, CountPredicate};
use crate::config::DatabaseConfig;
use crate::models::{CompanyBoard, HarvestItem};

/// PostgreSQL implementation of [`BoardStore`] over a deadpool connection pool
pub struct PostgresStore {
    pool: Pool,
}

impl PostgresStore {
    /// Connect, verify the connection and create the schema
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut pool_config = PoolConfig::new();
        pool_config.host = config.pg_host.clone();
        pool_config.port = Some(config.pg_port);
        pool_config.user = config.pg_user.clone();
        pool_config.password = config.pg_password.clone();
        pool_config.dbname = config.pg_database.clone();
        pool_config.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        pool_config.pool = Some(deadpool_postgres::PoolConfig::new(config.pool_size));

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .context("Failed to create PostgreSQL connection pool")?;

        let client = pool
            .get()
            .await
            .context("Failed to connect to PostgreSQL")?;
        client.simple_query("SELECT 1").await?;

        let store = Self { pool };
        store.init_schema().await?;

        tracing::info!(
            host = ?config.pg_host,
            database = ?config.pg_database,
            "PostgreSQL store initialized"
        );
        Ok(store)
    }

    /// Create tables if missing. Tables created by older deployments lack
    /// the provider column, so it is added in place.
    async fn init_schema(&self) -> Result<()> {
        let client = self.pool.get().await?;

        client
            .batch_execute(
                r#"
                CREATE TABLE IF NOT EXISTS company_urls (
                    id SERIAL PRIMARY KEY,
                    url TEXT NOT NULL UNIQUE,
                    company_name TEXT,
                    is_enabled BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                ALTER TABLE company_urls ADD COLUMN IF NOT EXISTS provider TEXT;

                UPDATE company_urls SET provider = 'greenhouse'
                    WHERE provider IS NULL AND url LIKE '%boards.greenhouse.io%';
                UPDATE company_urls SET provider = 'lever'
                    WHERE provider IS NULL AND url LIKE '%jobs.lever.co%';

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
            .await
            .context("Failed to create PostgreSQL schema")?;

        Ok(())
    }
}

#[async_trait]
impl BoardStore for PostgresStore {
    async fn upsert_board_url(&self, board: &CompanyBoard) -> Result<bool> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "INSERT INTO company_urls (url, company_name, provider, is_enabled, created_at, updated_at)
                 VALUES ($1, $2, $3, TRUE, NOW(), NOW())
                 ON CONFLICT (url) DO NOTHING
                 RETURNING id",
                &[&board.url, &board.company_name, &board.provider.as_str()],
            )
            .await
            .context("Failed to upsert company url")?;

        Ok(row.is_some())
    }

    async fn set_enabled(&self, url: &str, enabled: bool) -> Result<bool> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "UPDATE company_urls SET is_enabled = $1, updated_at = CURRENT_TIMESTAMP
                 WHERE url = $2 RETURNING id",
                &[&enabled, &url],
            )
            .await
            .context("Failed to update is_enabled")?;

        Ok(row.is_some())
    }

    async fn is_enabled(&self, url: &str) -> Result<Option<bool>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT is_enabled FROM company_urls WHERE url = $1", &[&url])
            .await
            .context("Failed to read is_enabled")?;

        Ok(row.map(|r| r.get(0)))
    }

    async fn enabled_urls(&self, limit: Option<usize>) -> Result<Vec<String>> {
        let client = self.pool.get().await?;
        let limit: Option<i64> = limit.map(|l| l as i64);
        let rows = client
            .query(
                "SELECT url FROM company_urls WHERE is_enabled = TRUE ORDER BY id LIMIT $1",
                &[&limit],
            )
            .await
            .context("Failed to read enabled urls")?;

        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    async fn query_urls(&self, sql: &str) -> Result<Vec<String>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(sql, &[])
            .await
            .with_context(|| format!("Failed to run query: {sql}"))?;

        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    async fn count_where(&self, predicate: CountPredicate) -> Result<u64> {
        let client = self.pool.get().await?;
        let row = match predicate {
            CountPredicate::All => {
                client
                    .query_one("SELECT COUNT(*) FROM company_urls", &[])
                    .await
            }
            CountPredicate::Enabled => {
                client
                    .query_one(
                        "SELECT COUNT(*) FROM company_urls WHERE is_enabled = TRUE",
                        &[],
                    )
                    .await
            }
            CountPredicate::Provider(provider) => {
                client
                    .query_one(
                        "SELECT COUNT(*) FROM company_urls WHERE url LIKE $1",
                        &[&provider.url_pattern()],
                    )
                    .await
            }
        }
        .context("Failed to count company urls")?;

        let count: i64 = row.get(0);
        Ok(count.max(0) as u64)
    }

    async fn insert_item(&self, item: &HarvestItem) -> Result<bool> {
        let client = self.pool.get().await?;
        let inserted = match item {
            HarvestItem::Department(d) => {
                client
                    .execute(
                        "INSERT INTO greenhouse_job_departments
                            (id, department_id, department_name, department_category,
                             created_at, updated_at, source, company_name, run_hash)
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                         ON CONFLICT (id) DO NOTHING",
                        &[
                            &d.id,
                            &d.department_id,
                            &d.department_name,
                            &d.department_category,
                            &d.created_at,
                            &d.updated_at,
                            &d.source,
                            &d.company_name,
                            &d.run_hash,
                        ],
                    )
                    .await
            }
            HarvestItem::Opening(o) => {
                client
                    .execute(
                        "INSERT INTO greenhouse_jobs_outline
                            (id, department_ids, office_ids, opening_title, opening_link,
                             location, created_at, updated_at, source, run_hash)
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                         ON CONFLICT (id) DO NOTHING",
                        &[
                            &o.id,
                            &o.department_ids,
                            &o.office_ids,
                            &o.opening_title,
                            &o.opening_link,
                            &o.location,
                            &o.created_at,
                            &o.updated_at,
                            &o.source,
                            &o.run_hash,
                        ],
                    )
                    .await
            }
            HarvestItem::LeverOpening(o) => {
                client
                    .execute(
                        "INSERT INTO lever_jobs_outline
                            (id, department_names, opening_title, opening_link, workplace_type,
                             location, company_name, created_at, updated_at, source, run_hash)
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                         ON CONFLICT (id) DO NOTHING",
                        &[
                            &o.id,
                            &o.department_names,
                            &o.opening_title,
                            &o.opening_link,
                            &o.workplace_type,
                            &o.location,
                            &o.company_name,
                            &o.created_at,
                            &o.updated_at,
                            &o.source,
                            &o.run_hash,
                        ],
                    )
                    .await
            }
        }
        .with_context(|| format!("Failed to insert harvested record {}", item.id()))?;

        Ok(inserted == 1)
    }
}
