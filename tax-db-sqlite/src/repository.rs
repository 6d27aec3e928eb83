use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tax_core::{BracketStore, Country, RepositoryError, TaxBracket, TaxRepository};
use tracing::{debug, info};

use crate::decimal::{decimal_to_f64, get_decimal, get_optional_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens `target`, creating the file if needed.
    ///
    /// `target` may be a sqlx URL (`sqlite:brackets.db`, `sqlite::memory:`),
    /// a bare file path, or `:memory:`.
    pub async fn new(target: &str) -> Result<Self> {
        let options = connect_options(target)?;
        let mut pool_options = SqlitePoolOptions::new();
        if is_in_memory(target) {
            // every connection to :memory: is a separate, empty database
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {target}"))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "applied seed file");
        }

        info!(dir = %seeds_dir.display(), "seed data loaded");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn connect_options(target: &str) -> Result<SqliteConnectOptions> {
    let options = match target.trim() {
        "" | ":memory:" => SqliteConnectOptions::from_str("sqlite::memory:")?,
        url if url.starts_with("sqlite:") => SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid SQLite URL: {url}"))?,
        path => SqliteConnectOptions::new().filename(path),
    };
    Ok(options.create_if_missing(true).foreign_keys(true))
}

fn is_in_memory(target: &str) -> bool {
    let target = target.trim();
    target.is_empty() || target.contains(":memory:") || target.contains("mode=memory")
}

fn row_to_country(row: &SqliteRow) -> Result<Country, RepositoryError> {
    Ok(Country {
        code: row
            .try_get("code")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        name: row
            .try_get("name")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        currency: row
            .try_get("currency")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
    })
}

#[async_trait]
impl BracketStore for SqliteRepository {
    async fn resolve_brackets(
        &self,
        country_code: &str,
    ) -> Result<Vec<TaxBracket>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT min_income, max_income, rate_percent
             FROM tax_brackets
             WHERE country_code = ?
             ORDER BY min_income ASC",
        )
        .bind(country_code)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(TaxBracket {
                    country_code: country_code.to_string(),
                    min_income: get_decimal(row, "min_income")?,
                    max_income: get_optional_decimal(row, "max_income")?,
                    rate_percent: get_decimal(row, "rate_percent")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl TaxRepository for SqliteRepository {
    async fn get_country(
        &self,
        code: &str,
    ) -> Result<Country, RepositoryError> {
        let row = sqlx::query("SELECT code, name, currency FROM countries WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_country(&row)
    }

    async fn list_countries(&self) -> Result<Vec<Country>, RepositoryError> {
        // insertion order
        let rows = sqlx::query("SELECT code, name, currency FROM countries ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_country).collect()
    }

    async fn insert_tax_bracket(
        &self,
        bracket: &TaxBracket,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO tax_brackets (country_code, min_income, max_income, rate_percent)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&bracket.country_code)
        .bind(decimal_to_f64(bracket.min_income)?)
        .bind(bracket.max_income.map(decimal_to_f64).transpose()?)
        .bind(decimal_to_f64(bracket.rate_percent)?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_tax_brackets(
        &self,
        country_code: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM tax_brackets WHERE country_code = ?")
            .bind(country_code)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn replace_tax_brackets(
        &self,
        schedules: &BTreeMap<String, Vec<TaxBracket>>,
    ) -> Result<(), RepositoryError> {
        // dropping the transaction on an early return rolls it back
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        for (country_code, brackets) in schedules {
            sqlx::query("DELETE FROM tax_brackets WHERE country_code = ?")
                .bind(country_code)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

            for bracket in brackets {
                sqlx::query(
                    "INSERT INTO tax_brackets (country_code, min_income, max_income, rate_percent)
                     VALUES (?, ?, ?, ?)",
                )
                .bind(country_code)
                .bind(decimal_to_f64(bracket.min_income)?)
                .bind(bracket.max_income.map(decimal_to_f64).transpose()?)
                .bind(decimal_to_f64(bracket.rate_percent)?)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
            }
            debug!(country = %country_code, brackets = brackets.len(), "staged bracket table");
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }
}
