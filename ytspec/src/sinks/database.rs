//! Database sink
//!
//! One row per clip: `(Id, SampleData)`, where `SampleData` is the JSON
//! sample array. The configured output shape does not apply here. A row
//! that already exists for the identifier is left untouched; the insert is
//! ignored rather than updated.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use ytspec_common::config::is_sql_identifier;
use ytspec_common::output::sample_array;
use ytspec_common::{ClipResult, Error, Result};

use super::ResultSink;

/// Inserts the sample collection keyed by clip identifier
pub struct DatabaseSink {
    pool: SqlitePool,
    table: String,
}

impl DatabaseSink {
    /// Connect and make sure the table exists
    ///
    /// # Errors
    /// * `Error::Config` - `table` is not a plain SQL identifier
    /// * `Error::Database` - connection or DDL failure
    pub async fn connect(url: &str, table: &str) -> Result<Self> {
        // Single-shot process; one connection is enough and keeps
        // `sqlite::memory:` pointing at a single database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;

        Self::with_pool(pool, table).await
    }

    /// Use an existing pool (tests, embedding)
    pub async fn with_pool(pool: SqlitePool, table: &str) -> Result<Self> {
        if !is_sql_identifier(table) {
            return Err(Error::Config(format!(
                "database table '{}' is not a valid identifier",
                table
            )));
        }

        let sink = Self {
            pool,
            table: table.to_string(),
        };
        sink.create_table().await?;
        Ok(sink)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_table(&self) -> Result<()> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                Id TEXT PRIMARY KEY NOT NULL,
                SampleData TEXT NOT NULL
            )
            "#,
            self.table
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ResultSink for DatabaseSink {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn emit(&self, result: &ClipResult) -> Result<()> {
        let sample_data = sample_array(result)?;

        let insert = format!(
            "INSERT INTO {} (Id, SampleData) VALUES (?, ?) ON CONFLICT(Id) DO NOTHING",
            self.table
        );
        let outcome = sqlx::query(&insert)
            .bind(&result.id)
            .bind(&sample_data)
            .execute(&self.pool)
            .await?;

        if outcome.rows_affected() == 0 {
            tracing::info!(
                id = %result.id,
                table = %self.table,
                "Row already present, left unchanged"
            );
        } else {
            tracing::info!(
                id = %result.id,
                table = %self.table,
                samples = result.len(),
                "Inserted result row"
            );
        }
        Ok(())
    }
}
