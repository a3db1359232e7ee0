//! SQLite-backed store for cached predictions.

use crate::models::HoroscopeRecord;
use chrono::{DateTime, Duration, Utc};
use service_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration as StdDuration;
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct HoroscopeStore {
    pool: SqlitePool,
}

impl HoroscopeStore {
    /// Open (and create if missing) the SQLite database at `database_url`.
    ///
    /// WAL mode plus a busy timeout so concurrent request handlers can
    /// read and write without tripping over each other.
    #[instrument(skip(database_url), fields(service = "horoscope-service"))]
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        info!("Opening SQLite database");

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Invalid DATABASE_URL: {}", e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(StdDuration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(StdDuration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("SQLite connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Fetch the cached record for `(sign, date)`, if any.
    pub async fn get(&self, sign: &str, date: &str) -> Result<Option<HoroscopeRecord>, AppError> {
        let record = sqlx::query_as::<_, HoroscopeRecord>(
            "SELECT sign, date, prediction, created_at FROM horoscopes WHERE sign = ? AND date = ?",
        )
        .bind(sign)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to read cache: {}", e)))?;

        Ok(record)
    }

    /// Insert or replace the record for `(sign, date)`.
    ///
    /// The upsert is atomic per key, so racing miss-handlers for the same
    /// key converge on a single row.
    pub async fn upsert(
        &self,
        sign: &str,
        date: &str,
        prediction: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO horoscopes (sign, date, prediction, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (sign, date) DO UPDATE SET
                prediction = excluded.prediction,
                created_at = excluded.created_at
            "#,
        )
        .bind(sign)
        .bind(date)
        .bind(prediction)
        .bind(created_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to write cache: {}", e)))?;

        Ok(())
    }

    /// Delete every record older than `max_age_days`, returning the count.
    ///
    /// Age is computed from the persisted creation timestamp, so a row
    /// written moments ago is never eligible.
    #[instrument(skip(self))]
    pub async fn delete_older_than(&self, max_age_days: i64) -> Result<u64, AppError> {
        let cutoff = Utc::now() - Duration::days(max_age_days);

        let result = sqlx::query("DELETE FROM horoscopes WHERE created_at < ?")
            .bind(cutoff.timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to clean up cache: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}
