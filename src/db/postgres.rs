//! PostgreSQL access for the source volume tables and the percentage table

use crate::db::{PercentageStore, VolumeSource};
use crate::error::{MovecastError, Result};
use crate::models::{CategoryRecord, HistoricalRecord, SeasonalPercentage};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tokio_postgres::{Client, NoTls, Row};

const UPSERT_PERCENTAGES: &str = "
    INSERT INTO historical_percentages (branch, category, month, day, avg_percentage)
    SELECT * FROM UNNEST($1::text[], $2::text[], $3::int4[], $4::int4[], $5::float8[])
    ON CONFLICT (branch, category, month, day) DO UPDATE
    SET avg_percentage = EXCLUDED.avg_percentage";

pub struct PostgresStore {
    client: RwLock<Client>,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| {
                MovecastError::TransientStore(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        let store = Self {
            client: RwLock::new(client),
        };
        store.init_schema().await?;

        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        let c = self.client.read().await;
        c.execute(
            "CREATE TABLE IF NOT EXISTS historical_percentages (
                branch TEXT NOT NULL,
                category TEXT NOT NULL,
                month INT NOT NULL CHECK (month BETWEEN 1 AND 12),
                day INT NOT NULL CHECK (day BETWEEN 1 AND 31),
                avg_percentage DOUBLE PRECISION NOT NULL,
                PRIMARY KEY (branch, category, month, day)
            )",
            &[],
        )
        .await?;
        Ok(())
    }
}

/// Accepts both DATE ("2021-03-04") and TIMESTAMP ("2021-03-04 00:00:00") renderings
fn parse_source_date(raw: &str) -> Result<NaiveDate> {
    let date_part = raw.split([' ', 'T']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| MovecastError::Data(format!("Unparseable date '{}': {}", raw, e)))
}

fn required_text(row: &Row, idx: usize, column: &str) -> Result<String> {
    row.try_get::<_, Option<String>>(idx)
        .map_err(|e| MovecastError::Data(format!("Bad {} column: {}", column, e)))?
        .ok_or_else(|| MovecastError::Data(format!("Null {} value in source data", column)))
}

fn optional_count(row: &Row, idx: usize) -> Result<Option<i64>> {
    row.try_get::<_, Option<i64>>(idx)
        .map_err(|e| MovecastError::Data(format!("Bad Count column: {}", e)))
}

#[async_trait]
impl VolumeSource for PostgresStore {
    async fn load_totals(&self, min_year: i32, max_year: i32) -> Result<Vec<HistoricalRecord>> {
        let c = self.client.read().await;
        let rows = c
            .query(
                r#"SELECT "Date"::text, "Branch"::text, "Count"::bigint
                   FROM historical_df
                   WHERE EXTRACT(YEAR FROM "Date")::int BETWEEN $1 AND $2"#,
                &[&min_year, &max_year],
            )
            .await?;

        rows.iter()
            .map(|row| {
                Ok(HistoricalRecord {
                    date: parse_source_date(&required_text(row, 0, "Date")?)?,
                    branch: required_text(row, 1, "Branch")?,
                    count: optional_count(row, 2)?,
                })
            })
            .collect()
    }

    async fn load_categories(
        &self,
        min_year: i32,
        max_year: i32,
    ) -> Result<Vec<CategoryRecord>> {
        let c = self.client.read().await;
        let rows = c
            .query(
                r#"SELECT "Date"::text, "Branch"::text, "MoveType"::text, "Count"::bigint
                   FROM move_df
                   WHERE EXTRACT(YEAR FROM "Date")::int BETWEEN $1 AND $2"#,
                &[&min_year, &max_year],
            )
            .await?;

        rows.iter()
            .map(|row| {
                Ok(CategoryRecord {
                    date: parse_source_date(&required_text(row, 0, "Date")?)?,
                    branch: required_text(row, 1, "Branch")?,
                    category: required_text(row, 2, "MoveType")?,
                    count: optional_count(row, 3)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PercentageStore for PostgresStore {
    async fn upsert_percentages(&self, rows: &[SeasonalPercentage]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let branches: Vec<&str> = rows.iter().map(|r| r.branch.as_str()).collect();
        let categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        let months: Vec<i32> = rows.iter().map(|r| r.month as i32).collect();
        let days: Vec<i32> = rows.iter().map(|r| r.day as i32).collect();
        let values: Vec<f64> = rows.iter().map(|r| r.avg_percentage).collect();

        let mut c = self.client.write().await;

        // Dropping the transaction without commit rolls it back
        let tx = c.transaction().await?;
        let written = tx
            .execute(
                UPSERT_PERCENTAGES,
                &[&branches, &categories, &months, &days, &values],
            )
            .await?;
        tx.commit().await?;

        Ok(written)
    }

    async fn exact_percentage(
        &self,
        branch: &str,
        category: &str,
        month: u32,
        day: u32,
    ) -> Result<Option<f64>> {
        let c = self.client.read().await;
        let row = c
            .query_opt(
                "SELECT avg_percentage FROM historical_percentages
                 WHERE branch = $1 AND category = $2 AND month = $3 AND day = $4",
                &[&branch, &category, &(month as i32), &(day as i32)],
            )
            .await?;
        Ok(row.map(|r| r.get(0)))
    }

    async fn monthly_average(
        &self,
        branch: &str,
        category: &str,
        month: u32,
    ) -> Result<Option<f64>> {
        let c = self.client.read().await;
        let row = c
            .query_one(
                "SELECT AVG(avg_percentage) FROM historical_percentages
                 WHERE branch = $1 AND category = $2 AND month = $3",
                &[&branch, &category, &(month as i32)],
            )
            .await?;
        Ok(row.get::<_, Option<f64>>(0))
    }

    async fn branches(&self) -> Result<Vec<String>> {
        let c = self.client.read().await;
        let rows = c
            .query(
                "SELECT DISTINCT branch FROM historical_percentages ORDER BY branch",
                &[],
            )
            .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let c = self.client.read().await;
        let rows = c
            .query(
                "SELECT DISTINCT category FROM historical_percentages ORDER BY category",
                &[],
            )
            .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }
}
