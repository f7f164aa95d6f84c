use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::error::Result;

#[derive(Clone)]
pub struct MonitorStore {
    pool: PgPool,
}

impl MonitorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, ts_utc: DateTime<Utc>, metric: &str, value: f64, meta: Option<&Value>) -> Result<()> {
        sqlx::query(
            "INSERT INTO monitor_logs (ts_utc, metric, value, meta_json) VALUES ($1, $2, $3, $4)",
        )
        .bind(ts_utc)
        .bind(metric)
        .bind(value)
        .bind(meta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn recent(&self, metric: &str, since: DateTime<Utc>) -> Result<Vec<(DateTime<Utc>, f64)>> {
        let rows: Vec<(DateTime<Utc>, f64)> = sqlx::query_as(
            "SELECT ts_utc, value FROM monitor_logs WHERE metric = $1 AND ts_utc >= $2 ORDER BY ts_utc ASC",
        )
        .bind(metric)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
