//! PostgreSQL-backed fruit record store

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use shared::{
    DiameterRange, FruitRecord, FruitStore, GpsCoordinates, HarvestStatistics, StoreError,
};

/// Fruit store over the `fruit` table
#[derive(Clone)]
pub struct PgFruitStore {
    db: PgPool,
}

/// Database row for a scanned fruit
#[derive(Debug, Clone, sqlx::FromRow)]
struct FruitRow {
    pub id: i32,
    pub lat: Decimal,
    pub long: Decimal,
    pub major_mm: Decimal,
    pub minor_mm: Decimal,
    pub subminor_mm: Decimal,
    pub volume_mm: Decimal,
    pub average_diam_mm: Decimal,
}

impl From<FruitRow> for FruitRecord {
    fn from(row: FruitRow) -> Self {
        Self {
            id: row.id,
            position: GpsCoordinates::new(row.lat, row.long),
            major_mm: row.major_mm,
            minor_mm: row.minor_mm,
            subminor_mm: row.subminor_mm,
            volume_mm: row.volume_mm,
            average_diam_mm: row.average_diam_mm,
        }
    }
}

/// Database row for the pushed-down aggregate
#[derive(Debug, Clone, sqlx::FromRow)]
struct PredictedVolumeAggregateRow {
    pub count: i64,
    pub avg_predicted_volume: Option<Decimal>,
    pub total_predicted_volume: Option<Decimal>,
    pub avg_diameter: Option<Decimal>,
    pub min_predicted_volume: Option<Decimal>,
    pub max_predicted_volume: Option<Decimal>,
}

impl PgFruitStore {
    /// Create a new PgFruitStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FruitStore for PgFruitStore {
    async fn select_by_diameter(
        &self,
        range: &DiameterRange,
    ) -> Result<Vec<FruitRecord>, StoreError> {
        let rows = sqlx::query_as::<_, FruitRow>(
            r#"
            SELECT id, lat, long, major_mm, minor_mm, subminor_mm, volume_mm, average_diam_mm
            FROM fruit
            WHERE average_diam_mm >= $1 AND average_diam_mm <= $2
            ORDER BY id
            "#,
        )
        .bind(range.min)
        .bind(range.max)
        .fetch_all(&self.db)
        .await
        .map_err(store_error)?;

        tracing::debug!(
            "Selected {} fruits between {} and {} mm",
            rows.len(),
            range.min,
            range.max
        );

        Ok(rows.into_iter().map(FruitRecord::from).collect())
    }

    async fn aggregate_predicted(
        &self,
        range: &DiameterRange,
        growth_volume: Decimal,
    ) -> Result<HarvestStatistics, StoreError> {
        // AVG over NUMERIC carries up to 16+ fractional digits; round so the
        // result decodes into a Decimal
        let row = sqlx::query_as::<_, PredictedVolumeAggregateRow>(
            r#"
            SELECT
                COUNT(id) AS count,
                ROUND(AVG(volume_mm + $1), 10) AS avg_predicted_volume,
                SUM(volume_mm + $1) AS total_predicted_volume,
                ROUND(AVG(average_diam_mm), 10) AS avg_diameter,
                MIN(volume_mm + $1) AS min_predicted_volume,
                MAX(volume_mm + $1) AS max_predicted_volume
            FROM fruit
            WHERE average_diam_mm >= $2 AND average_diam_mm <= $3
            "#,
        )
        .bind(growth_volume)
        .bind(range.min)
        .bind(range.max)
        .fetch_one(&self.db)
        .await
        .map_err(aggregate_error)?;

        Ok(HarvestStatistics::from_aggregate(
            row.count,
            row.avg_predicted_volume,
            row.total_predicted_volume,
            row.avg_diameter,
            row.min_predicted_volume,
            row.max_predicted_volume,
        ))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .map(|_| ())
            .map_err(store_error)
    }
}

fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

/// NUMERIC aggregates that do not decode into a `Decimal` are out of range
fn aggregate_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::ColumnDecode { .. } => StoreError::OutOfRange(err.to_string()),
        other => store_error(other),
    }
}
