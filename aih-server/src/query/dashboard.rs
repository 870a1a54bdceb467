//! Dashboard metrics for a competency and since inception

use serde::Serialize;
use sqlx::SqlitePool;

use aih_common::{Money, MovementKind, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub competency: String,
    /// Distinct competencies of registered records, newest first
    pub competencies: Vec<String>,

    /// Intake minus discharge in the period; may be negative
    pub in_process: i64,
    pub finalized: i64,
    pub pending: i64,
    pub total: i64,

    pub global_intakes: i64,
    pub global_discharges: i64,
    pub global_in_process: i64,
    pub global_finalized: i64,
    pub global_total: i64,

    pub values: PeriodValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodValues {
    pub initial: Money,
    pub current: Money,
    /// Mean of (initial - current) over the period's records
    pub mean_glosa: Money,
}

pub async fn dashboard(db: &SqlitePool, competency: &str) -> Result<Dashboard> {
    let intakes = movement_records(db, MovementKind::IntakeBySus, Some(competency)).await?;
    let discharges =
        movement_records(db, MovementKind::DischargeFromHospital, Some(competency)).await?;

    let finalized = count_records(db, "status IN (1, 4) AND competency = ?", Some(competency)).await?;
    let pending = count_records(db, "status IN (2, 3) AND competency = ?", Some(competency)).await?;
    let total = count_records(db, "competency = ?", Some(competency)).await?;

    let global_intakes = movement_records(db, MovementKind::IntakeBySus, None).await?;
    let global_discharges = movement_records(db, MovementKind::DischargeFromHospital, None).await?;
    let global_finalized = count_records(db, "status IN (1, 4)", None).await?;
    let global_total = count_records(db, "1 = 1", None).await?;

    let (initial, current, mean): (Option<i64>, Option<i64>, Option<f64>) = sqlx::query_as(
        r#"
        SELECT SUM(initial_value), SUM(current_value), AVG(initial_value - current_value)
        FROM aihs
        WHERE competency = ?
        "#,
    )
    .bind(competency)
    .fetch_one(db)
    .await?;

    let competencies: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT competency
        FROM aihs
        ORDER BY CAST(SUBSTR(competency, 4, 4) AS INTEGER) DESC,
                 CAST(SUBSTR(competency, 1, 2) AS INTEGER) DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(Dashboard {
        competency: competency.to_string(),
        competencies,
        in_process: intakes - discharges,
        finalized,
        pending,
        total,
        global_intakes,
        global_discharges,
        global_in_process: global_intakes - global_discharges,
        global_finalized,
        global_total,
        values: PeriodValues {
            initial: Money::from_cents(initial.unwrap_or(0)),
            current: Money::from_cents(current.unwrap_or(0)),
            mean_glosa: Money::from_cents(mean.unwrap_or(0.0).round() as i64),
        },
    })
}

/// Distinct records with at least one movement of `kind`
async fn movement_records(
    db: &SqlitePool,
    kind: MovementKind,
    competency: Option<&str>,
) -> Result<i64> {
    let count: i64 = match competency {
        Some(competency) => {
            sqlx::query_scalar(
                "SELECT COUNT(DISTINCT aih_id) FROM movements WHERE kind = ? AND competency = ?",
            )
            .bind(kind.as_str())
            .bind(competency)
            .fetch_one(db)
            .await?
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(DISTINCT aih_id) FROM movements WHERE kind = ?")
                .bind(kind.as_str())
                .fetch_one(db)
                .await?
        }
    };
    Ok(count)
}

/// `condition` is a fixed fragment from this module, never caller input
async fn count_records(db: &SqlitePool, condition: &str, competency: Option<&str>) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM aihs WHERE {}", condition);
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(competency) = competency {
        query = query.bind(competency);
    }
    Ok(query.fetch_one(db).await?)
}
