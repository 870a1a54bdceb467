//! Glosa tracker: flagged line items on a record
//!
//! Glosas are never hard-deleted. Removing one clears its `active` flag and
//! only active glosas count as pending.

use serde::Deserialize;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info, warn};

use aih_common::db::Glosa;
use aih_common::time::db_now;
use aih_common::validation::require_text;
use aih_common::{Error, Result};

use crate::catalog::Catalog;

fn default_quantity() -> i64 {
    1
}

/// Glosa input
#[derive(Debug, Clone, Deserialize)]
pub struct NewGlosa {
    pub line_ref: String,
    pub glosa_type: String,
    pub professional: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

/// Append an active glosa to a record
///
/// Duplicates of (line_ref, glosa_type) accumulate. An uncatalogued type is
/// accepted with a warning.
pub async fn add_glosa(
    db: &SqlitePool,
    catalog: &Catalog,
    aih_id: i64,
    new: NewGlosa,
) -> Result<Glosa> {
    let line_ref = require_text("Line reference", &new.line_ref)?;
    let glosa_type = require_text("Glosa type", &new.glosa_type)?;
    let professional = require_text("Professional", &new.professional)?;
    if new.quantity < 1 {
        return Err(Error::Validation(format!(
            "Quantity must be at least 1, got {}",
            new.quantity
        )));
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM aihs WHERE id = ?)")
        .bind(aih_id)
        .fetch_one(db)
        .await?;
    if !exists {
        return Err(Error::NotFound(format!("AIH {}", aih_id)));
    }

    if !catalog.is_known_glosa_type(&glosa_type).await? {
        warn!("Glosa type not in catalog: {:?}", glosa_type);
    }

    let row = sqlx::query(
        r#"
        INSERT INTO glosas (aih_id, line_ref, glosa_type, professional, quantity, active, created_at)
        VALUES (?, ?, ?, ?, ?, 1, ?)
        RETURNING *
        "#,
    )
    .bind(aih_id)
    .bind(&line_ref)
    .bind(&glosa_type)
    .bind(&professional)
    .bind(new.quantity)
    .bind(db_now())
    .fetch_one(db)
    .await?;

    let glosa = Glosa::from_row(&row)?;
    info!("AIH {}: glosa {} added ({} x{})", aih_id, glosa.id, glosa_type, glosa.quantity);
    Ok(glosa)
}

/// Soft-delete a glosa
///
/// Unknown or already inactive ids are a no-op, not an error.
pub async fn remove_glosa(db: &SqlitePool, glosa_id: i64) -> Result<()> {
    let result = sqlx::query("UPDATE glosas SET active = 0 WHERE id = ? AND active = 1")
        .bind(glosa_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        debug!("Glosa {} already inactive or unknown", glosa_id);
    } else {
        info!("Glosa {} removed", glosa_id);
    }
    Ok(())
}

/// Active glosas of a record in insertion order
pub async fn list_active<'e, E>(executor: E, aih_id: i64) -> Result<Vec<Glosa>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("SELECT * FROM glosas WHERE aih_id = ? AND active = 1 ORDER BY id")
        .bind(aih_id)
        .fetch_all(executor)
        .await?
        .iter()
        .map(Glosa::from_row)
        .collect()
}

pub async fn count_active<'e, E>(executor: E, aih_id: i64) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM glosas WHERE aih_id = ? AND active = 1")
        .bind(aih_id)
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// Whether the caller should confirm before finalizing a movement
pub async fn has_pending(db: &SqlitePool, aih_id: i64) -> Result<bool> {
    Ok(count_active(db, aih_id).await? > 0)
}
