//! Authorization record lifecycle
//!
//! A record is registered once and afterwards only changes through appended
//! movements. `status` and `current_value` on the record row are a
//! projection of the newest movement, recomputed inside the same
//! transaction that appends it.

use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use aih_common::db::{AihRecord, Glosa, Movement, ProfessionalRefs};
use aih_common::domain::TransitionPolicy;
use aih_common::time::db_now;
use aih_common::validation::{
    validate_aih_number, validate_attendances, validate_competency, validate_initial_value,
    validate_movement_value,
};
use aih_common::{AihStatus, Error, Money, MovementKind, Result};

use crate::audit::log_action;
use crate::glosas;

/// Notes stored on the synthetic first movement
pub const INITIAL_MOVEMENT_NOTES: &str = "Initial system entry";

/// Registration input
#[derive(Debug, Clone, Deserialize)]
pub struct NewAih {
    pub number: String,
    pub initial_value: Money,
    pub competency: String,
    pub attendances: Vec<String>,
}

/// Movement input (status already parsed)
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub kind: MovementKind,
    pub status: AihStatus,
    pub value: Money,
    pub competency: String,
    pub professionals: ProfessionalRefs,
    pub notes: Option<String>,
}

/// Lookup key: the 11-digit AIH number or the store id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    Number(String),
    Id(i64),
}

impl RecordKey {
    /// 11 digits → number, any other integer → id
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if validate_aih_number(raw).is_ok() {
            return Ok(RecordKey::Number(raw.to_string()));
        }
        raw.parse::<i64>()
            .map(RecordKey::Id)
            .map_err(|_| Error::Validation(format!("Invalid AIH number or id: {:?}", raw)))
    }
}

/// Record with everything attached to it
#[derive(Debug, Clone, Serialize)]
pub struct AihDetail {
    #[serde(flatten)]
    pub record: AihRecord,
    pub status_description: &'static str,
    /// Status 1 or 4: callers should confirm a re-submission with the
    /// operator before treating the lookup as a normal view
    pub finalized: bool,
    pub attendances: Vec<String>,
    /// Newest first
    pub movements: Vec<Movement>,
    pub glosas: Vec<Glosa>,
}

/// Result of appending a movement
#[derive(Debug, Clone, Serialize)]
pub struct MovementOutcome {
    pub record: AihRecord,
    pub movement_id: i64,
    /// Active glosas on the record; non-zero means the caller should have
    /// confirmed before finalizing
    pub active_glosas: i64,
}

/// Register a new record in status 3 with its first intake movement
pub async fn register(db: &SqlitePool, caller_id: i64, new: NewAih) -> Result<i64> {
    let number = new.number.trim().to_string();
    validate_aih_number(&number)?;
    validate_competency(&new.competency)?;
    validate_initial_value(new.initial_value)?;
    let attendances = validate_attendances(&new.attendances)?;

    // The insert is the first statement so the write lock is taken up
    // front; a taken number surfaces as a unique violation
    let mut tx = db.begin().await?;

    let now = db_now();
    let status = AihStatus::InDiscussionActive;
    let aih_id = sqlx::query(
        r#"
        INSERT INTO aihs (number, initial_value, current_value, competency, status, owner_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&number)
    .bind(new.initial_value.cents())
    .bind(new.initial_value.cents())
    .bind(&new.competency)
    .bind(status.code())
    .bind(caller_id)
    .bind(&now)
    .execute(&mut *tx)
    .await
    .map_err(|e| duplicate_or(e, &number))?
    .last_insert_rowid();

    for (position, attendance) in attendances.iter().enumerate() {
        sqlx::query("INSERT INTO attendances (aih_id, position, attendance) VALUES (?, ?, ?)")
            .bind(aih_id)
            .bind(position as i64)
            .bind(attendance)
            .execute(&mut *tx)
            .await?;
    }

    let first = NewMovement {
        kind: MovementKind::IntakeBySus,
        status,
        value: new.initial_value,
        competency: new.competency.clone(),
        professionals: ProfessionalRefs::default(),
        notes: Some(INITIAL_MOVEMENT_NOTES.to_string()),
    };
    insert_movement(&mut tx, aih_id, caller_id, &first, &now).await?;

    tx.commit().await?;

    info!("Registered AIH {} (id {})", number, aih_id);
    log_action(db, caller_id, &format!("Registered AIH {}", number)).await;
    Ok(aih_id)
}

/// Append a movement and re-project the record's status and current value
///
/// `policy` sees the current and requested status; the application uses
/// [`aih_common::domain::permissive_policy`].
pub async fn record_movement(
    db: &SqlitePool,
    caller_id: i64,
    aih_id: i64,
    movement: NewMovement,
    policy: TransitionPolicy,
) -> Result<MovementOutcome> {
    validate_movement_value(movement.value)?;
    validate_competency(&movement.competency)?;
    let movement = NewMovement {
        professionals: movement.professionals.normalized(),
        notes: movement
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        ..movement
    };

    let mut tx = db.begin().await?;

    // Touch the row first to take the write lock before reading
    let touched = sqlx::query("UPDATE aihs SET status = status WHERE id = ?")
        .bind(aih_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if touched == 0 {
        return Err(Error::NotFound(format!("AIH {}", aih_id)));
    }

    let current: i64 = sqlx::query_scalar("SELECT status FROM aihs WHERE id = ?")
        .bind(aih_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("AIH {}", aih_id)))?;
    policy(AihStatus::try_from(current)?, movement.status)?;

    let movement_id = insert_movement(&mut tx, aih_id, caller_id, &movement, &db_now()).await?;
    project_latest_movement(&mut tx, aih_id).await?;

    let row = sqlx::query("SELECT * FROM aihs WHERE id = ?")
        .bind(aih_id)
        .fetch_one(&mut *tx)
        .await?;
    let record = AihRecord::from_row(&row)?;
    let active_glosas = glosas::count_active(&mut *tx, aih_id).await?;

    tx.commit().await?;

    info!(
        "AIH {} movement {} ({}): status {} value {}",
        record.number,
        movement_id,
        movement.kind,
        record.status.code(),
        record.current_value
    );
    Ok(MovementOutcome {
        record,
        movement_id,
        active_glosas,
    })
}

/// Record with attendances, movements and active glosas
///
/// All parts are read from one snapshot.
pub async fn fetch(db: &SqlitePool, key: &RecordKey) -> Result<AihDetail> {
    let mut tx = db.begin().await?;

    let row = match key {
        RecordKey::Number(number) => {
            sqlx::query("SELECT * FROM aihs WHERE number = ?")
                .bind(number)
                .fetch_optional(&mut *tx)
                .await?
        }
        RecordKey::Id(id) => {
            sqlx::query("SELECT * FROM aihs WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        }
    };
    let record = match row {
        Some(row) => AihRecord::from_row(&row)?,
        None => {
            let shown = match key {
                RecordKey::Number(n) => n.clone(),
                RecordKey::Id(id) => id.to_string(),
            };
            return Err(Error::NotFound(format!("AIH {}", shown)));
        }
    };

    let attendances: Vec<String> = sqlx::query_scalar(
        "SELECT attendance FROM attendances WHERE aih_id = ? ORDER BY position",
    )
    .bind(record.id)
    .fetch_all(&mut *tx)
    .await?;

    let movements = sqlx::query(
        "SELECT * FROM movements WHERE aih_id = ? ORDER BY recorded_at DESC, id DESC",
    )
    .bind(record.id)
    .fetch_all(&mut *tx)
    .await?
    .iter()
    .map(Movement::from_row)
    .collect::<Result<Vec<_>>>()?;

    let glosas = glosas::list_active(&mut *tx, record.id).await?;
    tx.commit().await?;

    Ok(AihDetail {
        status_description: record.status_description(),
        finalized: record.status.is_finalized(),
        record,
        attendances,
        movements,
        glosas,
    })
}

async fn insert_movement(
    tx: &mut Transaction<'_, Sqlite>,
    aih_id: i64,
    user_id: i64,
    movement: &NewMovement,
    recorded_at: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO movements
            (aih_id, kind, user_id, value, competency, status,
             prof_medicine, prof_nursing, prof_physiotherapy, prof_maxillofacial,
             notes, recorded_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(aih_id)
    .bind(movement.kind.as_str())
    .bind(user_id)
    .bind(movement.value.cents())
    .bind(&movement.competency)
    .bind(movement.status.code())
    .bind(&movement.professionals.medicine)
    .bind(&movement.professionals.nursing)
    .bind(&movement.professionals.physiotherapy)
    .bind(&movement.professionals.maxillofacial)
    .bind(&movement.notes)
    .bind(recorded_at)
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Copy status and value of the last appended movement onto the record
async fn project_latest_movement(tx: &mut Transaction<'_, Sqlite>, aih_id: i64) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE aihs SET
            status = (SELECT status FROM movements WHERE aih_id = ? ORDER BY id DESC LIMIT 1),
            current_value = (SELECT value FROM movements WHERE aih_id = ? ORDER BY id DESC LIMIT 1)
        WHERE id = ?
        "#,
    )
    .bind(aih_id)
    .bind(aih_id)
    .bind(aih_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn duplicate_or(e: sqlx::Error, number: &str) -> Error {
    let e = Error::from(e);
    if e.is_unique_violation() {
        Error::DuplicateRecord(format!("AIH already registered: {}", number))
    } else {
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key_parse() {
        assert_eq!(
            RecordKey::parse("12345678901").unwrap(),
            RecordKey::Number("12345678901".to_string())
        );
        assert_eq!(RecordKey::parse("42").unwrap(), RecordKey::Id(42));
        assert_eq!(RecordKey::parse(" 7 ").unwrap(), RecordKey::Id(7));
        assert!(matches!(RecordKey::parse("abc"), Err(Error::Validation(_))));
    }
}
