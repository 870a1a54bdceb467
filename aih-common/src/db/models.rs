//! Database models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};

use crate::domain::{status_description, AihStatus, MovementKind, Specialty};
use crate::money::Money;
use crate::time::parse_db_timestamp;
use crate::{Error, Result};

/// Authorization record (AIH) header row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AihRecord {
    pub id: i64,
    pub number: String,
    pub initial_value: Money,
    pub current_value: Money,
    pub competency: String,
    pub status: AihStatus,
    pub owner_id: i64,
    pub created_at: NaiveDateTime,
}

impl AihRecord {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(AihRecord {
            id: row.try_get("id")?,
            number: row.try_get("number")?,
            initial_value: Money::from_cents(row.try_get("initial_value")?),
            current_value: Money::from_cents(row.try_get("current_value")?),
            competency: row.try_get("competency")?,
            status: AihStatus::try_from(row.try_get::<i64, _>("status")?)?,
            owner_id: row.try_get("owner_id")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }

    pub fn status_description(&self) -> &'static str {
        status_description(self.status.code())
    }
}

/// Reviewing professionals named on a movement, one slot per specialty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalRefs {
    pub medicine: Option<String>,
    pub nursing: Option<String>,
    pub physiotherapy: Option<String>,
    pub maxillofacial: Option<String>,
}

impl ProfessionalRefs {
    pub fn get(&self, specialty: Specialty) -> Option<&str> {
        match specialty {
            Specialty::Medicine => self.medicine.as_deref(),
            Specialty::Nursing => self.nursing.as_deref(),
            Specialty::Physiotherapy => self.physiotherapy.as_deref(),
            Specialty::Maxillofacial => self.maxillofacial.as_deref(),
        }
    }

    /// First populated slot in attribution priority order
    pub fn first_named(&self) -> Option<&str> {
        Specialty::PRIORITY.iter().find_map(|s| self.get(*s))
    }

    /// Blank names become None
    pub fn normalized(self) -> Self {
        fn clean(name: Option<String>) -> Option<String> {
            name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
        }
        ProfessionalRefs {
            medicine: clean(self.medicine),
            nursing: clean(self.nursing),
            physiotherapy: clean(self.physiotherapy),
            maxillofacial: clean(self.maxillofacial),
        }
    }
}

/// Append-only movement ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: i64,
    pub aih_id: i64,
    pub kind: MovementKind,
    pub user_id: i64,
    pub value: Money,
    pub competency: String,
    pub status: AihStatus,
    pub professionals: ProfessionalRefs,
    pub notes: Option<String>,
    pub recorded_at: NaiveDateTime,
}

impl Movement {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let kind: String = row.try_get("kind")?;
        Ok(Movement {
            id: row.try_get("id")?,
            aih_id: row.try_get("aih_id")?,
            kind: MovementKind::from_str(&kind)
                .ok_or_else(|| Error::Internal(format!("Unknown movement kind: {}", kind)))?,
            user_id: row.try_get("user_id")?,
            value: Money::from_cents(row.try_get("value")?),
            competency: row.try_get("competency")?,
            status: AihStatus::try_from(row.try_get::<i64, _>("status")?)?,
            professionals: ProfessionalRefs {
                medicine: row.try_get("prof_medicine")?,
                nursing: row.try_get("prof_nursing")?,
                physiotherapy: row.try_get("prof_physiotherapy")?,
                maxillofacial: row.try_get("prof_maxillofacial")?,
            },
            notes: row.try_get("notes")?,
            recorded_at: timestamp_column(row, "recorded_at")?,
        })
    }
}

/// Flagged line item on a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glosa {
    pub id: i64,
    pub aih_id: i64,
    pub line_ref: String,
    pub glosa_type: String,
    pub professional: String,
    pub quantity: i64,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl Glosa {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Glosa {
            id: row.try_get("id")?,
            aih_id: row.try_get("aih_id")?,
            line_ref: row.try_get("line_ref")?,
            glosa_type: row.try_get("glosa_type")?,
            professional: row.try_get("professional")?,
            quantity: row.try_get("quantity")?,
            active: row.try_get::<i64, _>("active")? != 0,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    pub id: i64,
    pub name: String,
    pub specialty: Specialty,
}

impl Professional {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let specialty: String = row.try_get("specialty")?;
        Ok(Professional {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            specialty: Specialty::from_str(&specialty)
                .ok_or_else(|| Error::Internal(format!("Unknown specialty: {}", specialty)))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlosaType {
    pub id: i64,
    pub description: String,
}

/// Operator account (password material never leaves the store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// Read a TEXT timestamp column written with `time::DB_TIMESTAMP_FORMAT`
pub fn timestamp_column(row: &SqliteRow, column: &str) -> Result<NaiveDateTime> {
    let raw: String = row.try_get(column)?;
    parse_db_timestamp(&raw)
        .ok_or_else(|| Error::Internal(format!("Malformed timestamp in {}: {}", column, raw)))
}
