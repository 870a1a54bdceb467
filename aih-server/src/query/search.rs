//! Record search and export rows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use aih_common::db::AihRecord;
use aih_common::domain::status_description;
use aih_common::{AihStatus, Error, Money, Result};

/// Search filters; every field is optional and they combine with AND
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub status: Vec<AihStatus>,
    pub competency: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub date_from: Option<String>,
    /// YYYY-MM-DD, inclusive through 23:59:59
    pub date_to: Option<String>,
    pub value_min: Option<Money>,
    pub value_max: Option<Money>,
    /// Substring of the AIH number
    pub number: Option<String>,
    /// Substring of any professional named on any movement
    pub professional: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRow {
    #[serde(flatten)]
    pub record: AihRecord,
    pub status_description: &'static str,
    pub active_glosa_count: i64,
}

/// Row-shaped data for the file export collaborator
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub number: String,
    pub initial_value: Money,
    pub current_value: Money,
    pub status: i64,
    pub status_description: &'static str,
    pub competency: String,
    pub active_glosa_count: i64,
    /// Comma-joined, registration order
    pub attendances: String,
    pub created_at: String,
}

/// Records matching all filters, newest first
pub async fn search(db: &SqlitePool, filters: &SearchFilters) -> Result<Vec<SearchRow>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT a.*, COUNT(g.id) AS active_glosa_count
        FROM aihs a
        LEFT JOIN glosas g ON g.aih_id = a.id AND g.active = 1
        WHERE 1 = 1
        "#,
    );

    if !filters.status.is_empty() {
        qb.push(" AND a.status IN (");
        let mut codes = qb.separated(", ");
        for status in &filters.status {
            codes.push_bind(status.code());
        }
        codes.push_unseparated(")");
    }

    if let Some(competency) = non_empty(&filters.competency) {
        qb.push(" AND a.competency = ").push_bind(competency.to_string());
    }

    if let Some(from) = non_empty(&filters.date_from) {
        let from = parse_date("date_from", from)?;
        qb.push(" AND a.created_at >= ")
            .push_bind(format!("{} 00:00:00", from.format("%Y-%m-%d")));
    }

    if let Some(to) = non_empty(&filters.date_to) {
        let to = parse_date("date_to", to)?;
        qb.push(" AND a.created_at <= ")
            .push_bind(format!("{} 23:59:59", to.format("%Y-%m-%d")));
    }

    if let Some(min) = filters.value_min {
        qb.push(" AND a.current_value >= ").push_bind(min.cents());
    }

    if let Some(max) = filters.value_max {
        qb.push(" AND a.current_value <= ").push_bind(max.cents());
    }

    if let Some(number) = non_empty(&filters.number) {
        qb.push(r" AND a.number LIKE ")
            .push_bind(like_pattern(number))
            .push(r" ESCAPE '\'");
    }

    if let Some(professional) = non_empty(&filters.professional) {
        let pattern = like_pattern(professional);
        qb.push(" AND a.id IN (SELECT aih_id FROM movements WHERE prof_medicine LIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR prof_nursing LIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR prof_physiotherapy LIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR prof_maxillofacial LIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }

    qb.push(" GROUP BY a.id ORDER BY a.created_at DESC, a.id DESC");

    qb.build()
        .fetch_all(db)
        .await?
        .iter()
        .map(|row| {
            let record = AihRecord::from_row(row)?;
            Ok(SearchRow {
                status_description: record.status_description(),
                active_glosa_count: row.try_get("active_glosa_count")?,
                record,
            })
        })
        .collect()
}

/// Every record flattened for export, newest first
pub async fn export_rows(db: &SqlitePool) -> Result<Vec<ExportRow>> {
    let rows = sqlx::query(
        r#"
        SELECT a.number, a.initial_value, a.current_value, a.status, a.competency, a.created_at,
               (SELECT COUNT(*) FROM glosas g WHERE g.aih_id = a.id AND g.active = 1) AS active_glosa_count,
               (SELECT GROUP_CONCAT(attendance, ',')
                  FROM (SELECT attendance FROM attendances t WHERE t.aih_id = a.id ORDER BY t.position)
               ) AS attendances
        FROM aihs a
        ORDER BY a.created_at DESC, a.id DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    rows.iter()
        .map(|row| {
            let status: i64 = row.try_get("status")?;
            Ok(ExportRow {
                number: row.try_get("number")?,
                initial_value: Money::from_cents(row.try_get("initial_value")?),
                current_value: Money::from_cents(row.try_get("current_value")?),
                status,
                status_description: status_description(status),
                competency: row.try_get("competency")?,
                active_glosa_count: row.try_get("active_glosa_count")?,
                attendances: row
                    .try_get::<Option<String>, _>("attendances")?
                    .unwrap_or_default(),
                created_at: row.try_get("created_at")?,
            })
        })
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("{} must be YYYY-MM-DD: {:?}", field, value)))
}

/// `%needle%` with LIKE wildcards in the needle escaped
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("123"), "%123%");
        assert_eq!(like_pattern("a_b%"), r"%a\_b\%%");
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("date_from", "2024-05-01").is_ok());
        assert!(matches!(
            parse_date("date_from", "01/05/2024"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_filters_deserialize_partial() {
        let filters: SearchFilters =
            serde_json::from_str(r#"{"status": [1, 4], "value_min": 900}"#).unwrap();
        assert_eq!(
            filters.status,
            vec![AihStatus::DirectApproval, AihStatus::FinalizedAfterDiscussion]
        );
        assert_eq!(filters.value_min, Some(Money::from_cents(90_000)));
        assert!(filters.competency.is_none());
    }
}
