//! Reporting rollups
//!
//! Report kinds keep their established wire names (`acessos`,
//! `glosas-profissional`, ...) since saved links and the front end use them.

use serde::Serialize;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use aih_common::domain::status_description;
use aih_common::{AihStatus, Error, Money, Result, Specialty};

use crate::catalog::Catalog;

/// Months reported by the glosa trend
pub const TREND_MONTHS: i64 = 6;

pub const FORECAST_TEXT: &str =
    "Based on the data, the average processing time is expected to hold";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    AccessLog,
    GlosasByProfessional,
    AihsByProfessional,
    Approvals,
    GlosaTypes,
    PredictiveAnalysis,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::AccessLog => "acessos",
            ReportKind::GlosasByProfessional => "glosas-profissional",
            ReportKind::AihsByProfessional => "aihs-profissional",
            ReportKind::Approvals => "aprovacoes",
            ReportKind::GlosaTypes => "tipos-glosa",
            ReportKind::PredictiveAnalysis => "analise-preditiva",
        }
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "acessos" => Ok(ReportKind::AccessLog),
            "glosas-profissional" => Ok(ReportKind::GlosasByProfessional),
            "aihs-profissional" => Ok(ReportKind::AihsByProfessional),
            "aprovacoes" => Ok(ReportKind::Approvals),
            "tipos-glosa" => Ok(ReportKind::GlosaTypes),
            "analise-preditiva" => Ok(ReportKind::PredictiveAnalysis),
            other => Err(Error::Validation(format!("Unknown report: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "result")]
pub enum Report {
    #[serde(rename = "acessos")]
    AccessLog(Vec<AccessRow>),
    #[serde(rename = "glosas-profissional")]
    GlosasByProfessional(Vec<GlosaProfessionalRow>),
    #[serde(rename = "aihs-profissional")]
    AihsByProfessional(Vec<AihProfessionalRow>),
    #[serde(rename = "aprovacoes")]
    Approvals(ApprovalsReport),
    #[serde(rename = "tipos-glosa")]
    GlosaTypes(Vec<GlosaTypeRow>),
    #[serde(rename = "analise-preditiva")]
    PredictiveAnalysis(PredictiveReport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessRow {
    pub user: String,
    pub logins: i64,
    pub last_login: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlosaProfessionalRow {
    pub professional: String,
    pub glosas: i64,
    pub items: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AihProfessionalRow {
    pub professional: String,
    pub aihs: i64,
    pub movements: i64,
    /// Catalog specialties registered under this name; empty when the name
    /// is not catalogued
    pub specialties: Vec<Specialty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalsReport {
    pub rows: Vec<ApprovalRow>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalRow {
    pub status: i64,
    pub description: &'static str,
    pub count: i64,
    /// count / total * 100, one decimal
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlosaTypeRow {
    pub glosa_type: String,
    pub occurrences: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictiveReport {
    /// Mean days from registration to now over finalized records
    pub mean_processing_days: i64,
    /// Active glosas per YYYY-MM, newest month first
    pub glosa_trend: Vec<MonthCount>,
    /// Mean (initial - current) over records with an active glosa
    pub mean_glosa_value: Money,
    pub forecast: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCount {
    pub month: String,
    pub total: i64,
}

pub async fn report(db: &SqlitePool, catalog: &Catalog, kind: ReportKind) -> Result<Report> {
    Ok(match kind {
        ReportKind::AccessLog => Report::AccessLog(access_log(db).await?),
        ReportKind::GlosasByProfessional => {
            Report::GlosasByProfessional(glosas_by_professional(db).await?)
        }
        ReportKind::AihsByProfessional => {
            Report::AihsByProfessional(aihs_by_professional(db, catalog).await?)
        }
        ReportKind::Approvals => Report::Approvals(approvals(db).await?),
        ReportKind::GlosaTypes => Report::GlosaTypes(glosa_types(db).await?),
        ReportKind::PredictiveAnalysis => {
            Report::PredictiveAnalysis(predictive_analysis(db).await?)
        }
    })
}

async fn access_log(db: &SqlitePool) -> Result<Vec<AccessRow>> {
    let rows = sqlx::query(
        r#"
        SELECT u.name AS user, COUNT(l.id) AS logins, MAX(l.logged_at) AS last_login
        FROM access_log l
        JOIN users u ON l.user_id = u.id
        WHERE l.action = ?
        GROUP BY u.id
        ORDER BY logins DESC, u.name
        "#,
    )
    .bind(crate::audit::LOGIN_ACTION)
    .fetch_all(db)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(AccessRow {
                user: row.try_get("user")?,
                logins: row.try_get("logins")?,
                last_login: row.try_get("last_login")?,
            })
        })
        .collect()
}

/// Grouped by the name recorded on the glosa, not on movements
async fn glosas_by_professional(db: &SqlitePool) -> Result<Vec<GlosaProfessionalRow>> {
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT professional, COUNT(*) AS glosas, SUM(quantity) AS items
        FROM glosas
        WHERE active = 1
        GROUP BY professional
        ORDER BY glosas DESC, professional
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(professional, glosas, items)| GlosaProfessionalRow {
            professional,
            glosas,
            items,
        })
        .collect())
}

/// Movements attributed to the first populated professional slot
///
/// Priority is medicine, nursing, physiotherapy, maxillofacial; a movement
/// naming several professionals counts only for the first.
async fn aihs_by_professional(
    db: &SqlitePool,
    catalog: &Catalog,
) -> Result<Vec<AihProfessionalRow>> {
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT COALESCE(prof_medicine, prof_nursing, prof_physiotherapy, prof_maxillofacial) AS professional,
               COUNT(DISTINCT aih_id) AS aihs,
               COUNT(*) AS movements
        FROM movements
        WHERE prof_medicine IS NOT NULL
           OR prof_nursing IS NOT NULL
           OR prof_physiotherapy IS NOT NULL
           OR prof_maxillofacial IS NOT NULL
        GROUP BY professional
        ORDER BY aihs DESC, professional
        "#,
    )
    .fetch_all(db)
    .await?;

    let mut report = Vec::with_capacity(rows.len());
    for (professional, aihs, movements) in rows {
        let known: Vec<Specialty> = catalog
            .professionals_named(&professional)
            .await?
            .into_iter()
            .map(|p| p.specialty)
            .collect();
        // Each specialty once, in priority order
        let specialties: Vec<Specialty> = Specialty::PRIORITY
            .into_iter()
            .filter(|s| known.contains(s))
            .collect();
        report.push(AihProfessionalRow {
            professional,
            aihs,
            movements,
            specialties,
        });
    }
    Ok(report)
}

async fn approvals(db: &SqlitePool) -> Result<ApprovalsReport> {
    let counts: Vec<(i64, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM aihs GROUP BY status")
            .fetch_all(db)
            .await?;
    let total: i64 = counts.iter().map(|(_, c)| c).sum();

    Ok(ApprovalsReport {
        rows: AihStatus::ALL
            .iter()
            .map(|status| {
                let count = counts
                    .iter()
                    .find(|(code, _)| *code == status.code())
                    .map(|(_, c)| *c)
                    .unwrap_or(0);
                ApprovalRow {
                    status: status.code(),
                    description: status_description(status.code()),
                    count,
                    percent: percent(count, total),
                }
            })
            .collect(),
        total,
    })
}

/// Percentage with one decimal; a zero total is treated as 1
pub fn percent(count: i64, total: i64) -> f64 {
    let total = if total == 0 { 1 } else { total };
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

async fn glosa_types(db: &SqlitePool) -> Result<Vec<GlosaTypeRow>> {
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT glosa_type, COUNT(*) AS occurrences, SUM(quantity) AS quantity
        FROM glosas
        WHERE active = 1
        GROUP BY glosa_type
        ORDER BY occurrences DESC, glosa_type
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(glosa_type, occurrences, quantity)| GlosaTypeRow {
            glosa_type,
            occurrences,
            quantity,
        })
        .collect())
}

async fn predictive_analysis(db: &SqlitePool) -> Result<PredictiveReport> {
    let mean_days: Option<f64> = sqlx::query_scalar(
        "SELECT AVG(JULIANDAY('now') - JULIANDAY(created_at)) FROM aihs WHERE status IN (1, 4)",
    )
    .fetch_one(db)
    .await?;

    let trend: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT strftime('%Y-%m', created_at) AS month, COUNT(*) AS total
        FROM glosas
        WHERE active = 1
        GROUP BY month
        ORDER BY month DESC
        LIMIT ?
        "#,
    )
    .bind(TREND_MONTHS)
    .fetch_all(db)
    .await?;

    let mean_glosa: Option<f64> = sqlx::query_scalar(
        r#"
        SELECT AVG(a.initial_value - a.current_value)
        FROM aihs a
        WHERE EXISTS (SELECT 1 FROM glosas g WHERE g.aih_id = a.id AND g.active = 1)
        "#,
    )
    .fetch_one(db)
    .await?;

    Ok(PredictiveReport {
        mean_processing_days: mean_days.unwrap_or(0.0).round() as i64,
        glosa_trend: trend
            .into_iter()
            .map(|(month, total)| MonthCount { month, total })
            .collect(),
        mean_glosa_value: Money::from_cents(mean_glosa.unwrap_or(0.0).round() as i64),
        forecast: FORECAST_TEXT,
    })
}
