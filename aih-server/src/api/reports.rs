//! Dashboard and reporting endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use aih_common::time::current_competency;
use aih_common::validation::validate_competency;

use super::error::ApiResult;
use crate::query::{self, Dashboard, Report, ReportKind};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// MM/YYYY; defaults to the current month
    pub competency: Option<String>,
}

/// GET /api/dashboard?competency=MM/YYYY
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardQuery>,
) -> ApiResult<Json<Dashboard>> {
    let competency = match params.competency.filter(|c| !c.trim().is_empty()) {
        Some(c) => {
            let c = c.trim().to_string();
            validate_competency(&c)?;
            c
        }
        None => current_competency(),
    };
    Ok(Json(query::dashboard(&state.db, &competency).await?))
}

/// GET /api/reports/:kind
pub async fn get_report(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Json<Report>> {
    let kind: ReportKind = kind.parse()?;
    Ok(Json(query::report(&state.db, &state.catalog, kind).await?))
}
