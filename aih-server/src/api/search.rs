//! Record search and export

use axum::{extract::State, Json};

use super::error::ApiResult;
use crate::query::{self, ExportRow, SearchFilters, SearchRow};
use crate::AppState;

/// POST /api/search
///
/// Body is a [`SearchFilters`] object; omitted fields do not filter.
pub async fn post_search(
    State(state): State<AppState>,
    Json(filters): Json<SearchFilters>,
) -> ApiResult<Json<Vec<SearchRow>>> {
    Ok(Json(query::search(&state.db, &filters).await?))
}

/// GET /api/export
///
/// Rows for the spreadsheet generator; file rendering happens client side.
pub async fn get_export(State(state): State<AppState>) -> ApiResult<Json<Vec<ExportRow>>> {
    Ok(Json(query::export_rows(&state.db).await?))
}
