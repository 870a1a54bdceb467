//! Glosa endpoints scoped to a record

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use aih_common::db::Glosa;

use super::error::ApiResult;
use crate::glosas::{self, NewGlosa};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct GlosaList {
    pub glosas: Vec<Glosa>,
    /// Finalizing movements should be confirmed while this is true
    pub pending: bool,
}

/// GET /api/aih/:id/glosas
pub async fn list_glosas(
    State(state): State<AppState>,
    Path(aih_id): Path<i64>,
) -> ApiResult<Json<GlosaList>> {
    let glosas = glosas::list_active(&state.db, aih_id).await?;
    let pending = glosas::has_pending(&state.db, aih_id).await?;
    Ok(Json(GlosaList { glosas, pending }))
}

/// POST /api/aih/:id/glosas
pub async fn add_glosa(
    State(state): State<AppState>,
    Path(aih_id): Path<i64>,
    Json(new): Json<NewGlosa>,
) -> ApiResult<(StatusCode, Json<Glosa>)> {
    let glosa = glosas::add_glosa(&state.db, &state.catalog, aih_id, new).await?;
    Ok((StatusCode::CREATED, Json(glosa)))
}

/// DELETE /api/glosas/:id
pub async fn remove_glosa(
    State(state): State<AppState>,
    Path(glosa_id): Path<i64>,
) -> ApiResult<StatusCode> {
    glosas::remove_glosa(&state.db, glosa_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
