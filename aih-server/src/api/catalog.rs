//! Professional and glosa type catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use aih_common::db::{GlosaType, Professional};
use aih_common::Specialty;

use super::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewProfessional {
    pub name: String,
    pub specialty: Specialty,
}

#[derive(Debug, Deserialize)]
pub struct NewGlosaType {
    pub description: String,
}

/// GET /api/professionals
pub async fn list_professionals(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Professional>>> {
    let list = state.catalog.professionals().await?;
    Ok(Json(list.as_ref().clone()))
}

/// POST /api/professionals
pub async fn add_professional(
    State(state): State<AppState>,
    Json(new): Json<NewProfessional>,
) -> ApiResult<(StatusCode, Json<Professional>)> {
    let professional = state.catalog.add_professional(&new.name, new.specialty).await?;
    Ok((StatusCode::CREATED, Json(professional)))
}

/// DELETE /api/professionals/:id
pub async fn remove_professional(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.catalog.remove_professional(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/glosa-types
pub async fn list_glosa_types(State(state): State<AppState>) -> ApiResult<Json<Vec<GlosaType>>> {
    let list = state.catalog.glosa_types().await?;
    Ok(Json(list.as_ref().clone()))
}

/// POST /api/glosa-types
pub async fn add_glosa_type(
    State(state): State<AppState>,
    Json(new): Json<NewGlosaType>,
) -> ApiResult<(StatusCode, Json<GlosaType>)> {
    let glosa_type = state.catalog.add_glosa_type(&new.description).await?;
    Ok((StatusCode::CREATED, Json(glosa_type)))
}

/// DELETE /api/glosa-types/:id
pub async fn remove_glosa_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.catalog.remove_glosa_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
