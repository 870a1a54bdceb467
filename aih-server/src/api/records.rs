//! AIH registration, lookup and movements

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use aih_common::db::ProfessionalRefs;
use aih_common::{AihStatus, Money, MovementKind};

use super::auth::Caller;
use super::error::ApiResult;
use crate::lifecycle::{self, AihDetail, MovementOutcome, NewAih, NewMovement, RecordKey};
use crate::AppState;

/// Movement body; `status` arrives as its numeric code
#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    pub kind: MovementKind,
    pub status: i64,
    pub value: Money,
    pub competency: String,
    #[serde(default)]
    pub professionals: ProfessionalRefs,
    #[serde(default)]
    pub notes: Option<String>,
}

impl MovementRequest {
    fn into_movement(self) -> aih_common::Result<NewMovement> {
        Ok(NewMovement {
            kind: self.kind,
            status: AihStatus::try_from(self.status)?,
            value: self.value,
            competency: self.competency,
            professionals: self.professionals,
            notes: self.notes,
        })
    }
}

/// POST /api/aih
pub async fn register_aih(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(new): Json<NewAih>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let id = lifecycle::register(&state.db, caller.id(), new).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// GET /api/aih/:id
///
/// The segment is the 11-digit AIH number or the record id.
pub async fn get_aih(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<AihDetail>> {
    let key = RecordKey::parse(&key)?;
    Ok(Json(lifecycle::fetch(&state.db, &key).await?))
}

/// POST /api/aih/:id/movements
pub async fn post_movement(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
    Json(request): Json<MovementRequest>,
) -> ApiResult<(StatusCode, Json<MovementOutcome>)> {
    let movement = request.into_movement()?;
    let outcome = lifecycle::record_movement(
        &state.db,
        caller.id(),
        id,
        movement,
        state.transition_policy,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
