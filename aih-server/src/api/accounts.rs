//! Login and account creation (public routes)

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use aih_common::db::User;

use super::error::ApiResult;
use crate::{accounts, AppState};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> ApiResult<Json<User>> {
    let user = accounts::login(&state.db, &credentials.name, &credentials.password).await?;
    Ok(Json(user))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = accounts::create_user(&state.db, &credentials.name, &credentials.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
