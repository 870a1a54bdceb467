//! Caller identification middleware
//!
//! Protected routes require an `x-user-id` header naming an existing user.
//! Token issuance is handled outside this service.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use aih_common::db::User;
use aih_common::Error;

use super::error::ApiError;
use crate::{accounts, AppState};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller, inserted as a request extension
#[derive(Debug, Clone)]
pub struct Caller(pub User);

impl Caller {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

/// Authentication middleware
///
/// Returns 401 when the header is missing, malformed, or names no user.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Unauthorized(format!("Missing {} header", USER_ID_HEADER)))?;

    let user_id: i64 = raw.trim().parse().map_err(|_| {
        warn!("Malformed {} header: {:?}", USER_ID_HEADER, raw);
        Error::Unauthorized(format!("Invalid {} header", USER_ID_HEADER))
    })?;

    let user = accounts::find_user(&state.db, user_id)
        .await?
        .ok_or_else(|| Error::Unauthorized(format!("Unknown user {}", user_id)))?;

    request.extensions_mut().insert(Caller(user));
    Ok(next.run(request).await)
}
