//! Access/audit log
//!
//! Appends are fire-and-forget: a failed write is logged and swallowed so it
//! never fails the operation being audited.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use aih_common::time::db_now;

/// Action text recorded on every successful login
pub const LOGIN_ACTION: &str = "Login";

pub async fn log_action(db: &SqlitePool, user_id: i64, action: &str) {
    let result = sqlx::query("INSERT INTO access_log (user_id, action, logged_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(action)
        .bind(db_now())
        .execute(db)
        .await;

    match result {
        Ok(_) => debug!("Audit: user {} {}", user_id, action),
        Err(e) => warn!("Failed to write audit entry for user {}: {}", user_id, e),
    }
}
