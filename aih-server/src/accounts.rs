//! Operator accounts
//!
//! Token issuance is out of scope; a successful login only returns the user
//! and records an access log entry.

use sqlx::{Row, SqlitePool};
use tracing::info;

use aih_common::db::User;
use aih_common::password::{generate_salt, hash_password, verify_password};
use aih_common::time::db_now;
use aih_common::validation::require_text;
use aih_common::{Error, Result};

use crate::audit::{log_action, LOGIN_ACTION};

pub const MIN_PASSWORD_LEN: usize = 4;

pub async fn create_user(db: &SqlitePool, name: &str, password: &str) -> Result<User> {
    let name = require_text("User name", name)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "Password must have at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let salt = generate_salt();
    let result = sqlx::query(
        "INSERT INTO users (name, password_hash, password_salt, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&name)
    .bind(hash_password(password, &salt))
    .bind(&salt)
    .bind(db_now())
    .execute(db)
    .await
    .map_err(Error::from)
    .map_err(|e| {
        if e.is_unique_violation() {
            Error::DuplicateRecord(format!("User already exists: {}", name))
        } else {
            e
        }
    })?;

    info!("Created user {}", name);
    Ok(User {
        id: result.last_insert_rowid(),
        name,
    })
}

/// Verify credentials and record the login
pub async fn login(db: &SqlitePool, name: &str, password: &str) -> Result<User> {
    let row = sqlx::query("SELECT id, name, password_hash, password_salt FROM users WHERE name = ?")
        .bind(name.trim())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid user or password".to_string()))?;

    let hash: String = row.try_get("password_hash")?;
    let salt: String = row.try_get("password_salt")?;
    if !verify_password(password, &salt, &hash) {
        return Err(Error::Unauthorized("Invalid user or password".to_string()));
    }

    let user = User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    };
    log_action(db, user.id, LOGIN_ACTION).await;
    Ok(user)
}

pub async fn find_user(db: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, name FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;

    row.map(|r| {
        Ok(User {
            id: r.try_get("id")?,
            name: r.try_get("name")?,
        })
    })
    .transpose()
}
