//! aih-server library: AIH billing authorization tracking
//!
//! Core operations live in plain async functions over a `SqlitePool`; the
//! `api` module is thin axum wiring on top of them.

use axum::Router;
use sqlx::SqlitePool;

use aih_common::config::AppConfig;
use aih_common::domain::{permissive_policy, TransitionPolicy};

pub mod accounts;
pub mod api;
pub mod audit;
pub mod catalog;
pub mod glosas;
pub mod lifecycle;
pub mod query;

use catalog::Catalog;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub catalog: Catalog,
    /// Applied to every recorded movement
    pub transition_policy: TransitionPolicy,
}

impl AppState {
    /// State with default cache TTLs and the permissive transition policy
    pub fn new(db: SqlitePool) -> Self {
        Self {
            catalog: Catalog::with_default_ttls(db.clone()),
            db,
            transition_policy: permissive_policy,
        }
    }

    pub fn from_config(db: SqlitePool, config: &AppConfig) -> Self {
        Self {
            catalog: Catalog::new(db.clone(), config.professionals_ttl, config.glosa_types_ttl),
            db,
            transition_policy: permissive_policy,
        }
    }
}

/// Build application router
///
/// `/health`, login and account creation are public; everything else needs
/// an `x-user-id` header naming an existing user.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    let protected = Router::new()
        .route("/api/dashboard", get(api::get_dashboard))
        .route("/api/aih", post(api::register_aih))
        .route("/api/aih/:id", get(api::get_aih))
        .route("/api/aih/:id/movements", post(api::post_movement))
        .route("/api/aih/:id/glosas", get(api::list_glosas).post(api::add_glosa))
        .route("/api/glosas/:id", delete(api::remove_glosa))
        .route(
            "/api/glosa-types",
            get(api::list_glosa_types).post(api::add_glosa_type),
        )
        .route("/api/glosa-types/:id", delete(api::remove_glosa_type))
        .route(
            "/api/professionals",
            get(api::list_professionals).post(api::add_professional),
        )
        .route("/api/professionals/:id", delete(api::remove_professional))
        .route("/api/search", post(api::post_search))
        .route("/api/reports/:kind", get(api::get_report))
        .route("/api/export", get(api::get_export))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/api/login", post(api::login))
        .route("/api/users", post(api::create_user))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
}
