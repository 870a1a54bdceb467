//! HTTP API handlers for aih-server

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod glosas;
pub mod health;
pub mod records;
pub mod reports;
pub mod search;

pub use accounts::{create_user, login};
pub use auth::{auth_middleware, Caller, USER_ID_HEADER};
pub use catalog::{
    add_glosa_type, add_professional, list_glosa_types, list_professionals, remove_glosa_type,
    remove_professional,
};
pub use error::{ApiError, ApiResult};
pub use glosas::{add_glosa, list_glosas, remove_glosa};
pub use health::health_routes;
pub use records::{get_aih, post_movement, register_aih};
pub use reports::{get_dashboard, get_report};
pub use search::{get_export, post_search};
