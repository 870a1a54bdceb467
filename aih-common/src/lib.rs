//! # AIH Common Library
//!
//! Shared code for the AIH review tracker:
//! - Database schema, initialization and row models
//! - Domain enums (status, movement kind, specialty) and money
//! - Input validation
//! - Configuration loading
//! - Time-expiring cache and password hashing utilities

pub mod cache;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod money;
pub mod password;
pub mod time;
pub mod validation;

pub use domain::{AihStatus, MovementKind, Specialty};
pub use error::{Error, Result};
pub use money::Money;
