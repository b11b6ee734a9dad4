//! # Club Roster Common Library
//!
//! Shared code for the roster service and its clients including:
//! - Student record model and grade enumeration
//! - Field validation for create/update requests
//! - Roster snapshot events pushed to subscribers
//! - Client-side roster view derivations
//! - Configuration loading and database initialization

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod sse;
pub mod time;
pub mod uuid_utils;
pub mod validation;
pub mod view;

pub use error::{Error, Result};
pub use models::{Grade, GradeCounts, StudentInput, StudentRecord};
pub use validation::{FieldError, ValidPatch, ValidStudent, ValidationErrors};
