//! HTTP API handlers for roster-api

pub mod admin;
pub mod buildinfo;
pub mod health;
pub mod sse;
pub mod students;

pub use admin::admin_login;
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use sse::event_stream;
pub use students::{create_student, delete_student, grade_counts, list_students, update_student};
