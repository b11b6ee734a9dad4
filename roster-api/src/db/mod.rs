//! Database access for roster-api

pub mod students;
