//! Service layer between HTTP handlers and the record store

pub mod mutation;

pub use mutation::MutationService;
