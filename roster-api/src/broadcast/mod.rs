//! Roster broadcast to connected subscribers

pub mod coordinator;

pub use coordinator::BroadcastCoordinator;
