//! Adapters layer: Concrete implementations of ports.
//!
//! - `sqlite`: SQLite-backed profile persistence
//! - `memory`: process-local profile store

pub mod memory;
pub mod sqlite;

// Re-export storage error for lib.rs
pub use sqlite::StorageError;
