//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (profile persistence).

mod profile_store;

pub use profile_store::ProfileStore;
