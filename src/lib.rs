//! # Riskscope
//!
//! Illustrative disease-risk explorer.
//!
//! This crate provides:
//! - A fixed-weight logistic risk scorer per disease
//! - Local linear feature attribution
//! - Scenario timelines blending one feature vector into another
//! - Named profile persistence behind a port
//!
//! The models are illustrative, not trained or calibrated; scores are not
//! medical advice.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types and the pure scoring engine
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (SQLite, in-memory)
//! - `application`: Use cases orchestrating domain and ports
//! - `cli`: Command parsing and JSON output for the binary
//! - `config`: Environment-driven settings for the binary

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{
    DiseaseModel, DiseaseRegistry, FeatureVector, ImportanceEntry, RiskError, RiskLevel,
    RiskResult, Sex, TimelinePoint,
};

/// Result type for Riskscope operations
pub type Result<T> = std::result::Result<T, RiskscopeError>;

/// Main error type for Riskscope
#[derive(Debug, thiserror::Error)]
pub enum RiskscopeError {
    #[error(transparent)]
    Risk(#[from] domain::RiskError),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("No such profile: {0}")]
    NotFound(String),
}
