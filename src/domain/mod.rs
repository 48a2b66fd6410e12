//! Domain layer: Core risk types and the pure scoring engine.
//!
//! This module contains pure Rust types with no I/O.
//! All record types are serializable and validate their own invariants.

mod disease;
mod error;
mod features;
mod risk;
pub mod scoring;

pub use disease::{DiseaseModel, DiseaseRegistry, ModelDefinition, BUILTIN_DISEASES};
pub use error::RiskError;
pub use features::{
    feature_index, DerivedFeature, DerivedVector, FeatureVector, Preset, Sex, DERIVED_FEATURES,
    FEATURE_COUNT, FIELD_NAMES,
};
pub use risk::{ImportanceEntry, RiskLevel, RiskResult, TimelinePoint};
