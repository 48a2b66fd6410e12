//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod profiles;
mod risk;

pub use profiles::{ProfileService, ScenarioSource};
pub use risk::{RiskService, ScenarioComparison, ScenarioReport};
