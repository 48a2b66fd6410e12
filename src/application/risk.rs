//! Risk service: key-based access to the scoring engine.
//!
//! This service coordinates:
//! - Disease model lookup
//! - Scoring and attribution of single scenarios
//! - Side-by-side comparison of two scenarios with a timeline between them

use std::sync::Arc;

use serde::Serialize;

use crate::domain::scoring;
use crate::domain::{
    DiseaseModel, DiseaseRegistry, FeatureVector, ImportanceEntry, RiskLevel, RiskResult,
    TimelinePoint,
};
use crate::RiskscopeError;

/// Scored view of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub risk: RiskResult,
    pub level: RiskLevel,
    /// Attribution in canonical feature order
    pub importance: Vec<ImportanceEntry>,
}

/// Result of comparing scenario A against scenario B for one disease.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub disease: String,
    pub label: String,
    pub from: ScenarioReport,
    pub to: ScenarioReport,
    /// `to.risk.probability - from.risk.probability`
    pub risk_delta: f64,
    pub timeline: Vec<TimelinePoint>,
}

/// Service for scoring scenarios by disease key.
///
/// Stateless apart from the shared read-only registry, so it can be cloned
/// and used from several threads at once.
#[derive(Debug, Clone)]
pub struct RiskService {
    registry: Arc<DiseaseRegistry>,
}

impl Default for RiskService {
    fn default() -> Self {
        Self::new(Arc::new(DiseaseRegistry::builtin()))
    }
}

impl RiskService {
    /// Create a new risk service.
    pub fn new(registry: Arc<DiseaseRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &DiseaseRegistry {
        &self.registry
    }

    /// Look up a disease model.
    ///
    /// # Errors
    /// Returns `RiskError::UnknownDisease` for unregistered keys.
    pub fn model(&self, disease: &str) -> Result<&DiseaseModel, RiskscopeError> {
        Ok(self.registry.get_model(disease)?)
    }

    /// Score a scenario, keeping the raw linear score.
    ///
    /// # Errors
    /// Returns error for unknown diseases or invalid feature vectors.
    pub fn evaluate(
        &self,
        features: &FeatureVector,
        disease: &str,
    ) -> Result<RiskResult, RiskscopeError> {
        Ok(scoring::evaluate(features, self.model(disease)?)?)
    }

    /// Risk probability in `[0, 1]`.
    ///
    /// # Errors
    /// Returns error for unknown diseases or invalid feature vectors.
    pub fn score(&self, features: &FeatureVector, disease: &str) -> Result<f64, RiskscopeError> {
        Ok(scoring::score(features, self.model(disease)?)?)
    }

    /// Per-feature attribution in canonical order.
    ///
    /// # Errors
    /// Returns error for unknown diseases or invalid feature vectors.
    pub fn importance(
        &self,
        features: &FeatureVector,
        disease: &str,
    ) -> Result<Vec<ImportanceEntry>, RiskscopeError> {
        Ok(scoring::importance(features, self.model(disease)?)?)
    }

    /// Risk along a blend from `from` to `to`.
    ///
    /// # Errors
    /// Returns error for unknown diseases, invalid vectors or `steps < 2`.
    pub fn timeline(
        &self,
        from: &FeatureVector,
        to: &FeatureVector,
        disease: &str,
        steps: usize,
    ) -> Result<Vec<TimelinePoint>, RiskscopeError> {
        Ok(scoring::timeline(from, to, self.model(disease)?, steps)?)
    }

    fn report(
        features: &FeatureVector,
        model: &DiseaseModel,
    ) -> Result<ScenarioReport, RiskscopeError> {
        let risk = scoring::evaluate(features, model)?;
        Ok(ScenarioReport {
            level: risk.risk_level(),
            importance: scoring::importance(features, model)?,
            risk,
        })
    }

    /// Score both scenarios, attribute each, and build the timeline between them.
    ///
    /// # Errors
    /// Returns error for unknown diseases, invalid vectors or `steps < 2`.
    pub fn compare(
        &self,
        from: &FeatureVector,
        to: &FeatureVector,
        disease: &str,
        steps: usize,
    ) -> Result<ScenarioComparison, RiskscopeError> {
        let model = self.model(disease)?;
        tracing::debug!(disease, steps, "Comparing scenarios");

        let from_report = Self::report(from, model)?;
        let to_report = Self::report(to, model)?;
        let timeline = scoring::timeline(from, to, model, steps)?;
        let risk_delta = to_report.risk.probability - from_report.risk.probability;

        tracing::info!(
            "Compared scenarios for {}: {:.1}% -> {:.1}% ({:+.1} points)",
            model.key(),
            from_report.risk.probability * 100.0,
            to_report.risk.probability * 100.0,
            risk_delta * 100.0
        );

        Ok(ScenarioComparison {
            disease: model.key().to_string(),
            label: model.label().to_string(),
            from: from_report,
            to: to_report,
            risk_delta,
            timeline,
        })
    }
}
