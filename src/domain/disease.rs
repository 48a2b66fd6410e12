//! Disease model registry.
//!
//! Each disease is a uniform `(bias, weights)` record over the canonical
//! derived features, so the scorer and the decomposer are written once and
//! parameterized by the model instead of branching per disease.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::features::{feature_index, DERIVED_FEATURES, FEATURE_COUNT};
use super::RiskError;

/// Keys of the models that ship with every registry.
pub const BUILTIN_DISEASES: [&str; 3] = ["heart", "diabetes", "stroke"];

/// One disease's linear scoring function.
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseModel {
    key: String,
    label: String,
    bias: f64,
    /// Coefficients in canonical derived-feature order.
    weights: [f64; FEATURE_COUNT],
}

impl DiseaseModel {
    fn builtin(key: &str, label: &str, bias: f64, weights: [f64; FEATURE_COUNT]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            bias,
            weights,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Coefficients in canonical order (see [`DERIVED_FEATURES`]).
    #[must_use]
    pub fn weights(&self) -> &[f64; FEATURE_COUNT] {
        &self.weights
    }

    /// Coefficient for a derived feature by name.
    #[must_use]
    pub fn weight(&self, feature: &str) -> Option<f64> {
        feature_index(feature).map(|i| self.weights[i])
    }

    /// `(feature name, coefficient)` pairs in canonical order.
    pub fn named_weights(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        DERIVED_FEATURES
            .iter()
            .zip(self.weights.iter())
            .map(|(f, w)| (f.name, *w))
    }
}

/// On-disk model definition.
///
/// `weights` is a name → coefficient mapping that must cover the canonical
/// derived features exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub key: String,
    pub label: String,
    pub bias: f64,
    pub weights: BTreeMap<String, f64>,
}

impl TryFrom<ModelDefinition> for DiseaseModel {
    type Error = RiskError;

    fn try_from(def: ModelDefinition) -> Result<Self, Self::Error> {
        let key = def.key.trim().to_string();
        if key.is_empty() {
            return Err(RiskError::InvalidModel("model key must not be empty".into()));
        }
        if def.label.trim().is_empty() {
            return Err(RiskError::InvalidModel(format!(
                "model {key}: label must not be empty"
            )));
        }
        if !def.bias.is_finite() {
            return Err(RiskError::InvalidModel(format!(
                "model {key}: bias must be finite"
            )));
        }

        if let Some(unknown) = def
            .weights
            .keys()
            .find(|name| !DERIVED_FEATURES.iter().any(|f| f.name == name.as_str()))
        {
            return Err(RiskError::InvalidModel(format!(
                "model {key}: unknown feature weight {unknown:?}"
            )));
        }

        let mut weights = [0.0; FEATURE_COUNT];
        for (slot, feature) in weights.iter_mut().zip(DERIVED_FEATURES.iter()) {
            let w = def.weights.get(feature.name).copied().ok_or_else(|| {
                RiskError::InvalidModel(format!(
                    "model {key}: missing weight for {}",
                    feature.name
                ))
            })?;
            if !w.is_finite() {
                return Err(RiskError::InvalidModel(format!(
                    "model {key}: weight for {} must be finite",
                    feature.name
                )));
            }
            *slot = w;
        }

        Ok(Self {
            key,
            label: def.label,
            bias: def.bias,
            weights,
        })
    }
}

impl From<&DiseaseModel> for ModelDefinition {
    fn from(model: &DiseaseModel) -> Self {
        Self {
            key: model.key.clone(),
            label: model.label.clone(),
            bias: model.bias,
            weights: model
                .named_weights()
                .map(|(name, w)| (name.to_string(), w))
                .collect(),
        }
    }
}

/// Read-only lookup from disease key to model.
///
/// Models can only be added while building the registry; a constructed
/// registry exposes no mutation.
#[derive(Debug, Clone)]
pub struct DiseaseRegistry {
    models: BTreeMap<String, DiseaseModel>,
}

impl Default for DiseaseRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DiseaseRegistry {
    /// Registry with the built-in heart, diabetes and stroke models.
    #[must_use]
    pub fn builtin() -> Self {
        // Order: age, sexIsMale, bmi, systolic, diastolic, cholesterol,
        //        glucose, smoker, exercise, sleep, familyHx, stress
        let models = [
            DiseaseModel::builtin(
                "heart",
                "Heart disease",
                -4.7,
                [
                    0.025, 0.12, 0.06, 0.018, 0.01, 0.025, 0.02, 0.7, -0.05, -0.02, 0.5, 0.06,
                ],
            ),
            DiseaseModel::builtin(
                "diabetes",
                "Type 2 diabetes",
                -9.5,
                [
                    0.03, 0.1, 0.09, 0.008, 0.005, 0.004, 0.045, 0.3, -0.08, -0.05, 0.8, 0.04,
                ],
            ),
            DiseaseModel::builtin(
                "stroke",
                "Stroke",
                -8.2,
                [
                    0.045, 0.08, 0.03, 0.03, 0.015, 0.006, 0.008, 0.6, -0.04, -0.03, 0.4, 0.05,
                ],
            ),
        ];

        Self {
            models: models
                .into_iter()
                .map(|m| (m.key.clone(), m))
                .collect(),
        }
    }

    /// Built-in registry extended with the models in a JSON file.
    ///
    /// The file holds an array of [`ModelDefinition`] records.
    ///
    /// # Errors
    /// Returns `RiskError::InvalidModel` if the file cannot be read or parsed,
    /// a model fails validation, or a key collides with an existing model.
    pub fn with_models_from_file(path: &Path) -> Result<Self, RiskError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RiskError::InvalidModel(format!("failed to read {}: {e}", path.display()))
        })?;
        let definitions: Vec<ModelDefinition> = serde_json::from_str(&content).map_err(|e| {
            RiskError::InvalidModel(format!("failed to parse {}: {e}", path.display()))
        })?;

        Self::builtin().extend(definitions)
    }

    /// Add validated models, consuming the registry.
    ///
    /// # Errors
    /// Returns `RiskError::InvalidModel` on the first invalid or duplicate model.
    pub fn extend(
        mut self,
        definitions: impl IntoIterator<Item = ModelDefinition>,
    ) -> Result<Self, RiskError> {
        for def in definitions {
            let model = DiseaseModel::try_from(def)?;
            if self.models.contains_key(&model.key) {
                return Err(RiskError::InvalidModel(format!(
                    "duplicate disease key {:?}",
                    model.key
                )));
            }
            self.models.insert(model.key.clone(), model);
        }
        Ok(self)
    }

    /// Look up a model by disease key.
    ///
    /// # Errors
    /// Returns `RiskError::UnknownDisease` if the key is not registered.
    pub fn get_model(&self, key: &str) -> Result<&DiseaseModel, RiskError> {
        self.models
            .get(key)
            .ok_or_else(|| RiskError::UnknownDisease(key.to_string()))
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn models(&self) -> impl Iterator<Item = &DiseaseModel> {
        self.models.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn complete_definition(key: &str) -> ModelDefinition {
        ModelDefinition {
            key: key.to_string(),
            label: "Test condition".to_string(),
            bias: -1.0,
            weights: DERIVED_FEATURES
                .iter()
                .map(|f| (f.name.to_string(), 0.01))
                .collect(),
        }
    }

    #[test]
    fn test_builtin_models() {
        let registry = DiseaseRegistry::builtin();
        for key in BUILTIN_DISEASES {
            let model = registry.get_model(key).expect("Builtin model should exist");
            assert_eq!(model.key(), key);
            assert!(!model.label().is_empty());
        }
        assert_eq!(registry.len(), BUILTIN_DISEASES.len());
    }

    #[test]
    fn test_unknown_disease() {
        let registry = DiseaseRegistry::builtin();
        for key in ["cancer", "", "Heart", " heart"] {
            assert_eq!(
                registry.get_model(key),
                Err(RiskError::UnknownDisease(key.to_string()))
            );
        }
    }

    #[test]
    fn test_heart_coefficients() {
        let registry = DiseaseRegistry::builtin();
        let heart = registry.get_model("heart").expect("heart");

        assert_eq!(heart.bias(), -4.7);
        assert_eq!(heart.weight("age"), Some(0.025));
        assert_eq!(heart.weight("sexIsMale"), Some(0.12));
        assert_eq!(heart.weight("exercise"), Some(-0.05));
        assert_eq!(heart.weight("stress"), Some(0.06));
        assert_eq!(heart.weight("shoeSize"), None);
    }

    #[test]
    fn test_uniform_weight_keys() {
        let registry = DiseaseRegistry::builtin();
        let expected: Vec<_> = DERIVED_FEATURES.iter().map(|f| f.name).collect();

        for model in registry.models() {
            let names: Vec<_> = model.named_weights().map(|(n, _)| n).collect();
            assert_eq!(names, expected, "model {}", model.key());
        }
    }

    #[test]
    fn test_definition_roundtrip() {
        let registry = DiseaseRegistry::builtin();
        let heart = registry.get_model("heart").expect("heart");

        let def = ModelDefinition::from(heart);
        assert_eq!(def.weights.len(), FEATURE_COUNT);
        let back = DiseaseModel::try_from(def).expect("Should convert back");
        assert_eq!(&back, heart);
    }

    #[test]
    fn test_extend_rejects_incomplete_weights() {
        let mut def = complete_definition("kidney");
        def.weights.remove("sleep");

        let err = DiseaseRegistry::builtin()
            .extend([def])
            .expect_err("Should reject missing weight");
        assert!(err.to_string().contains("sleep"));
    }

    #[test]
    fn test_extend_rejects_unknown_weights() {
        let mut def = complete_definition("kidney");
        def.weights.insert("shoeSize".to_string(), 1.0);

        assert!(matches!(
            DiseaseRegistry::builtin().extend([def]),
            Err(RiskError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_extend_rejects_duplicates_and_non_finite() {
        assert!(DiseaseRegistry::builtin()
            .extend([complete_definition("heart")])
            .is_err());

        let mut def = complete_definition("kidney");
        def.bias = f64::INFINITY;
        assert!(DiseaseRegistry::builtin().extend([def]).is_err());
    }

    #[test]
    fn test_models_from_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("models.json");
        let json = serde_json::to_string(&vec![complete_definition("kidney")])
            .expect("serialize models");
        std::fs::write(&path, json).expect("write models");

        let registry = DiseaseRegistry::with_models_from_file(&path).expect("Should load");
        assert_eq!(registry.len(), BUILTIN_DISEASES.len() + 1);
        assert_eq!(
            registry.get_model("kidney").expect("kidney").weight("age"),
            Some(0.01)
        );
        assert_eq!(
            registry.keys().collect::<Vec<_>>(),
            vec!["diabetes", "heart", "kidney", "stroke"]
        );
    }

    #[test]
    fn test_models_from_missing_file() {
        let dir = tempdir().expect("tempdir");
        assert!(matches!(
            DiseaseRegistry::with_models_from_file(&dir.path().join("absent.json")),
            Err(RiskError::InvalidModel(_))
        ));
    }
}
