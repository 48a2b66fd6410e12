//! Profile service: Named save/load of scenarios.
//!
//! Wraps a [`ProfileStore`] with name validation, feature validation and the
//! "no such profile" error, and resolves scenario references (default,
//! preset or saved profile) into feature vectors.

use std::sync::Arc;

use crate::domain::{FeatureVector, Preset, RiskError};
use crate::ports::ProfileStore;
use crate::RiskscopeError;

/// Where a scenario's starting feature vector comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioSource {
    Default,
    Preset(Preset),
    Profile(String),
}

impl std::str::FromStr for ScenarioSource {
    type Err = RiskError;

    /// Accepts `default`, `preset:NAME` or `profile:NAME`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "default" {
            return Ok(Self::Default);
        }
        match s.split_once(':') {
            Some(("preset", name)) => Ok(Self::Preset(name.parse()?)),
            Some(("profile", name)) if !name.trim().is_empty() => {
                Ok(Self::Profile(name.trim().to_string()))
            }
            _ => Err(RiskError::InvalidArgument(format!(
                "scenario must be default, preset:NAME or profile:NAME, got {s:?}"
            ))),
        }
    }
}

/// Service for named profiles.
pub struct ProfileService<S>
where
    S: ProfileStore,
{
    store: Arc<S>,
}

impl<S> ProfileService<S>
where
    S: ProfileStore,
    S::Error: Into<crate::adapters::StorageError>,
{
    /// Create a new profile service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn check_name(name: &str) -> Result<&str, RiskscopeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RiskError::InvalidArgument("profile name must not be empty".into()).into());
        }
        Ok(name)
    }

    /// Save `features` under `name`, overwriting any existing profile.
    ///
    /// # Errors
    /// Returns error for empty names, invalid vectors, or storage failures.
    pub fn save(&self, name: &str, features: &FeatureVector) -> Result<(), RiskscopeError> {
        let name = Self::check_name(name)?;
        features.validate()?;

        self.store
            .save(name, features)
            .map_err(|e| RiskscopeError::Storage(e.into()))?;

        tracing::info!(profile = name, "Saved profile");
        Ok(())
    }

    /// Load the profile saved under `name`.
    ///
    /// Stored records may have been written by other tools, so the loaded
    /// vector is validated before it is handed out.
    ///
    /// # Errors
    /// Returns `RiskscopeError::NotFound` if no such profile exists, or
    /// `RiskError::InvalidArgument` if the stored record is out of range.
    pub fn load(&self, name: &str) -> Result<FeatureVector, RiskscopeError> {
        let name = Self::check_name(name)?;
        let features = self
            .store
            .load(name)
            .map_err(|e| RiskscopeError::Storage(e.into()))?
            .ok_or_else(|| RiskscopeError::NotFound(name.to_string()))?;

        if let Err(e) = features.validate() {
            tracing::warn!(profile = name, "Stored profile is invalid: {e}");
            return Err(e.into());
        }
        Ok(features)
    }

    /// Names of all saved profiles.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    pub fn list(&self) -> Result<Vec<String>, RiskscopeError> {
        self.store
            .list_names()
            .map_err(|e| RiskscopeError::Storage(e.into()))
    }

    /// Delete the profile saved under `name`.
    ///
    /// # Errors
    /// Returns `RiskscopeError::NotFound` if no such profile exists.
    pub fn delete(&self, name: &str) -> Result<(), RiskscopeError> {
        let name = Self::check_name(name)?;
        let removed = self
            .store
            .delete(name)
            .map_err(|e| RiskscopeError::Storage(e.into()))?;

        if !removed {
            return Err(RiskscopeError::NotFound(name.to_string()));
        }
        tracing::info!(profile = name, "Deleted profile");
        Ok(())
    }

    /// Resolve a scenario reference into a feature vector.
    ///
    /// # Errors
    /// Returns `RiskscopeError::NotFound` for missing profiles.
    pub fn resolve(&self, source: &ScenarioSource) -> Result<FeatureVector, RiskscopeError> {
        match source {
            ScenarioSource::Default => Ok(FeatureVector::default()),
            ScenarioSource::Preset(preset) => Ok(preset.features()),
            ScenarioSource::Profile(name) => self.load(name),
        }
    }
}
