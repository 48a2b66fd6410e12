//! Runtime configuration.
//!
//! Settings come from environment variables with best-effort parsing:
//! invalid values are logged and replaced by the default.
//!
//! Supported:
//! - RISKSCOPE_DB_PATH (profile database, default `riskscope.db`)
//! - RISKSCOPE_MODELS_PATH (optional JSON file with extra disease models)
//! - RISKSCOPE_TIMELINE_STEPS (default 10, at least 2)
//! - RISKSCOPE_LOG_MODE (`stderr` or `file`)
//! - RISKSCOPE_LOG_FILE (default `riskscope.log`)

use std::path::PathBuf;

use crate::domain::scoring::MIN_TIMELINE_STEPS;
use crate::domain::{DiseaseRegistry, RiskError};

pub const DB_PATH_ENV: &str = "RISKSCOPE_DB_PATH";
pub const MODELS_PATH_ENV: &str = "RISKSCOPE_MODELS_PATH";
pub const TIMELINE_STEPS_ENV: &str = "RISKSCOPE_TIMELINE_STEPS";
pub const LOG_MODE_ENV: &str = "RISKSCOPE_LOG_MODE";
pub const LOG_FILE_ENV: &str = "RISKSCOPE_LOG_FILE";

/// Where log output goes. Stdout is reserved for command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Stderr,
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,

    /// Extra disease models merged into the built-in registry
    pub models_path: Option<PathBuf>,

    /// Default number of timeline points for `compare`
    pub timeline_steps: usize,

    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("riskscope.db"),
            models_path: None,
            timeline_steps: 10,
            log_mode: LogMode::Stderr,
            log_file: PathBuf::from("riskscope.log"),
        }
    }
}

impl AppConfig {
    /// Load config overrides from the process environment.
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config overrides through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = var(DB_PATH_ENV) {
            cfg.db_path = PathBuf::from(v);
        }

        if let Some(v) = var(MODELS_PATH_ENV) {
            cfg.models_path = Some(PathBuf::from(v));
        }

        if let Some(v) = var(TIMELINE_STEPS_ENV) {
            match v.parse::<usize>() {
                Ok(n) if n >= MIN_TIMELINE_STEPS => cfg.timeline_steps = n,
                _ => tracing::warn!(
                    "Ignoring {TIMELINE_STEPS_ENV}={v:?}: need an integer >= {MIN_TIMELINE_STEPS}"
                ),
            }
        }

        if let Some(v) = var(LOG_MODE_ENV) {
            match v.to_ascii_lowercase().as_str() {
                "stderr" => cfg.log_mode = LogMode::Stderr,
                "file" => cfg.log_mode = LogMode::File,
                _ => tracing::warn!("Ignoring {LOG_MODE_ENV}={v:?}: expected stderr or file"),
            }
        }

        if let Some(v) = var(LOG_FILE_ENV) {
            cfg.log_file = PathBuf::from(v);
        }

        cfg
    }

    /// Build the disease registry, merging extra models when configured.
    ///
    /// # Errors
    /// Returns `RiskError::InvalidModel` if the models file is unusable.
    pub fn load_registry(&self) -> Result<DiseaseRegistry, RiskError> {
        match &self.models_path {
            Some(path) => {
                let registry = DiseaseRegistry::with_models_from_file(path)?;
                tracing::info!(
                    "Loaded {} disease models (extra models from {:?})",
                    registry.len(),
                    path
                );
                Ok(registry)
            }
            None => Ok(DiseaseRegistry::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::from_lookup(|_| None);
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.timeline_steps, 10);
        assert_eq!(cfg.log_mode, LogMode::Stderr);
    }

    #[test]
    fn test_overrides() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (DB_PATH_ENV, "/tmp/profiles.db"),
            (MODELS_PATH_ENV, "models.json"),
            (TIMELINE_STEPS_ENV, "25"),
            (LOG_MODE_ENV, "FILE"),
            (LOG_FILE_ENV, "/tmp/riskscope.log"),
        ]));

        assert_eq!(cfg.db_path, PathBuf::from("/tmp/profiles.db"));
        assert_eq!(cfg.models_path, Some(PathBuf::from("models.json")));
        assert_eq!(cfg.timeline_steps, 25);
        assert_eq!(cfg.log_mode, LogMode::File);
        assert_eq!(cfg.log_file, PathBuf::from("/tmp/riskscope.log"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (TIMELINE_STEPS_ENV, "1"),
            (LOG_MODE_ENV, "syslog"),
            (DB_PATH_ENV, "   "),
        ]));
        assert_eq!(cfg, AppConfig::default());

        let cfg = AppConfig::from_lookup(lookup(&[(TIMELINE_STEPS_ENV, "many")]));
        assert_eq!(cfg.timeline_steps, 10);
    }

    #[test]
    fn test_load_registry() {
        let registry = AppConfig::default()
            .load_registry()
            .expect("Builtin registry should load");
        assert_eq!(registry.len(), 3);

        let cfg = AppConfig {
            models_path: Some(PathBuf::from("/nonexistent/models.json")),
            ..AppConfig::default()
        };
        assert!(cfg.load_registry().is_err());
    }
}
