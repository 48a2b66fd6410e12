//! Profile store port: Trait for named persistence of feature vectors.
//!
//! This trait abstracts the storage backend (SQLite, memory) from the
//! application logic. The core treats it as an opaque key-value capability.

use crate::domain::FeatureVector;

/// Trait for named profile storage.
///
/// Saving under an existing name overwrites the previous record. Records are
/// only removed by an explicit [`ProfileStore::delete`].
pub trait ProfileStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a feature vector under `name`, replacing any existing record.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn save(&self, name: &str, features: &FeatureVector) -> Result<(), Self::Error>;

    /// Load the feature vector saved under `name`.
    ///
    /// # Returns
    /// `None` if no profile exists under `name`.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load(&self, name: &str) -> Result<Option<FeatureVector>, Self::Error>;

    /// Names of all stored profiles, sorted.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn list_names(&self) -> Result<Vec<String>, Self::Error>;

    /// Delete the profile saved under `name`.
    ///
    /// # Returns
    /// `true` if a profile was removed.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn delete(&self, name: &str) -> Result<bool, Self::Error>;
}
