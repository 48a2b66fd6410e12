//! In-memory adapter: Implementation of ProfileStore.
//!
//! Keeps profiles in a process-local map. Useful for tests and for embedding
//! the engine where nothing needs to outlive the process.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::domain::FeatureVector;
use crate::ports::ProfileStore;

use super::StorageError;

/// Process-local profile store.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<BTreeMap<String, FeatureVector>>,
}

impl InMemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    type Error = StorageError;

    fn save(&self, name: &str, features: &FeatureVector) -> Result<(), Self::Error> {
        let mut profiles = self.profiles.write().map_err(|_| StorageError::Lock)?;
        profiles.insert(name.to_string(), *features);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<FeatureVector>, Self::Error> {
        let profiles = self.profiles.read().map_err(|_| StorageError::Lock)?;
        Ok(profiles.get(name).copied())
    }

    fn list_names(&self) -> Result<Vec<String>, Self::Error> {
        let profiles = self.profiles.read().map_err(|_| StorageError::Lock)?;
        Ok(profiles.keys().cloned().collect())
    }

    fn delete(&self, name: &str) -> Result<bool, Self::Error> {
        let mut profiles = self.profiles.write().map_err(|_| StorageError::Lock)?;
        Ok(profiles.remove(name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Preset;

    #[test]
    fn test_profile_roundtrip() {
        let store = InMemoryProfileStore::new();
        assert!(store.load("a").expect("Should load").is_none());

        let features = Preset::Sedentary.features();
        store.save("a", &features).expect("Should save");
        assert_eq!(store.load("a").expect("Should load"), Some(features));

        store.save("a", &Preset::Active.features()).expect("Should overwrite");
        assert_eq!(
            store.load("a").expect("Should load"),
            Some(Preset::Active.features())
        );
    }

    #[test]
    fn test_list_and_delete() {
        let store = InMemoryProfileStore::new();
        store.save("z", &FeatureVector::default()).expect("Should save");
        store.save("m", &FeatureVector::default()).expect("Should save");

        assert_eq!(store.list_names().expect("Should list"), vec!["m", "z"]);
        assert!(store.delete("z").expect("Should delete"));
        assert_eq!(store.list_names().expect("Should list"), vec!["m"]);
    }
}
