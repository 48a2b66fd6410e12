//! SQLite adapter: Implementation of ProfileStore.
//!
//! Provides local persistence for named profiles. Each profile row holds the
//! flat JSON record of a [`FeatureVector`], so the on-disk format keeps the
//! twelve interoperable field names.
//!
//! # Mutex Behavior
//!
//! The connection is protected by a `Mutex`. A poisoned mutex (from a panic
//! in another thread) fails closed with `StorageError::Lock`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::FeatureVector;
use crate::ports::ProfileStore;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Lock,
}

/// SQLite profile store.
pub struct SqliteProfileStore {
    conn: Mutex<Connection>,
}

impl SqliteProfileStore {
    /// Open (or create) a profile database at the given path.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Lock)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS profiles (
                name TEXT PRIMARY KEY,
                features TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    /// When the profile was last saved, if it exists.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    pub fn updated_at(
        &self,
        name: &str,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>, StorageError> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM profiles WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.and_then(|s| {
            chrono::DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .ok()
        }))
    }
}

impl ProfileStore for SqliteProfileStore {
    type Error = StorageError;

    fn save(&self, name: &str, features: &FeatureVector) -> Result<(), Self::Error> {
        let payload = serde_json::to_string(features)?;
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.lock()?;

        conn.execute(
            r"
            INSERT INTO profiles (name, features, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET
                features = excluded.features,
                updated_at = excluded.updated_at
            ",
            params![name, payload, now],
        )?;

        tracing::debug!(profile = name, "Saved profile to storage");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<FeatureVector>, Self::Error> {
        let conn = self.lock()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT features FROM profiles WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn list_names(&self) -> Result<Vec<String>, Self::Error> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM profiles ORDER BY name")?;

        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<bool, Self::Error> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM profiles WHERE name = ?1", params![name])?;
        if removed > 0 {
            tracing::info!(profile = name, "Deleted profile from storage");
        }
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Preset, Sex};
    use tempfile::tempdir;

    #[test]
    fn test_profile_roundtrip() {
        let store = SqliteProfileStore::in_memory().expect("Should create db");

        assert!(store.load("baseline").expect("Should load").is_none());

        let features = Preset::HighRisk.features();
        store.save("baseline", &features).expect("Should save");

        let loaded = store
            .load("baseline")
            .expect("Should load")
            .expect("Should exist");
        assert_eq!(loaded, features);
        assert!(store.updated_at("baseline").expect("Should query").is_some());
    }

    #[test]
    fn test_resave_overwrites() {
        let store = SqliteProfileStore::in_memory().expect("Should create db");

        store
            .save("me", &FeatureVector::default())
            .expect("Should save");
        let changed = FeatureVector {
            sex: Sex::Female,
            stress: 9,
            ..FeatureVector::default()
        };
        store.save("me", &changed).expect("Should overwrite");

        assert_eq!(store.load("me").expect("Should load"), Some(changed));
        assert_eq!(store.list_names().expect("Should list"), vec!["me".to_string()]);
    }

    #[test]
    fn test_list_and_delete() {
        let store = SqliteProfileStore::in_memory().expect("Should create db");
        store.save("b", &FeatureVector::default()).expect("Should save");
        store.save("a", &FeatureVector::default()).expect("Should save");

        assert_eq!(store.list_names().expect("Should list"), vec!["a", "b"]);

        assert!(store.delete("a").expect("Should delete"));
        assert!(!store.delete("a").expect("Should delete"));
        assert_eq!(store.list_names().expect("Should list"), vec!["b"]);
    }

    #[test]
    fn test_persists_across_connections() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("profiles.db");
        let features = Preset::Active.features();

        {
            let store = SqliteProfileStore::new(&path).expect("Should open db");
            store.save("runner", &features).expect("Should save");
        }

        let store = SqliteProfileStore::new(&path).expect("Should reopen db");
        assert_eq!(store.load("runner").expect("Should load"), Some(features));
    }

    #[test]
    fn test_stored_payload_uses_interop_field_names() {
        let store = SqliteProfileStore::in_memory().expect("Should create db");
        store.save("x", &FeatureVector::default()).expect("Should save");

        let conn = store.lock().expect("Should lock");
        let json: String = conn
            .query_row("SELECT features FROM profiles WHERE name = 'x'", [], |row| {
                row.get(0)
            })
            .expect("Should query");
        let value: serde_json::Value = serde_json::from_str(&json).expect("Should parse");
        assert_eq!(value["familyHx"], false);
        assert_eq!(value["sex"], "male");
    }
}
