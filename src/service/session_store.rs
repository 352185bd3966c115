//! Process-local session persistence.
//!
//! The session lives under one fixed key of a small key-value store. The
//! stored value is a versioned envelope; the bare `{kind, data}` record and
//! the older `{type, data}` record written by earlier versions still load.
//! Storage calls run on the blocking pool so file I/O never stalls the
//! async workers.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::task;

use crate::domain::{Driver, Session, User};
use crate::error::AppError;

/// Key the session is stored under.
pub const SESSION_KEY: &str = "saa_session_v3";

const ENVELOPE_VERSION: u32 = 1;

/// Minimal string key-value storage.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Returns the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SessionStorage`] if the backing medium cannot
    /// be read.
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SessionStorage`] if the write fails.
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// Deletes `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SessionStorage`] if the write fails.
    fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Key-value store held in memory.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, AppError> {
        self.entries
            .lock()
            .map_err(|_| AppError::SessionStorage("store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Key-value store kept as one JSON object in a file.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// original.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Uses the file at `path`, creating it on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, AppError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(AppError::SessionStorage(e.to_string())),
        };
        // A damaged file reads as empty so the next write repairs it.
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), AppError> {
        let io = |e: std::io::Error| AppError::SessionStorage(e.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io)?;
        }
        let text = serde_json::to_string_pretty(map)
            .map_err(|e| AppError::SessionStorage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).map_err(io)?;
        fs::rename(&tmp, &self.path).map_err(io)
    }

    fn update(&self, edit: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), AppError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::SessionStorage("store lock poisoned".to_string()))?;
        let mut map = self.read_map()?;
        edit(&mut map);
        self.write_map(&map)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.update(|map| {
            map.remove(key);
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    session: Session,
}

/// Record layout of the first app release: `{"type": ..., "data": ...}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
enum TypedRecord {
    Client(User),
    Driver(Driver),
}

impl From<TypedRecord> for Session {
    fn from(record: TypedRecord) -> Self {
        match record {
            TypedRecord::Client(user) => Self::Client(user),
            TypedRecord::Driver(driver) => Self::Driver(driver),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Stored {
    Versioned(Envelope),
    Bare(Session),
    Typed(TypedRecord),
}

impl From<Stored> for Session {
    fn from(stored: Stored) -> Self {
        match stored {
            Stored::Versioned(envelope) => envelope.session,
            Stored::Bare(session) => session,
            Stored::Typed(record) => record.into(),
        }
    }
}

/// Holds at most one session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Uses `storage` as the backing medium.
    #[must_use]
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        Self {
            storage: Arc::from(storage),
        }
    }

    /// Session store kept in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryKeyValueStore::new()))
    }

    /// Returns the stored session. Absent, unreadable or corrupt data all
    /// read as `None`.
    pub async fn load(&self) -> Option<Session> {
        let raw = match self.blocking(|kv| kv.get(SESSION_KEY)).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session");
                return None;
            }
        };
        match serde_json::from_str::<Stored>(&raw) {
            Ok(stored) => Some(stored.into()),
            Err(e) => {
                tracing::warn!(error = %e, "discarding corrupt stored session");
                None
            }
        }
    }

    /// Replaces the stored session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SessionStorage`] if the value cannot be written.
    pub async fn save(&self, session: &Session) -> Result<(), AppError> {
        let envelope = Envelope {
            version: ENVELOPE_VERSION,
            session: session.clone(),
        };
        let text = serde_json::to_string(&envelope)
            .map_err(|e| AppError::SessionStorage(e.to_string()))?;
        self.blocking(move |kv| kv.set(SESSION_KEY, &text)).await
    }

    /// Removes the stored session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SessionStorage`] if the removal cannot be written.
    pub async fn clear(&self) -> Result<(), AppError> {
        self.blocking(|kv| kv.remove(SESSION_KEY)).await
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn KeyValueStore) -> Result<T, AppError> + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        task::spawn_blocking(move || op(storage.as_ref()))
            .await
            .map_err(|e| AppError::SessionStorage(e.to_string()))?
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;
    use tokio_test::assert_ok;

    use super::*;
    use crate::persistence::seed::initial_drivers;

    fn session() -> Session {
        Session::Client(User {
            name: "Ana".to_string(),
            phone: "35999990000".to_string(),
            address: "Rua Direita 5".to_string(),
        })
    }

    #[tokio::test]
    async fn empty_store_loads_none() {
        assert!(SessionStore::in_memory().load().await.is_none());
    }

    #[tokio::test]
    async fn save_then_load_then_clear() {
        let store = SessionStore::in_memory();
        assert_ok!(store.save(&session()).await);
        assert_eq!(store.load().await, Some(session()));
        assert_ok!(store.clear().await);
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn corrupt_value_loads_none() {
        let kv = MemoryKeyValueStore::new();
        assert_ok!(kv.set(SESSION_KEY, "{not json"));
        let store = SessionStore::new(Box::new(kv));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn bare_record_still_loads() {
        let kv = MemoryKeyValueStore::new();
        let bare = r#"{"kind":"client","data":{"name":"Ana","phone":"35999990000","address":""}}"#;
        assert_ok!(kv.set(SESSION_KEY, bare));
        let store = SessionStore::new(Box::new(kv));
        assert_eq!(
            store.load().await.map(|s| s.phone().to_string()),
            Some("35999990000".to_string())
        );
    }

    #[tokio::test]
    async fn typed_record_from_first_release_loads() {
        let Some(driver) = initial_drivers().into_iter().next() else {
            panic!("roster is empty");
        };
        let kv = MemoryKeyValueStore::new();
        let legacy = json!({ "type": "driver", "data": driver }).to_string();
        assert_ok!(kv.set(SESSION_KEY, &legacy));
        let store = SessionStore::new(Box::new(kv));
        assert_eq!(store.load().await, Some(Session::Driver(driver)));

        let kv = MemoryKeyValueStore::new();
        let legacy = json!({
            "type": "client",
            "data": { "name": "Ana", "phone": "35999990000", "address": "Rua Direita 5" }
        })
        .to_string();
        assert_ok!(kv.set(SESSION_KEY, &legacy));
        let store = SessionStore::new(Box::new(kv));
        assert_eq!(store.load().await, Some(session()));
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::new(Box::new(JsonFileStore::new(&path)));
        assert_ok!(store.save(&session()).await);

        let reopened = SessionStore::new(Box::new(JsonFileStore::new(&path)));
        assert_eq!(reopened.load().await, Some(session()));
        assert_ok!(reopened.clear().await);
        let cleared = SessionStore::new(Box::new(JsonFileStore::new(&path)));
        assert!(cleared.load().await.is_none());
    }

    #[tokio::test]
    async fn damaged_file_loads_none_and_is_repaired_on_save() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("session.json");
        assert_ok!(fs::write(&path, "\u{0}\u{1}garbage"));

        let store = SessionStore::new(Box::new(JsonFileStore::new(&path)));
        assert!(store.load().await.is_none());
        assert_ok!(store.save(&session()).await);
        assert_eq!(store.load().await, Some(session()));
    }
}
