//! Persistent preference store.
//!
//! Every record lives under `prefix + key` as a JSON envelope
//! `{"version": N, "data": ...}`. Components never touch `localStorage`
//! directly; they go through [`Records`], which is cheap to clone and can be
//! backed by the browser or by memory.
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;

pub const SCHEMA_VERSION: u32 = 1;

/// Key suffixes, appended to the configured prefix.
pub mod keys {
    pub const VISITOR: &str = "visitorData";
    pub const TOOL_CLICKS: &str = "toolClicks";
    pub const THEME: &str = "theme";
    pub const TRIED_THEMES: &str = "triedThemes";
    pub const SUBMISSIONS: &str = "submissions";
    pub const VISITED_BEFORE: &str = "visitedBefore";
    pub const GOD_MODE: &str = "godMode";
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Unavailable,
    Backend(String),
    Decode { key: String, reason: String },
    Encode { key: String, reason: String },
    SchemaMismatch { key: String, found: u32, expected: u32 },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "local storage is unavailable"),
            StoreError::Backend(msg) => write!(f, "storage backend error: {msg}"),
            StoreError::Decode { key, reason } => write!(f, "cannot decode '{key}': {reason}"),
            StoreError::Encode { key, reason } => write!(f, "cannot encode '{key}': {reason}"),
            StoreError::SchemaMismatch {
                key,
                found,
                expected,
            } => write!(
                f,
                "record '{key}' has schema version {found}, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for JsValue {
    fn from(err: StoreError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Raw string key-value backend.
pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// `window.localStorage`.
pub struct BrowserStore {
    storage: web_sys::Storage,
}

impl BrowserStore {
    pub fn open() -> Result<Self, StoreError> {
        let storage = web_sys::window()
            .ok_or(StoreError::Unavailable)?
            .local_storage()
            .map_err(|e| StoreError::Backend(format!("{e:?}")))?
            .ok_or(StoreError::Unavailable)?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))
    }
}

/// In-memory backend. Used by tests and when local storage is blocked.
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(serde::Deserialize)]
struct EnvelopeIn {
    version: u32,
    data: serde_json::Value,
}

/// Typed, versioned access to a [`KeyValueStore`] under a key prefix.
#[derive(Clone)]
pub struct Records {
    store: Rc<dyn KeyValueStore>,
    prefix: String,
}

impl Records {
    pub fn new(store: Rc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Browser storage when available, memory otherwise.
    pub fn browser_or_memory(prefix: &str) -> Self {
        match BrowserStore::open() {
            Ok(store) => Self::new(Rc::new(store), prefix),
            Err(err) => {
                log::warn!("{err}; preferences will not survive a reload");
                Self::new(Rc::new(MemoryStore::new()), prefix)
            }
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let full = self.full_key(key);
        let Some(raw) = self.store.get_raw(&full)? else {
            return Ok(None);
        };
        let envelope: EnvelopeIn = serde_json::from_str(&raw).map_err(|e| StoreError::Decode {
            key: full.clone(),
            reason: e.to_string(),
        })?;
        if envelope.version != SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                key: full,
                found: envelope.version,
                expected: SCHEMA_VERSION,
            });
        }
        serde_json::from_value(envelope.data)
            .map(Some)
            .map_err(|e| StoreError::Decode {
                key: full,
                reason: e.to_string(),
            })
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let full = self.full_key(key);
        let json = serde_json::to_string(&EnvelopeOut {
            version: SCHEMA_VERSION,
            data: value,
        })
        .map_err(|e| StoreError::Encode {
            key: full.clone(),
            reason: e.to_string(),
        })?;
        self.store.set_raw(&full, &json)
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.store.remove(&self.full_key(key))
    }

    /// Load a record, treating any failure as "absent".
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get(key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("{err}; starting from a fresh record");
                None
            }
        }
    }

    /// Save a record, logging instead of failing.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(err) = self.set(key, value) {
            log::warn!("{err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> (Rc<MemoryStore>, Records) {
        let mem = Rc::new(MemoryStore::new());
        let recs = Records::new(mem.clone(), "test_");
        (mem, recs)
    }

    #[test]
    fn stores_values_in_a_versioned_envelope_under_the_prefix() {
        let (mem, recs) = records();
        recs.set(keys::THEME, &3usize).unwrap();
        let raw = mem.get_raw("test_theme").unwrap().unwrap();
        assert_eq!(raw, r#"{"version":1,"data":3}"#);
        assert_eq!(recs.get::<usize>(keys::THEME).unwrap(), Some(3));
    }

    #[test]
    fn missing_key_is_none() {
        let (_, recs) = records();
        assert_eq!(recs.get::<bool>(keys::GOD_MODE).unwrap(), None);
    }

    #[test]
    fn unversioned_legacy_value_is_a_decode_error_and_loads_as_absent() {
        let (mem, recs) = records();
        mem.set_raw("test_theme", "2").unwrap();
        assert!(matches!(
            recs.get::<usize>(keys::THEME),
            Err(StoreError::Decode { .. })
        ));
        assert_eq!(recs.load::<usize>(keys::THEME), None);
    }

    #[test]
    fn future_schema_version_is_reported() {
        let (mem, recs) = records();
        mem.set_raw("test_theme", r#"{"version":7,"data":1}"#).unwrap();
        assert_eq!(
            recs.get::<usize>(keys::THEME),
            Err(StoreError::SchemaMismatch {
                key: "test_theme".into(),
                found: 7,
                expected: SCHEMA_VERSION,
            })
        );
    }

    #[test]
    fn remove_clears_the_record() {
        let (_, recs) = records();
        recs.save(keys::VISITED_BEFORE, &true);
        recs.remove(keys::VISITED_BEFORE).unwrap();
        assert_eq!(recs.load::<bool>(keys::VISITED_BEFORE), None);
    }
}
