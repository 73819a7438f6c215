//! Publishing into the host state store.
//!
//! Keys are dotted paths (`station.<powerId>.dailyPower`). Each key has an object describing it,
//! declared once, and a current state that is overwritten on every publish.

use crate::api::Error;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    Number(f64),
    Text(String),
}

impl StateValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            StateValue::Number(_) => ValueKind::Number,
            StateValue::Text(_) => ValueKind::String,
        }
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Number(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Number,
    String,
}

/// Metadata of a published key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateObject {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ValueKind,
    pub unit: Option<String>,
    pub read: bool,
    pub write: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    pub val: StateValue,
    /// Set when the value comes from the device side rather than from a user command.
    pub ack: bool,
    /// Milliseconds since the Unix epoch.
    pub ts: u64,
}

/// Key-value store of the host application.
pub trait StateStore: Send + Sync {
    /// Declare `key` unless it already exists. Returns `true` when the object was created.
    fn set_object_not_exists(&self, key: &str, object: StateObject) -> Result<bool, Error>;

    fn set_state(&self, key: &str, state: State) -> Result<(), Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub object: StateObject,
    pub state: Option<State>,
}

/// In-process state store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Entry>>, Error> {
        self.entries
            .lock()
            .map_err(|e| Error::StoreError(e.to_string()))
    }

    pub fn object(&self, key: &str) -> Result<Option<StateObject>, Error> {
        Ok(self.lock()?.get(key).map(|entry| entry.object.clone()))
    }

    pub fn state(&self, key: &str) -> Result<Option<State>, Error> {
        Ok(self.lock()?.get(key).and_then(|entry| entry.state.clone()))
    }

    pub fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    pub fn snapshot(&self) -> Result<BTreeMap<String, Entry>, Error> {
        Ok(self.lock()?.clone())
    }
}

impl StateStore for MemoryStore {
    fn set_object_not_exists(&self, key: &str, object: StateObject) -> Result<bool, Error> {
        let mut entries = self.lock()?;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                object,
                state: None,
            },
        );
        Ok(true)
    }

    fn set_state(&self, key: &str, state: State) -> Result<(), Error> {
        match self.lock()?.get_mut(key) {
            Some(entry) => {
                entry.state = Some(state);
                Ok(())
            }
            None => Err(Error::StoreError(format!("No object declared for {}", key))),
        }
    }
}

/// Escape an id for use as a single key segment.
///
/// ASCII letters, digits and `-` are kept. `_` becomes `__` and every other byte becomes `_`
/// followed by two upper-case hex digits, so distinct ids never share a segment.
pub fn key_segment(raw: &str) -> String {
    let mut segment = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'_' => segment.push_str("__"),
            b if b.is_ascii_alphanumeric() || b == b'-' => segment.push(b as char),
            b => segment.push_str(&format!("_{:02X}", b)),
        }
    }
    segment
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct Publisher<S> {
    store: S,
}

impl<S: StateStore> Publisher<S> {
    pub fn new(store: S) -> Self {
        Publisher { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Declare `key` if needed, then write `value` as an acknowledged state.
    pub fn publish<V: Into<StateValue>>(
        &self,
        key: &str,
        value: V,
        unit: Option<&str>,
    ) -> Result<(), Error> {
        let value = value.into();
        let object = StateObject {
            name: key.rsplit('.').next().unwrap_or(key).to_string(),
            kind: value.kind(),
            unit: unit.map(String::from),
            read: true,
            write: false,
        };

        if self.store.set_object_not_exists(key, object)? {
            log::debug!("Declared state object {}", key);
        }

        self.store.set_state(
            key,
            State {
                val: value,
                ack: true,
                ts: now_millis(),
            },
        )
    }

    /// Publish every entry independently. Returns the number of keys written.
    pub fn publish_all<I>(&self, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, StateValue, Option<&'static str>)>,
    {
        let mut written = 0;
        for (key, value, unit) in entries {
            match self.publish(&key, value, unit) {
                Ok(()) => written += 1,
                Err(e) => log::warn!("Unable to publish {}: {}", key, e),
            }
        }
        written
    }
}
