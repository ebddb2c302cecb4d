//! Key/value adapter.
//!
//! The adapter owns the storage layout (namespaced keys, JSON-encoded
//! values) and delegates transport to an injected [`KvClient`]. Real network
//! clients (a Redis driver, for instance) live with the embedder; this crate
//! ships [`MemoryKvClient`] for tests and process-local use.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::document::Document;
use crate::errors::{Error, Result};

use super::{Backend, KeyIter, Namespace};

/// Transport contract for key/value stores.
///
/// Implementations are opaque byte stores: they never interpret keys beyond
/// prefix matching and never parse values. Thread safety of a client shared
/// across records is the client's own concern.
pub trait KvClient: Send + Sync {
    /// Checks reachability. Called once, when the adapter is constructed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] when the store cannot be reached.
    fn ping(&self) -> Result<()>;

    /// Reads the value at `key`; `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes `value` at `key`, overwriting any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Lazily yields every stored key starting with `prefix`.
    fn scan<'a>(&'a self, prefix: &str) -> Result<KeyIter<'a>>;
}

/// Backend adapter over any [`KvClient`].
pub struct KvBackend {
    client: Arc<dyn KvClient>,
}

impl std::fmt::Debug for KvBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvBackend").finish_non_exhaustive()
    }
}

impl KvBackend {
    /// Wraps a client, pinging it once to fail fast on connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] when the ping fails.
    pub fn new(client: Arc<dyn KvClient>) -> Result<Self> {
        client.ping().map_err(|e| match e {
            Error::Connection(msg) => Error::Connection(msg),
            other => Error::connection(format!("unable to reach the key/value store: {}", other)),
        })?;
        Ok(Self { client })
    }
}

impl Backend for KvBackend {
    fn name(&self) -> &'static str {
        "key/value"
    }

    fn load(&self, namespace: &Namespace, identifier: &str) -> Result<Option<Document>> {
        let key = namespace.key_for(identifier);
        match self.client.get(&key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, namespace: &Namespace, identifier: &str, document: &Document) -> Result<()> {
        let key = namespace.key_for(identifier);
        let bytes = serde_json::to_vec(document)?;
        self.client.set(&key, &bytes)
    }

    fn all_keys<'a>(&'a self, namespace: &Namespace) -> Result<KeyIter<'a>> {
        let prefix = namespace.prefix();
        let keys = self.client.scan(&prefix)?;
        Ok(Box::new(keys.map(move |item| {
            item.map(|key| match key.strip_prefix(&prefix) {
                Some(identifier) => identifier.to_string(),
                None => key,
            })
        })))
    }
}

/// In-memory [`KvClient`] backed by a mutex-guarded map.
///
/// `scan` yields a snapshot taken when enumeration starts; writes made while
/// iterating are not reflected.
#[derive(Debug, Default)]
pub struct MemoryKvClient {
    data: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryKvClient {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored, across all collections.
    pub fn len(&self) -> usize {
        self.data.lock().expect("kv store poisoned").len()
    }

    /// Whether the store holds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvClient for MemoryKvClient {
    fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.lock().expect("kv store poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.data
            .lock()
            .expect("kv store poisoned")
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn scan<'a>(&'a self, prefix: &str) -> Result<KeyIter<'a>> {
        let matching: Vec<String> = self
            .data
            .lock()
            .expect("kv store poisoned")
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        Ok(Box::new(matching.into_iter().map(Ok)))
    }
}
