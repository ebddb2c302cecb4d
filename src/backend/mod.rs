//! Storage backends for record documents.
//!
//! Every adapter satisfies the same small contract: load a document, save a
//! document, enumerate identifiers. The engine never talks to a concrete
//! store directly; it holds a `dyn Backend` resolved once at record
//! construction.
//!
//! # Invariants Enforced
//!
//! - Absence on `load` is `Ok(None)`, never an error
//! - `save` is a single whole-document put; no partial writes
//! - Adapters that cannot enumerate keys fail per call with `NotSupported`
//!   instead of returning an empty sequence
//! - Connectivity problems surface once, at adapter construction

pub mod file;
pub mod kv;
pub mod search;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::document::Document;
use crate::errors::{Error, Result};

/// A lazy, non-restartable sequence of identifiers.
///
/// Consistency under concurrent mutation is backend-defined; the engine makes
/// no promise beyond forwarding what the store yields.
pub type KeyIter<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// The collection namespace a record's keys live in.
///
/// Keys take the two-segment form `::<collection>::<identifier>`, which
/// isolates collections sharing one physical store and allows prefix-scan
/// enumeration. The raw collection name is kept alongside because
/// search-style backends use it as a type discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    collection: String,
}

impl Namespace {
    /// Creates a namespace for the given collection name.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }

    /// The raw collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The fully qualified key for an identifier.
    pub fn key_for(&self, identifier: &str) -> String {
        format!("::{}::{}", self.collection, identifier)
    }

    /// The key template with the identifier segment left open,
    /// e.g. `"::user::{}"`.
    pub fn template(&self) -> String {
        format!("::{}::{{}}", self.collection)
    }

    /// The prefix shared by every key in this collection.
    pub fn prefix(&self) -> String {
        format!("::{}::", self.collection)
    }
}

/// The capability every storage adapter must satisfy.
///
/// Implementations own their connection lifecycle entirely: they ping at
/// construction and fail fast there, so per-call errors are data errors, not
/// connectivity probes.
pub trait Backend: Send + Sync {
    /// Short adapter name used in error messages.
    fn name(&self) -> &'static str;

    /// Looks up the document stored for `identifier` within `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport or decoding failures; a missing
    /// document is `Ok(None)`.
    fn load(&self, namespace: &Namespace, identifier: &str) -> Result<Option<Document>>;

    /// Writes or overwrites the document at the namespaced key.
    fn save(&self, namespace: &Namespace, identifier: &str, document: &Document) -> Result<()>;

    /// Enumerates the identifiers currently stored under `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] from adapters that cannot enumerate.
    fn all_keys<'a>(&'a self, namespace: &Namespace) -> Result<KeyIter<'a>>;
}

/// The closed set of backends resolvable by symbolic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendName {
    /// Key/value store speaking the `KvClient` contract
    Redis,
    /// Document-search store speaking the `SearchClient` contract
    Elasticsearch,
}

impl BackendName {
    /// All known backend names, for error messages.
    pub const ALL: [BackendName; 2] = [BackendName::Redis, BackendName::Elasticsearch];

    /// The symbolic name, as accepted in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendName::Redis => "redis",
            BackendName::Elasticsearch => "elasticsearch",
        }
    }

    fn options() -> String {
        Self::ALL
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for BackendName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "redis" => Ok(BackendName::Redis),
            "elasticsearch" => Ok(BackendName::Elasticsearch),
            other => Err(Error::configuration(format!(
                "the requested backend '{}' is not available as an option; \
                 usable options are: {}",
                other,
                Self::options()
            ))),
        }
    }
}

/// A record-level backend override: a symbolic name to resolve through the
/// registry, or a pre-constructed adapter to use as-is.
#[derive(Clone)]
pub enum BackendOverride {
    /// Resolve this name against the registry at construction
    Name(String),
    /// Use this adapter directly; no resolution happens
    Instance(Arc<dyn Backend>),
}

impl fmt::Debug for BackendOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendOverride::Name(name) => f.debug_tuple("Name").field(name).finish(),
            BackendOverride::Instance(b) => f.debug_tuple("Instance").field(&b.name()).finish(),
        }
    }
}

type BackendFactory = Box<dyn Fn() -> Result<Arc<dyn Backend>> + Send + Sync>;

/// Maps symbolic backend names to adapter factories.
///
/// Built once at process start by the embedder and passed to every record
/// construction; there is no process-global registry. A factory runs each
/// time its name is resolved, so sharing one connection across records is
/// the factory's choice (capture and clone an `Arc`).
pub struct BackendRegistry {
    factories: HashMap<BackendName, BackendFactory>,
    default: BackendName,
}

impl BackendRegistry {
    /// Creates an empty registry with the given default backend.
    pub fn new(default: BackendName) -> Self {
        Self {
            factories: HashMap::new(),
            default,
        }
    }

    /// Creates a registry whose default comes from process configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the valid options when the
    /// configured default is not a known backend name.
    pub fn from_config(config: &Config) -> Result<Self> {
        let default = config.default_backend.parse()?;
        Ok(Self::new(default))
    }

    /// Registers a factory for a backend name, replacing any previous one.
    pub fn register<F>(mut self, name: BackendName, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Backend>> + Send + Sync + 'static,
    {
        self.factories.insert(name, Box::new(factory));
        self
    }

    /// The default backend name.
    pub fn default_backend(&self) -> BackendName {
        self.default
    }

    /// Resolves a backend name to a live adapter.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no factory is registered for the
    /// name, or whatever the factory itself fails with (typically a
    /// connection error).
    pub fn resolve(&self, name: BackendName) -> Result<Arc<dyn Backend>> {
        let factory = self.factories.get(&name).ok_or_else(|| {
            let registered = if self.factories.is_empty() {
                "none".to_string()
            } else {
                let mut names: Vec<_> =
                    self.factories.keys().map(|n| n.as_str()).collect();
                names.sort_unstable();
                names.join(", ")
            };
            Error::configuration(format!(
                "no factory registered for backend '{}'; registered backends: {}",
                name, registered
            ))
        })?;
        factory()
    }

    /// Resolves the default backend.
    pub fn resolve_default(&self) -> Result<Arc<dyn Backend>> {
        self.resolve(self.default)
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("default", &self.default)
            .field("registered", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
