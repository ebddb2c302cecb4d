//! The record engine.
//!
//! A [`RecordDefinition`] is the caller's one-time declaration of a record
//! type: a default document shape, an optional schema, and optional backend
//! overrides. Opening a definition against an identifier resolves exactly
//! one backend, derives the namespaced key, and loads the stored document or
//! seeds a deep copy of the default.
//!
//! # Invariants Enforced
//!
//! - Exactly one backend per record instance; dual connections are rejected
//! - The namespace is fixed at construction and never recomputed
//! - The live document is always an object, never absent
//! - The default is copied, never aliased, into a fresh instance
//! - A schema violation aborts the save with no backend write

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::kv::{KvBackend, KvClient};
use crate::backend::search::{SearchBackend, SearchClient};
use crate::backend::{Backend, BackendOverride, BackendRegistry, KeyIter, Namespace};
use crate::document::{json_type_name, Document};
use crate::errors::{Error, Result};
use crate::schema::Schema;

/// Immutable declaration of a record type.
///
/// Every optional field defaults to absent; resolution at
/// [`open`](RecordDefinition::open) is a straightforward precedence chain
/// over what is present.
#[derive(Clone)]
pub struct RecordDefinition {
    name: String,
    default_document: Option<Value>,
    schema: Option<Schema>,
    key_name: Option<String>,
    kv_connection: Option<Arc<dyn KvClient>>,
    search_connection: Option<Arc<dyn SearchClient>>,
    backend: Option<BackendOverride>,
}

impl RecordDefinition {
    /// Declares a record type. `name` is the logical type name; it becomes
    /// the collection name (lower-cased) unless [`key_name`](Self::key_name)
    /// overrides it.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_document: None,
            schema: None,
            key_name: None,
            kv_connection: None,
            search_connection: None,
            backend: None,
        }
    }

    /// Sets the default document shape. Must be a JSON object; anything else
    /// fails record construction with a configuration error.
    pub fn default_document(mut self, default: Value) -> Self {
        self.default_document = Some(default);
        self
    }

    /// Binds a schema, enforced on every save.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Overrides the collection name used in keys.
    pub fn key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = Some(key_name.into());
        self
    }

    /// Supplies an already-constructed key/value client.
    pub fn kv_connection(mut self, client: Arc<dyn KvClient>) -> Self {
        self.kv_connection = Some(client);
        self
    }

    /// Supplies an already-constructed search client.
    pub fn search_connection(mut self, client: Arc<dyn SearchClient>) -> Self {
        self.search_connection = Some(client);
        self
    }

    /// Selects a backend by symbolic name, resolved through the registry at
    /// construction.
    pub fn backend_name(mut self, name: impl Into<String>) -> Self {
        self.backend = Some(BackendOverride::Name(name.into()));
        self
    }

    /// Supplies a pre-constructed backend adapter, used as-is.
    pub fn backend_instance(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(BackendOverride::Instance(backend));
        self
    }

    /// Opens a record instance for `identifier`.
    ///
    /// Resolves the backend, validates the default shape, derives the
    /// namespace, and performs the initial load; a missing stored document
    /// seeds the instance from a deep copy of the default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for dual connections, unknown
    /// backend names, or a non-object default; [`Error::Connection`] when
    /// the resolved adapter cannot reach its store; and any transport or
    /// decoding error from the initial load.
    pub fn open(&self, identifier: impl Into<String>, registry: &BackendRegistry) -> Result<Record> {
        let backend = self.resolve_backend(registry)?;
        let default = self.resolve_default()?;
        let namespace = Namespace::new(match &self.key_name {
            Some(key_name) => key_name.clone(),
            None => self.name.to_lowercase(),
        });
        let identifier = identifier.into();

        let document = match backend.load(&namespace, &identifier)? {
            Some(stored) => stored,
            None => {
                debug!(
                    key = %namespace.key_for(&identifier),
                    "no stored document found; seeding from the default"
                );
                default.clone()
            }
        };

        Ok(Record {
            identifier,
            namespace,
            default,
            schema: self.schema.clone(),
            document,
            backend,
        })
    }

    /// First match wins; the checks are mutually exclusive by construction
    /// order, not by field declaration order.
    fn resolve_backend(&self, registry: &BackendRegistry) -> Result<Arc<dyn Backend>> {
        if self.kv_connection.is_some() && self.search_connection.is_some() {
            return Err(Error::configuration(
                "received both a key/value connection and a search connection; \
                 use one or the other",
            ));
        }

        if let Some(client) = &self.kv_connection {
            return Ok(Arc::new(KvBackend::new(client.clone())?));
        }

        if let Some(client) = &self.search_connection {
            return Ok(Arc::new(SearchBackend::new(client.clone())?));
        }

        match &self.backend {
            Some(BackendOverride::Instance(backend)) => Ok(backend.clone()),
            Some(BackendOverride::Name(name)) => registry.resolve(name.parse()?),
            None => registry.resolve_default(),
        }
    }

    fn resolve_default(&self) -> Result<Document> {
        match &self.default_document {
            None => {
                warn!(
                    record = %self.name,
                    "no default document declared; instances will seed from an empty object"
                );
                Ok(Document::new())
            }
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(Error::configuration(format!(
                "default document for '{}' must be a JSON object, got {}",
                self.name,
                json_type_name(other)
            ))),
        }
    }
}

impl fmt::Debug for RecordDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDefinition")
            .field("name", &self.name)
            .field("key_name", &self.key_name)
            .field("has_schema", &self.schema.is_some())
            .field("backend", &self.backend)
            .finish()
    }
}

/// One live record: a mutable in-memory document bound to a backend and a
/// namespaced key for its lifetime.
pub struct Record {
    identifier: String,
    namespace: Namespace,
    default: Document,
    schema: Option<Schema>,
    document: Document,
    backend: Arc<dyn Backend>,
}

impl Record {
    /// The identifier this record was opened with.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The collection namespace, fixed at construction.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The fully qualified storage key, e.g. `"::user::pam"`.
    pub fn key(&self) -> String {
        self.namespace.key_for(&self.identifier)
    }

    /// The key template with the identifier segment left open,
    /// e.g. `"::user::{}"`.
    pub fn key_template(&self) -> String {
        self.namespace.template()
    }

    /// The current in-memory document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the in-memory document. Changes are held in memory
    /// until [`save`](Self::save).
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.document.len()
    }

    /// Whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Returns the field's current value, or `None` when absent. There is no
    /// error path.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.document.get(field)
    }

    /// Returns the field's current value, or `fallback` when absent.
    pub fn get_or<'a>(&'a self, field: &str, fallback: &'a Value) -> &'a Value {
        self.document.get(field).unwrap_or(fallback)
    }

    /// Sets a field in memory. Nothing is validated or persisted until
    /// [`save`](Self::save).
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.document.insert(field.into(), value);
    }

    /// Removes a field in memory, returning its previous value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.document.remove(field)
    }

    /// Checks the current document against the bound schema, without side
    /// effects. A record without a schema always validates.
    ///
    /// # Errors
    ///
    /// Propagates the schema's [`ValidationError`](crate::ValidationError)
    /// unchanged.
    pub fn validate(&self) -> Result<()> {
        match &self.schema {
            Some(schema) => Ok(schema.validate(&self.document)?),
            None => Ok(()),
        }
    }

    /// Validates, then persists the current document as one whole-document
    /// write.
    ///
    /// # Errors
    ///
    /// A validation failure aborts the save before any backend call; the
    /// in-memory document is left untouched and nothing is written.
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        self.backend
            .save(&self.namespace, &self.identifier, &self.document)
    }

    /// Reconciles the document with the definition's current default, for
    /// documents persisted under an older shape:
    ///
    /// 1. Additive: fields present in the default but absent here are copied
    ///    in with their default values.
    /// 2. Subtractive: fields absent from the default are removed.
    ///
    /// The phases are independent of each other's traversal order. Nothing
    /// is persisted; call [`save`](Self::save) afterward.
    pub fn upgrade(&mut self) {
        for (field, value) in &self.default {
            if !self.document.contains_key(field) {
                self.document.insert(field.clone(), value.clone());
            }
        }

        let obsolete: Vec<String> = self
            .document
            .keys()
            .filter(|field| !self.default.contains_key(*field))
            .cloned()
            .collect();
        for field in obsolete {
            self.document.remove(&field);
        }
    }

    /// Enumerates every identifier stored in this record's collection.
    ///
    /// The sequence is lazy and non-restartable; consistency under
    /// concurrent writes is whatever the backend provides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for backends that cannot enumerate.
    pub fn all_keys(&self) -> Result<KeyIter<'_>> {
        self.backend.all_keys(&self.namespace)
    }
}

/// Read access by field name. Panics when the field is absent, mirroring map
/// indexing; use [`Record::get`] for the fallible path.
impl Index<&str> for Record {
    type Output = Value;

    fn index(&self, field: &str) -> &Value {
        &self.document[field]
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("key", &self.key())
            .field("document", &self.document)
            .finish()
    }
}
