//! Document-search adapter.
//!
//! All records share one fixed index; the collection name acts as a type
//! discriminator within it, and the record identifier is the document id.
//! Key enumeration is unsupported by design: the search contract has no
//! cheap prefix scan, and pretending otherwise by returning an empty
//! sequence would mask the limitation.

use std::sync::Arc;

use serde_json::Value;

use crate::document::Document;
use crate::errors::{Error, Result};

use super::{Backend, KeyIter, Namespace};

/// The single index every clara collection lives in.
pub const INDEX: &str = "clara";

/// Transport contract for document-search stores.
pub trait SearchClient: Send + Sync {
    /// Checks reachability. Called once, when the adapter is constructed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] when the store cannot be reached.
    fn ping(&self) -> Result<()>;

    /// Fetches the document body stored at `(index, doc_type, id)`;
    /// `Ok(None)` when absent.
    fn get(&self, index: &str, doc_type: &str, id: &str) -> Result<Option<Value>>;

    /// Indexes `body` at `(index, doc_type, id)`, overwriting any previous
    /// document.
    fn put(&self, index: &str, doc_type: &str, id: &str, body: &Value) -> Result<()>;
}

/// Backend adapter over any [`SearchClient`].
pub struct SearchBackend {
    client: Arc<dyn SearchClient>,
}

impl std::fmt::Debug for SearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchBackend").finish_non_exhaustive()
    }
}

impl SearchBackend {
    /// Wraps a client, pinging it once to fail fast on connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] when the ping fails.
    pub fn new(client: Arc<dyn SearchClient>) -> Result<Self> {
        client.ping().map_err(|e| match e {
            Error::Connection(msg) => Error::Connection(msg),
            other => Error::connection(format!("unable to reach the search store: {}", other)),
        })?;
        Ok(Self { client })
    }
}

impl Backend for SearchBackend {
    fn name(&self) -> &'static str {
        "search"
    }

    fn load(&self, namespace: &Namespace, identifier: &str) -> Result<Option<Document>> {
        match self.client.get(INDEX, namespace.collection(), identifier)? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }

    fn save(&self, namespace: &Namespace, identifier: &str, document: &Document) -> Result<()> {
        let body = Value::Object(document.clone());
        self.client
            .put(INDEX, namespace.collection(), identifier, &body)
    }

    fn all_keys<'a>(&'a self, _namespace: &Namespace) -> Result<KeyIter<'a>> {
        Err(Error::NotSupported(self.name()))
    }
}
