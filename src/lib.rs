//! clara - a schema-optional JSON object-document mapper
//!
//! A record type is declared once with a default document shape and an
//! optional schema; instances of that record are persisted to one of several
//! interchangeable key/value backends, with structural validation at save
//! time.
//!
//! # Design Principles
//!
//! - One logical document per record instance
//! - Backend resolution is explicit and happens once, at construction
//! - Absence of a stored document is not an error; the default seeds it
//! - Validation gates every save; a rejected document is never written
//! - No hidden global state: connections and factories are injected
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use clara::{BackendName, BackendRegistry, KvBackend, MemoryKvClient, RecordDefinition};
//! use serde_json::json;
//!
//! let client = Arc::new(MemoryKvClient::new());
//! let registry = BackendRegistry::new(BackendName::Redis).register(BackendName::Redis, {
//!     let client = client.clone();
//!     move || {
//!         let backend: Arc<dyn clara::Backend> = Arc::new(KvBackend::new(client.clone())?);
//!         Ok(backend)
//!     }
//! });
//!
//! let users = RecordDefinition::new("User")
//!     .default_document(json!({"name": "", "transcriptions": 0}));
//!
//! let mut record = users.open("pam", &registry).unwrap();
//! record.set("name", json!("Pam Beesly"));
//! record.save().unwrap();
//! ```

pub mod backend;
pub mod config;
pub mod document;
pub mod errors;
pub mod record;
pub mod schema;

pub use backend::file::FileBackend;
pub use backend::kv::{KvBackend, KvClient, MemoryKvClient};
pub use backend::search::{SearchBackend, SearchClient};
pub use backend::{Backend, BackendName, BackendOverride, BackendRegistry, KeyIter, Namespace};
pub use config::Config;
pub use document::Document;
pub use errors::{Error, Result};
pub use record::{Record, RecordDefinition};
pub use schema::{FieldDef, FieldType, Schema, ValidationError};
