//! Record Engine Invariant Tests
//!
//! End-to-end checks against the public API:
//! - Fresh construction equals the default by value, never by aliasing
//! - Backend selection precedence and its failure modes
//! - Key derivation from the declared key name or the type name
//! - Schema-gated saves perform no backend write on rejection
//! - Save/load round-trips across instances sharing one backend

use std::collections::HashMap;
use std::sync::Arc;

use clara::{
    Backend, BackendName, BackendRegistry, Error, FieldDef, FileBackend, KvBackend,
    MemoryKvClient, RecordDefinition, Schema,
};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn registry_over(client: Arc<MemoryKvClient>) -> BackendRegistry {
    BackendRegistry::new(BackendName::Redis).register(BackendName::Redis, move || {
        let backend: Arc<dyn Backend> = Arc::new(KvBackend::new(client.clone())?);
        Ok(backend)
    })
}

fn user_schema() -> Schema {
    let mut fields = HashMap::new();
    fields.insert("name".to_string(), FieldDef::required_string());
    fields.insert("transcriptions".to_string(), FieldDef::optional_int());
    Schema::new(fields)
}

// =============================================================================
// Construction
// =============================================================================

/// A fresh record's document equals the declared default by content.
#[test]
fn test_fresh_record_equals_default() {
    let registry = registry_over(Arc::new(MemoryKvClient::new()));
    let definition =
        RecordDefinition::new("User").default_document(json!({"name": "", "volunteer": true}));

    let record = definition.open("pam", &registry).unwrap();
    assert_eq!(
        record.document(),
        json!({"name": "", "volunteer": true}).as_object().unwrap()
    );
}

/// Mutating one instance never corrupts the default seen by later instances.
#[test]
fn test_default_is_never_aliased() {
    let registry = registry_over(Arc::new(MemoryKvClient::new()));
    let definition = RecordDefinition::new("User").default_document(json!({"tags": []}));

    let mut first = definition.open("a", &registry).unwrap();
    first
        .document_mut()
        .get_mut("tags")
        .unwrap()
        .as_array_mut()
        .unwrap()
        .push(json!("scribbled"));

    let second = definition.open("b", &registry).unwrap();
    assert_eq!(second.get("tags"), Some(&json!([])));
}

/// A missing default is tolerated; the record starts empty.
#[test]
fn test_missing_default_yields_empty_record() {
    let registry = registry_over(Arc::new(MemoryKvClient::new()));
    let record = RecordDefinition::new("User").open("pam", &registry).unwrap();
    assert!(record.is_empty());
}

// =============================================================================
// Key Derivation
// =============================================================================

#[test]
fn test_key_name_overrides_type_name() {
    let registry = registry_over(Arc::new(MemoryKvClient::new()));

    let named = RecordDefinition::new("X").key_name("snarfleblat");
    let record = named.open("id", &registry).unwrap();
    assert_eq!(record.key_template(), "::snarfleblat::{}");

    let unnamed = RecordDefinition::new("X");
    let record = unnamed.open("id", &registry).unwrap();
    assert_eq!(record.key_template(), "::x::{}");
}

// =============================================================================
// Mutation
// =============================================================================

/// `set` and direct document mutation write the same underlying field.
#[test]
fn test_both_mutation_paths_converge() {
    let registry = registry_over(Arc::new(MemoryKvClient::new()));
    let mut record = RecordDefinition::new("User").open("obi", &registry).unwrap();

    record.set("yo", json!("hello there"));
    record
        .document_mut()
        .insert("yo".to_string(), json!("general kenobi"));

    assert_eq!(record.get("yo"), Some(&json!("general kenobi")));
}

// =============================================================================
// Upgrade
// =============================================================================

/// `{"old": 1}` against a default of `{"new": 2}` becomes `{"new": 2}`.
#[test]
fn test_upgrade_reconciles_against_current_default() {
    let client = Arc::new(MemoryKvClient::new());
    let registry = registry_over(client);

    let old_shape = RecordDefinition::new("Widget").default_document(json!({"old": 1}));
    old_shape.open("w", &registry).unwrap().save().unwrap();

    let new_shape = RecordDefinition::new("Widget").default_document(json!({"new": 2}));
    let mut record = new_shape.open("w", &registry).unwrap();
    assert_eq!(record.get("old"), Some(&json!(1)));

    record.upgrade();
    assert_eq!(
        record.document(),
        json!({"new": 2}).as_object().unwrap()
    );

    // Persisting the upgrade is the caller's move.
    record.save().unwrap();
    let reloaded = new_shape.open("w", &registry).unwrap();
    assert_eq!(reloaded.get("old"), None);
    assert_eq!(reloaded.get("new"), Some(&json!(2)));
}

// =============================================================================
// Schema Gating
// =============================================================================

/// A document violating the schema is rejected and nothing reaches the store.
#[test]
fn test_rejected_save_leaves_store_untouched() {
    let client = Arc::new(MemoryKvClient::new());
    let registry = registry_over(client.clone());

    let definition = RecordDefinition::new("User")
        .default_document(json!({"name": 42}))
        .schema(user_schema());
    let record = definition.open("pam", &registry).unwrap();

    let err = record.save().unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(client.is_empty(), "no write may reach the backend");
}

#[test]
fn test_valid_save_passes_schema() {
    let registry = registry_over(Arc::new(MemoryKvClient::new()));
    let definition = RecordDefinition::new("User")
        .default_document(json!({"name": "Pam", "transcriptions": 7}))
        .schema(user_schema());
    let record = definition.open("pam", &registry).unwrap();
    record.save().unwrap();
}

// =============================================================================
// Round-Trips
// =============================================================================

/// Save with one instance, reopen with another: same document.
#[test]
fn test_round_trip_across_instances() {
    let registry = registry_over(Arc::new(MemoryKvClient::new()));
    let definition = RecordDefinition::new("User").default_document(json!({"name": ""}));

    let mut a = definition.open("pam", &registry).unwrap();
    a.set("name", json!("Pam Beesly"));
    a.set("nested", json!({"desk": "reception"}));
    a.save().unwrap();

    let b = definition.open("pam", &registry).unwrap();
    assert_eq!(b.document(), a.document());
}

/// The same engine semantics hold over the file-backed adapter.
#[test]
fn test_round_trip_through_file_backend() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.json");
    let registry = registry_over(Arc::new(MemoryKvClient::new()));

    let definition = RecordDefinition::new("Post").default_document(json!({"title": ""}));

    {
        let backend: Arc<dyn Backend> = Arc::new(FileBackend::open(&path).unwrap());
        let mut record = definition
            .clone()
            .backend_instance(backend)
            .open("memo", &registry)
            .unwrap();
        record.set("title", json!("Dunder Mifflin"));
        record.save().unwrap();
    }

    let backend: Arc<dyn Backend> = Arc::new(FileBackend::open(&path).unwrap());
    let record = definition
        .backend_instance(backend)
        .open("memo", &registry)
        .unwrap();
    assert_eq!(record.get("title"), Some(&json!("Dunder Mifflin")));
}

// =============================================================================
// Enumeration
// =============================================================================

#[test]
fn test_all_keys_enumerates_collection_only() {
    let client = Arc::new(MemoryKvClient::new());
    let registry = registry_over(client);

    let users = RecordDefinition::new("User").default_document(json!({}));
    let posts = RecordDefinition::new("Post").default_document(json!({}));

    users.open("pam", &registry).unwrap().save().unwrap();
    users.open("jim", &registry).unwrap().save().unwrap();
    posts.open("memo", &registry).unwrap().save().unwrap();

    let record = users.open("pam", &registry).unwrap();
    let mut ids: Vec<String> = record
        .all_keys()
        .unwrap()
        .collect::<clara::Result<_>>()
        .unwrap();
    ids.sort();
    assert_eq!(ids, vec!["jim", "pam"]);
}
