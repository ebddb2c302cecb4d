//! Optional structural schemas for record documents.
//!
//! A schema is bound per record definition and enforced only at save time;
//! a record without one accepts any document shape. Validation is
//! deterministic, read-only, and reports the first violation found.
//!
//! # Design Principles
//!
//! - Schemas are optional; absence means "no validation", never an enforced
//!   empty schema
//! - Unknown fields pass by default; `deny_unknown_fields` opts into strictness
//! - A violation aborts the save that triggered it; nothing is written

mod errors;
mod types;
mod validator;

pub use errors::ValidationError;
pub use types::{FieldDef, FieldType, Schema};
