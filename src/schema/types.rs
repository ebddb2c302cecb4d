//! Schema type definitions.
//!
//! Supported field types:
//! - string: UTF-8 string
//! - int: 64-bit integer
//! - bool: Boolean
//! - float: any JSON number (integers coerce upward)
//! - object: nested object with its own field schema
//! - array: homogeneous array with one element type

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Supported field types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit integer
    Int,
    /// Boolean
    Bool,
    /// Any JSON number
    Float,
    /// Nested object with its own field schema
    Object {
        /// Nested field definitions
        fields: HashMap<String, FieldDef>,
    },
    /// Homogeneous array with a single element type
    Array {
        /// Element type (boxed to allow recursion)
        element_type: Box<FieldType>,
    },
}

impl FieldType {
    /// Returns the type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Bool => "bool",
            FieldType::Float => "float",
            FieldType::Object { .. } => "object",
            FieldType::Array { .. } => "array",
        }
    }
}

/// One declared field: its type, whether it must be present, and whether
/// `null` is an acceptable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether the field must be present
    pub required: bool,
    /// Whether `null` is accepted in place of a typed value
    #[serde(default)]
    pub nullable: bool,
}

impl FieldDef {
    fn of(field_type: FieldType, required: bool) -> Self {
        Self {
            field_type,
            required,
            nullable: false,
        }
    }

    /// Create a required string field
    pub fn required_string() -> Self {
        Self::of(FieldType::String, true)
    }

    /// Create an optional string field
    pub fn optional_string() -> Self {
        Self::of(FieldType::String, false)
    }

    /// Create a required int field
    pub fn required_int() -> Self {
        Self::of(FieldType::Int, true)
    }

    /// Create an optional int field
    pub fn optional_int() -> Self {
        Self::of(FieldType::Int, false)
    }

    /// Create a required bool field
    pub fn required_bool() -> Self {
        Self::of(FieldType::Bool, true)
    }

    /// Create an optional bool field
    pub fn optional_bool() -> Self {
        Self::of(FieldType::Bool, false)
    }

    /// Create a required float field
    pub fn required_float() -> Self {
        Self::of(FieldType::Float, true)
    }

    /// Create an optional float field
    pub fn optional_float() -> Self {
        Self::of(FieldType::Float, false)
    }

    /// Create a required object field
    pub fn required_object(fields: HashMap<String, FieldDef>) -> Self {
        Self::of(FieldType::Object { fields }, true)
    }

    /// Create an optional object field
    pub fn optional_object(fields: HashMap<String, FieldDef>) -> Self {
        Self::of(FieldType::Object { fields }, false)
    }

    /// Create a required array field
    pub fn required_array(element_type: FieldType) -> Self {
        Self::of(
            FieldType::Array {
                element_type: Box::new(element_type),
            },
            true,
        )
    }

    /// Create an optional array field
    pub fn optional_array(element_type: FieldType) -> Self {
        Self::of(
            FieldType::Array {
                element_type: Box::new(element_type),
            },
            false,
        )
    }

    /// Marks the field as accepting `null`.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A complete document schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Field definitions
    pub fields: HashMap<String, FieldDef>,
    /// Whether fields absent from `fields` are rejected
    #[serde(default)]
    pub deny_unknown: bool,
}

impl Schema {
    /// Creates a schema over the given field definitions. Unknown fields are
    /// permitted; see [`Schema::deny_unknown_fields`].
    pub fn new(fields: HashMap<String, FieldDef>) -> Self {
        Self {
            fields,
            deny_unknown: false,
        }
    }

    /// Rejects any document field not declared in the schema.
    pub fn deny_unknown_fields(mut self) -> Self {
        self.deny_unknown = true;
        self
    }
}
