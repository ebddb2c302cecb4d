//! Document validation against a bound schema.
//!
//! Validation is pure: it never mutates the document, never coerces types,
//! and yields the same verdict for the same input every time. The first
//! violation found is returned; traversal order inside one object follows
//! the document's own field order.

use std::collections::HashMap;

use serde_json::Value;

use crate::document::{json_type_name, Document};

use super::errors::ValidationError;
use super::types::{FieldDef, FieldType, Schema};

impl Schema {
    /// Validates a document against this schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered: a missing required
    /// field, an undeclared field (when `deny_unknown` is set), a rejected
    /// null, or a type mismatch at any depth.
    pub fn validate(&self, document: &Document) -> Result<(), ValidationError> {
        validate_object(document, &self.fields, self.deny_unknown, "")
    }
}

fn validate_object(
    obj: &Document,
    fields: &HashMap<String, FieldDef>,
    deny_unknown: bool,
    path_prefix: &str,
) -> Result<(), ValidationError> {
    if deny_unknown {
        for key in obj.keys() {
            if !fields.contains_key(key) {
                return Err(ValidationError::unknown_field(make_path(path_prefix, key)));
            }
        }
    }

    for (field_name, field_def) in fields {
        let field_path = make_path(path_prefix, field_name);

        match obj.get(field_name) {
            Some(value) => {
                if value.is_null() {
                    if field_def.nullable {
                        continue;
                    }
                    return Err(ValidationError::null_value(field_path));
                }
                validate_value(value, field_def, deny_unknown, &field_path)?;
            }
            None => {
                if field_def.required {
                    return Err(ValidationError::missing_field(field_path));
                }
            }
        }
    }

    Ok(())
}

fn validate_value(
    value: &Value,
    field_def: &FieldDef,
    deny_unknown: bool,
    field_path: &str,
) -> Result<(), ValidationError> {
    match &field_def.field_type {
        FieldType::String => {
            if !value.is_string() {
                return Err(type_error(field_path, "string", value));
            }
        }
        FieldType::Int => {
            if !value.is_i64() && !value.is_u64() {
                return Err(type_error(field_path, "int", value));
            }
        }
        FieldType::Bool => {
            if !value.is_boolean() {
                return Err(type_error(field_path, "bool", value));
            }
        }
        FieldType::Float => {
            // Integers are acceptable floats; no other coercion exists.
            if !value.is_number() {
                return Err(type_error(field_path, "float", value));
            }
        }
        FieldType::Object { fields } => {
            let obj = value
                .as_object()
                .ok_or_else(|| type_error(field_path, "object", value))?;
            validate_object(obj, fields, deny_unknown, field_path)?;
        }
        FieldType::Array { element_type } => {
            let arr = value
                .as_array()
                .ok_or_else(|| type_error(field_path, "array", value))?;
            let element_def = FieldDef {
                field_type: (**element_type).clone(),
                required: true,
                nullable: field_def.nullable,
            };

            for (i, elem) in arr.iter().enumerate() {
                let elem_path = format!("{}[{}]", field_path, i);
                if elem.is_null() {
                    if element_def.nullable {
                        continue;
                    }
                    return Err(ValidationError::null_value(elem_path));
                }
                validate_value(elem, &element_def, deny_unknown, &elem_path)?;
            }
        }
    }

    Ok(())
}

fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn type_error(field_path: &str, expected: &str, actual: &Value) -> ValidationError {
    ValidationError::type_mismatch(field_path, expected, json_type_name(actual))
}
