//! Field values and materialized records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Signed integer
    Int,
    /// UTF-8 text
    Text,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int => f.write_str("int"),
            FieldType::Text => f.write_str("text"),
        }
    }
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldValue {
    /// Integer value
    Int(i64),
    /// Text value
    Text(String),
}

impl FieldValue {
    /// Type of this value.
    #[inline]
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::Text(_) => FieldType::Text,
        }
    }

    /// Integer payload, if this is an integer field.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// Text payload, if this is a text field.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Int(_) => None,
            FieldValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// A fully materialized record: field values in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<FieldValue>,
}

impl Record {
    /// Build a record from field values in schema order.
    pub fn from_fields(fields: Vec<FieldValue>) -> Self {
        Self { fields }
    }

    /// Field at `index` (0-based; `field1` is index 0).
    #[inline]
    pub fn field(&self, index: usize) -> Option<&FieldValue> {
        self.fields.get(index)
    }

    /// The key-echo field (`field1`).
    #[inline]
    pub fn key_echo(&self) -> Option<&FieldValue> {
        self.fields.first()
    }

    /// All field values.
    #[inline]
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the record, returning its field values.
    pub fn into_fields(self) -> Vec<FieldValue> {
        self.fields
    }
}
