//! Fixed record schemas.
//!
//! A schema is an ordered list of typed, named fields. The first field is
//! always the key-echo field (`field1`), whose value is the canonical form of
//! the record's key. The standard schema has 64 fields alternating integer and
//! text filler, with `field33` carrying the `key_<n>` tag.

use std::collections::HashMap;

use crate::codec::hash64;
use crate::key::KeyShape;
use crate::record::value::{FieldType, Record};
use crate::status::Status;

/// Name of the key-echo field.
pub const KEY_ECHO_FIELD: &str = "field1";

/// Name of the key-tag field in the standard schema.
pub const KEY_TAG_FIELD: &str = "field33";

/// Number of fields in the standard schema.
pub const STANDARD_FIELD_COUNT: usize = 64;

/// 1-based position of the key-tag field.
const KEY_TAG_POSITION: usize = 33;

/// How a field's value is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// Canonical form of the record's key
    KeyEcho,
    /// `key_<n>` tag derived from the key
    KeyTag,
    /// Random filler
    Filler,
}

impl FieldRole {
    const fn as_str(&self) -> &'static str {
        match self {
            FieldRole::KeyEcho => "echo",
            FieldRole::KeyTag => "tag",
            FieldRole::Filler => "filler",
        }
    }
}

/// Definition of one schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: String,
    field_type: FieldType,
    role: FieldRole,
}

impl FieldDef {
    /// Create a field definition.
    pub fn new(name: impl Into<String>, field_type: FieldType, role: FieldRole) -> Self {
        Self {
            name: name.into(),
            field_type,
            role,
        }
    }

    /// Field name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field type.
    #[inline]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Field role.
    #[inline]
    pub fn role(&self) -> FieldRole {
        self.role
    }
}

/// An ordered, fixed record schema.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    id: u32,
    key_shape: KeyShape,
    fields: Vec<FieldDef>,
    by_name: HashMap<String, usize>,
}

impl RecordSchema {
    /// The standard 64-field schema for the given key shape.
    pub fn standard(key_shape: KeyShape) -> Self {
        Self::with_field_count(key_shape, STANDARD_FIELD_COUNT)
    }

    /// A schema of `field_count` fields laid out like the standard one
    /// (at least the key-echo field is always present).
    pub fn with_field_count(key_shape: KeyShape, field_count: usize) -> Self {
        let fields = (1..=field_count.max(1))
            .map(|pos| {
                let name = format!("field{pos}");
                if pos == 1 {
                    FieldDef::new(name, key_echo_type(key_shape), FieldRole::KeyEcho)
                } else if pos == KEY_TAG_POSITION {
                    FieldDef::new(name, FieldType::Text, FieldRole::KeyTag)
                } else if pos % 2 == 0 {
                    FieldDef::new(name, FieldType::Int, FieldRole::Filler)
                } else {
                    FieldDef::new(name, FieldType::Text, FieldRole::Filler)
                }
            })
            .collect();
        Self::build(key_shape, fields)
    }

    /// Build a schema from explicit field definitions.
    ///
    /// The first field must be the only key-echo field and its type must match
    /// `key_shape`; key-tag fields must be text; names must be unique.
    pub fn from_fields(key_shape: KeyShape, fields: Vec<FieldDef>) -> Result<Self, Status> {
        let first = fields.first().ok_or(Status::InvalidArgument)?;
        if first.role != FieldRole::KeyEcho || first.field_type != key_echo_type(key_shape) {
            return Err(Status::InvalidArgument);
        }
        for def in &fields[1..] {
            match def.role {
                FieldRole::KeyEcho => return Err(Status::InvalidArgument),
                FieldRole::KeyTag if def.field_type != FieldType::Text => {
                    return Err(Status::InvalidArgument)
                }
                _ => {}
            }
        }
        let schema = Self::build(key_shape, fields);
        if schema.by_name.len() != schema.fields.len() {
            return Err(Status::InvalidArgument);
        }
        Ok(schema)
    }

    fn build(key_shape: KeyShape, fields: Vec<FieldDef>) -> Self {
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(idx, def)| (def.name.clone(), idx))
            .collect();
        let id = fingerprint(key_shape, &fields);
        Self {
            id,
            key_shape,
            fields,
            by_name,
        }
    }

    /// Stable schema identifier, stored in every encoded record.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Key shape this schema echoes.
    #[inline]
    pub fn key_shape(&self) -> KeyShape {
        self.key_shape
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false: a schema has at least the key-echo field.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field definitions in order.
    #[inline]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Field definition at `index`.
    #[inline]
    pub fn field(&self, index: usize) -> Option<&FieldDef> {
        self.fields.get(index)
    }

    /// Index of the field called `name`.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Check that `record` has this schema's field count and types.
    pub fn validate(&self, record: &Record) -> Result<(), Status> {
        if record.len() != self.fields.len() {
            return Err(Status::InvalidArgument);
        }
        let types_match = self
            .fields
            .iter()
            .zip(record.fields())
            .all(|(def, value)| def.field_type == value.field_type());
        if types_match {
            Ok(())
        } else {
            Err(Status::InvalidArgument)
        }
    }
}

#[inline]
fn key_echo_type(key_shape: KeyShape) -> FieldType {
    match key_shape {
        KeyShape::Integer => FieldType::Int,
        KeyShape::Text => FieldType::Text,
    }
}

fn fingerprint(key_shape: KeyShape, fields: &[FieldDef]) -> u32 {
    let mut descriptor = String::from(key_shape.as_str());
    for def in fields {
        descriptor.push(';');
        descriptor.push_str(&def.name);
        descriptor.push(':');
        descriptor.push_str(&def.field_type.to_string());
        descriptor.push(':');
        descriptor.push_str(def.role.as_str());
    }
    let h = hash64(descriptor.as_bytes());
    (h ^ (h >> 32)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::value::FieldValue;

    #[test]
    fn test_standard_layout() {
        let schema = RecordSchema::standard(KeyShape::Integer);
        assert_eq!(schema.len(), STANDARD_FIELD_COUNT);
        assert_eq!(schema.index_of(KEY_ECHO_FIELD), Some(0));
        assert_eq!(schema.index_of(KEY_TAG_FIELD), Some(32));
        assert_eq!(schema.index_of("field64"), Some(63));
        assert_eq!(schema.index_of("field65"), None);

        let echo = schema.field(0).unwrap();
        assert_eq!(echo.role(), FieldRole::KeyEcho);
        assert_eq!(echo.field_type(), FieldType::Int);

        assert_eq!(schema.field(1).unwrap().field_type(), FieldType::Int);
        assert_eq!(schema.field(2).unwrap().field_type(), FieldType::Text);
        assert_eq!(schema.field(32).unwrap().role(), FieldRole::KeyTag);
    }

    #[test]
    fn test_text_key_echo_type() {
        let schema = RecordSchema::standard(KeyShape::Text);
        assert_eq!(schema.field(0).unwrap().field_type(), FieldType::Text);
    }

    #[test]
    fn test_schema_id_depends_on_shape() {
        let a = RecordSchema::standard(KeyShape::Integer);
        let b = RecordSchema::standard(KeyShape::Integer);
        let c = RecordSchema::standard(KeyShape::Text);
        let d = RecordSchema::with_field_count(KeyShape::Integer, 8);
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_ne!(a.id(), d.id());
    }

    #[test]
    fn test_with_field_count_minimum() {
        let schema = RecordSchema::with_field_count(KeyShape::Integer, 0);
        assert_eq!(schema.len(), 1);
        assert!(!schema.is_empty());
    }

    #[test]
    fn test_from_fields_rejects_bad_layouts() {
        let echo = FieldDef::new("id", FieldType::Int, FieldRole::KeyEcho);
        let filler = FieldDef::new("a", FieldType::Text, FieldRole::Filler);

        assert!(RecordSchema::from_fields(KeyShape::Integer, vec![]).is_err());
        assert!(RecordSchema::from_fields(KeyShape::Text, vec![echo.clone()]).is_err());
        assert!(
            RecordSchema::from_fields(KeyShape::Integer, vec![filler.clone(), echo.clone()])
                .is_err()
        );
        assert!(RecordSchema::from_fields(
            KeyShape::Integer,
            vec![echo.clone(), filler.clone(), filler.clone()]
        )
        .is_err());
        assert!(RecordSchema::from_fields(
            KeyShape::Integer,
            vec![
                echo.clone(),
                FieldDef::new("tag", FieldType::Int, FieldRole::KeyTag)
            ]
        )
        .is_err());

        let schema = RecordSchema::from_fields(KeyShape::Integer, vec![echo, filler]).unwrap();
        assert_eq!(schema.index_of("a"), Some(1));
    }

    #[test]
    fn test_validate_record() {
        let schema = RecordSchema::with_field_count(KeyShape::Integer, 3);
        let good = Record::from_fields(vec![
            FieldValue::Int(1),
            FieldValue::Int(2),
            FieldValue::from("x"),
        ]);
        assert!(schema.validate(&good).is_ok());

        let wrong_type = Record::from_fields(vec![
            FieldValue::from("1"),
            FieldValue::Int(2),
            FieldValue::from("x"),
        ]);
        assert_eq!(schema.validate(&wrong_type), Err(Status::InvalidArgument));

        let short = Record::from_fields(vec![FieldValue::Int(1)]);
        assert_eq!(schema.validate(&short), Err(Status::InvalidArgument));
    }
}
