//! Benchmark keys, key spaces and canonical key encodings.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::codec::hash64;
use crate::record::FieldValue;

/// Prefix of text-shaped keys (`key_0`, `key_1`, ...).
pub const TEXT_KEY_PREFIX: &str = "key_";

/// Shape of the keys a store is populated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyShape {
    /// Integer keys `0..N`
    #[default]
    Integer,
    /// Text keys `"key_0".."key_{N-1}"`
    Text,
}

impl KeyShape {
    /// Parse a key shape name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "integer" | "int" | "long" => Some(Self::Integer),
            "text" | "string" | "str" => Some(Self::Text),
            _ => None,
        }
    }

    /// Canonical name of the shape.
    pub const fn as_str(&self) -> &'static str {
        match self {
            KeyShape::Integer => "integer",
            KeyShape::Text => "text",
        }
    }
}

impl FromStr for KeyShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown key shape: {s}"))
    }
}

impl fmt::Display for KeyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A benchmark key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    /// Integer key
    Int(u64),
    /// Text key
    Text(String),
}

impl Key {
    /// Shape of this key.
    #[inline]
    pub fn shape(&self) -> KeyShape {
        match self {
            Key::Int(_) => KeyShape::Integer,
            Key::Text(_) => KeyShape::Text,
        }
    }

    /// Value stored in the key-echo field of the record for this key.
    pub fn canonical_form(&self) -> FieldValue {
        match self {
            // Keys above i64::MAX saturate.
            Key::Int(i) => FieldValue::Int(i64::try_from(*i).unwrap_or(i64::MAX)),
            Key::Text(s) => FieldValue::Text(s.clone()),
        }
    }

    /// `key_<n>` tag carried by records regardless of key shape.
    pub fn tag(&self) -> String {
        match self {
            Key::Int(i) => format!("{TEXT_KEY_PREFIX}{i}"),
            Key::Text(s) => s.clone(),
        }
    }

    /// Stable 64-bit hash of the key, used for shard selection.
    #[inline]
    pub fn hash64(&self) -> u64 {
        match self {
            Key::Int(i) => hash64(&i.to_le_bytes()),
            Key::Text(s) => hash64(s.as_bytes()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Key {
    fn from(value: u64) -> Self {
        Key::Int(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Text(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Text(value)
    }
}

/// Map a population index to its key.
#[inline]
pub fn derive_key(shape: KeyShape, index: u64) -> Key {
    match shape {
        KeyShape::Integer => Key::Int(index),
        KeyShape::Text => Key::Text(format!("{TEXT_KEY_PREFIX}{index}")),
    }
}

/// The populated key space: `size` keys of a single shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpace {
    shape: KeyShape,
    size: u64,
}

impl KeySpace {
    /// Create a key space.
    pub const fn new(shape: KeyShape, size: u64) -> Self {
        Self { shape, size }
    }

    /// Key shape.
    #[inline]
    pub fn shape(&self) -> KeyShape {
        self.shape
    }

    /// Number of keys.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the key space holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Key at `index`.
    #[inline]
    pub fn key_at(&self, index: u64) -> Key {
        derive_key(self.shape, index)
    }

    /// Draw a uniformly random index as `|r| % size` for a random signed 64-bit `r`.
    ///
    /// An empty key space has no valid index; index 0 is returned so the lookup
    /// that follows reports the missing key.
    #[inline]
    pub fn pick_index<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if self.size == 0 {
            return 0;
        }
        rng.gen::<i64>().unsigned_abs() % self.size
    }

    /// Draw a uniformly random key.
    #[inline]
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Key {
        self.key_at(self.pick_index(rng))
    }

    /// Iterate over all keys in population order.
    pub fn keys(&self) -> impl Iterator<Item = Key> {
        let space = *self;
        (0..space.size).map(move |i| space.key_at(i))
    }
}
