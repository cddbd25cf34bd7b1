//! Identifier map: original name → opaque name
//!
//! The map is the only state shared between a forward run and a later
//! reverse run, so it is also the on-disk hand-off format: a flat JSON object
//! of string pairs, written in insertion order.
//!
//! Keys are unique, values are unique, and no key is a reserved keyword.
//! [`IdentifierMap::insert`] enforces this on every write, and the document
//! reader goes through the same path, so a map that exists is a bijection.

use crate::parser::lexer::is_keyword;
use crate::transform::names::is_valid_identifier;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors raised while building or reading a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("malformed mapping document: {0}")]
    Malformed(String),

    #[error("original name '{0}' is mapped more than once")]
    DuplicateKey(String),

    #[error("opaque name '{value}' is assigned to both '{first}' and '{second}'")]
    DuplicateValue {
        value: String,
        first: String,
        second: String,
    },

    #[error("reserved keyword '{0}' cannot be renamed")]
    ReservedKeyword(String),

    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
}

/// Bijective original → opaque name table, insertion ordered.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    entries: Vec<(String, String)>,
    forward: FxHashMap<String, usize>,
    values: FxHashSet<String>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ordered pairs, validating every entry.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (original, opaque) in pairs {
            map.insert(original, opaque)?;
        }
        Ok(map)
    }

    /// Add a new pair. Fails rather than overwrite or alias an existing entry.
    pub fn insert(
        &mut self,
        original: impl Into<String>,
        opaque: impl Into<String>,
    ) -> Result<(), MappingError> {
        let original = original.into();
        let opaque = opaque.into();

        if is_keyword(&original) {
            return Err(MappingError::ReservedKeyword(original));
        }
        for name in [&original, &opaque] {
            if !is_valid_identifier(name) {
                return Err(MappingError::InvalidIdentifier(name.clone()));
            }
        }
        if self.forward.contains_key(&original) {
            return Err(MappingError::DuplicateKey(original));
        }
        if self.values.contains(&opaque) {
            let first = self
                .entries
                .iter()
                .find(|(_, v)| *v == opaque)
                .map(|(k, _)| k.clone())
                .unwrap_or_default();
            return Err(MappingError::DuplicateValue {
                value: opaque,
                first,
                second: original,
            });
        }

        self.forward.insert(original.clone(), self.entries.len());
        self.values.insert(opaque.clone());
        self.entries.push((original, opaque));
        Ok(())
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.forward
            .get(original)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains_key(&self, original: &str) -> bool {
        self.forward.contains_key(original)
    }

    pub fn contains_value(&self, opaque: &str) -> bool {
        self.values.contains(opaque)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Opaque → original index. Total over the map's values.
    pub fn inverse(&self) -> FxHashMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| (v.clone(), k.clone()))
            .collect()
    }

    /// Read a mapping document.
    pub fn from_json(text: &str) -> Result<Self, MappingError> {
        let OrderedPairs(pairs) = serde_json::from_str::<OrderedPairs>(text)
            .map_err(|e| MappingError::Malformed(e.to_string()))?;
        Self::from_pairs(pairs)
    }

    /// Write a mapping document (pretty-printed, insertion ordered).
    pub fn to_json(&self) -> String {
        // Serializing string pairs into a String cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_else(|_| String::from("{}"))
    }
}

impl PartialEq for IdentifierMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for IdentifierMap {}

impl Serialize for IdentifierMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (original, opaque) in &self.entries {
            map.serialize_entry(original, opaque)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for IdentifierMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let OrderedPairs(pairs) = OrderedPairs::deserialize(deserializer)?;
        IdentifierMap::from_pairs(pairs).map_err(de::Error::custom)
    }
}

/// Object entries in document order, duplicates kept for validation.
struct OrderedPairs(Vec<(String, String)>);

impl<'de> Deserialize<'de> for OrderedPairs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = OrderedPairs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a flat object of \"original\": \"opaque\" string pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    pairs.push((k, v));
                }
                Ok(OrderedPairs(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}
