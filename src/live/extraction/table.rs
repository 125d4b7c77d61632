//! The literal table: extracted values by key, in traversal order

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Ordered map from derived key to a JSON primitive
///
/// Serializes as a flat JSON object. `Display` writes the same compact JSON, which is the form
/// embedded in rendered programs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiteralTable(IndexMap<String, Value>);

impl LiteralTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Insert under `key`, replacing any previous value
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Insert under `key`, or under the first free `key_1`, `key_2`, ... if it is taken.
    /// Returns the key actually used.
    pub fn insert_unique(&mut self, key: String, value: Value) -> String {
        let mut candidate = key.clone();
        let mut count = 1;
        while self.0.contains_key(&candidate) {
            candidate = format!("{}_{}", key, count);
            count += 1;
        }
        self.0.insert(candidate.clone(), value);
        candidate
    }

    /// Overwrite entries with the values in `patch`, the way a running program applies an update
    pub fn apply(&mut self, patch: &LiteralTable) {
        for (key, value) in patch.iter() {
            self.0.insert(key.to_string(), value.clone());
        }
    }
}

impl fmt::Display for LiteralTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl FromIterator<(String, Value)> for LiteralTable {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
