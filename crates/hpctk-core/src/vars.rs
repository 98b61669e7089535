//! The variable mapping produced by toolkit preparation.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Environment variable name to value, remembering insertion order.
///
/// Rules either *set* a variable (replacing any previous value) or
/// *append* to it (read-then-concatenate); appends never discard what an
/// earlier rule wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Current value of `key`, or the empty string.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if self.values.insert(key.to_string(), value).is_none() {
            self.order.push(key.to_string());
        }
    }

    /// Append `fragment` to `key` separated by a single space. An absent
    /// or empty variable simply becomes `fragment`; an empty fragment
    /// leaves the variable unchanged (but ensures it exists).
    pub fn append(&mut self, key: &str, fragment: &str) {
        let fragment = fragment.trim();
        let current = self.get_or_empty(key);
        let value = match (current.is_empty(), fragment.is_empty()) {
            (_, true) => current.to_string(),
            (true, false) => fragment.to_string(),
            (false, false) => format!("{current} {fragment}"),
        };
        self.set(key, value);
    }

    /// Copy the value of `from` into `to`. Does nothing if `from` is unset.
    pub fn copy(&mut self, from: &str, to: &str) {
        if let Some(value) = self.get(from).map(str::to_string) {
            self.set(to, value);
        }
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|k| self.values.get(k).map(|v| (k.as_str(), v.as_str())))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Serialize for Vars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
