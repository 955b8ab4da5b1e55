//! Style maps keyed by camelCase property names.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Logical style properties (`fontSize` → `"2rem"`).
///
/// Values are opaque strings: nothing here validates CSS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StyleMap(BTreeMap<String, String>);

impl StyleMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Inline declaration list (`font-size: 2rem; color: red`).
    ///
    /// Empty values are skipped.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.iter() {
            if value.trim().is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push_str("; ");
            }
            out.push_str(&css_property_name(key));
            out.push_str(": ");
            out.push_str(value);
        }
        out
    }
}

impl<const N: usize> From<[(&str, &str); N]> for StyleMap {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for StyleMap {
    /// Accepts string, number and boolean values; nulls are dropped.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for (key, value) in raw.unwrap_or_default() {
            if let Some(value) = scalar_to_string(value) {
                map.insert(key, value);
            }
        }
        Ok(Self(map))
    }
}

/// Stringify a JSON scalar; null and containers yield `None`.
pub(crate) fn scalar_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Convert a camelCase property name to its CSS (kebab-case) form.
///
/// Vendor prefixes written with a leading capital (`WebkitTransform`) get
/// the leading dash CSS expects (`-webkit-transform`). Names that are
/// already kebab-case pass through.
pub fn css_property_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if prev_lower_or_digit || i == 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(c);
            prev_lower_or_digit = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
