//! Ordered set of CSS class tokens.

use serde::{Deserialize, Deserializer, Serialize};

/// Class tokens in insertion order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse a whitespace-separated class attribute.
    pub fn parse(classes: &str) -> Self {
        classes.split_whitespace().collect()
    }

    /// Add a class. Returns false if it was already present or blank.
    pub fn add(&mut self, class: &str) -> bool {
        let class = class.trim();
        if class.is_empty() || self.contains(class) {
            return false;
        }
        self.0.push(class.to_string());
        true
    }

    /// Remove a class. Returns false if it was not present.
    pub fn remove(&mut self, class: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != class);
        self.0.len() != before
    }

    /// Add the class if absent, remove it if present.
    ///
    /// Returns true if the class is present afterwards.
    pub fn toggle(&mut self, class: &str) -> bool {
        let class = class.trim();
        if class.is_empty() {
            return false;
        }
        if self.remove(class) {
            false
        } else {
            self.0.push(class.to_string());
            true
        }
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Space-joined attribute value.
    pub fn to_attr(&self) -> String {
        self.0.join(" ")
    }
}

impl<'a> FromIterator<&'a str> for ClassList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut list = ClassList::new();
        for class in iter {
            list.add(class);
        }
        list
    }
}

impl FromIterator<String> for ClassList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut list = ClassList::new();
        for class in iter {
            list.add(&class);
        }
        list
    }
}

impl<'de> Deserialize<'de> for ClassList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}
