//! The projection parameter set: an immutable, insertion-ordered list of
//! named values with case-insensitive lookup by primary or alternate name.
//!
//! Insertion order is preserved independently of the lookup normalization,
//! so a parameter list round-trips through WKT exactly as written.

use crate::authoring::*;

#[derive(Clone, Debug, Default)]
pub struct ParameterSet {
    items: Vec<(String, f64)>,
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
}

impl ParameterSet {
    #[must_use]
    pub fn new() -> ParameterSet {
        ParameterSet { items: Vec::new() }
    }

    /// Build from (name, value) pairs. A later duplicate of a
    /// case-insensitively equal name replaces the earlier value in place
    pub fn from_pairs<I, S>(pairs: I) -> ParameterSet
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut set = ParameterSet::new();
        for (name, value) in pairs {
            set.insert(name.into(), value);
        }
        set
    }

    fn insert(&mut self, name: String, value: f64) {
        let key = normalize(&name);
        if let Some(item) = self.items.iter_mut().find(|(n, _)| normalize(n) == key) {
            item.1 = value;
        } else {
            self.items.push((name, value));
        }
    }

    /// A copy of this set with one parameter added or replaced
    #[must_use]
    pub fn with(&self, name: &str, value: f64) -> ParameterSet {
        let mut set = self.clone();
        set.insert(name.to_string(), value);
        set
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.items.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Case-insensitive lookup by a single name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        let key = normalize(name);
        self.items
            .iter()
            .find(|(n, _)| normalize(n) == key)
            .map(|(_, v)| *v)
    }

    /// Mandatory parameter: the primary name or any alternate must be
    /// present, otherwise construction fails
    pub fn value(&self, name: &str, alternates: &[&str]) -> Result<f64, Error> {
        if let Some(v) = self.get(name) {
            return Ok(v);
        }
        for alt in alternates {
            if let Some(v) = self.get(alt) {
                return Ok(v);
            }
        }
        Err(Error::MissingParam(name.to_string()))
    }

    /// Optional parameter with a documented default
    #[must_use]
    pub fn optional(&self, name: &str, alternates: &[&str], default: f64) -> f64 {
        self.value(name, alternates).unwrap_or(default)
    }

    /// Value equality under name normalization, insertion order ignored
    #[must_use]
    pub fn equal_params(&self, other: &ParameterSet) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .all(|(name, value)| other.get(name) == Some(*value))
    }

    /// The `PARAMETER[...]` clauses, in insertion order
    #[must_use]
    pub fn wkt(&self) -> String {
        self.items
            .iter()
            .map(|(n, v)| format!("PARAMETER[\"{n}\", {v}]"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ----- T E S T S ---------------------------------------------------------------------
