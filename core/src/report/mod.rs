//! Named groups of measurements rendered as a bordered block.

use crate::measurement::{Input, MeasuredValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered collection of named measurements.
///
/// Inserting assigns the entry name onto the value, so every rendered line
/// starts with the name it was filed under.
///
/// Serialized only for the backend's live updates; the shape is unstable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    title: String,
    entries: Vec<(String, MeasuredValue)>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: MeasuredValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Add an entry. An entry of the same name is replaced in place.
    pub fn insert(&mut self, name: impl Into<String>, mut value: MeasuredValue) {
        let name = name.into();
        value.set_name(name.clone());
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MeasuredValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MeasuredValue> {
        self.entries.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<MeasuredValue> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MeasuredValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry as an evaluator input, keyed by its name.
    pub fn inputs(&self) -> impl Iterator<Item = (&str, Input)> + '_ {
        self.iter().map(|(n, v)| (n, Input::from(v)))
    }

    pub fn render(&self) -> String {
        let mut out = format!("-----------{}---------------\n", self.title);
        for (_, value) in &self.entries {
            out.push_str(&format!(" {} \n", value.render()));
        }
        out.push_str("-----------------------------");
        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
