//! Ordered column mappings used as statement inputs.
//!
//! Both types keep insertion order, which is the order columns appear in the
//! generated SQL and the order their values are bound.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Column values for an insert or an update.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub values: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column value. A repeated column replaces the earlier value in place.
    pub fn with_value(mut self, column: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column.to_string(), value)),
        }
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(c, _)| c.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Column name to raw type declaration, e.g. `"id" => "INTEGER PRIMARY KEY"`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fields {
    pub columns: Vec<(String, String)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: &str, declaration: &str) -> Self {
        match self.columns.iter_mut().find(|(c, _)| c == name) {
            Some(slot) => slot.1 = declaration.to_string(),
            None => self.columns.push((name.to_string(), declaration.to_string())),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
