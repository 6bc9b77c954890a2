//! Rows: the unit shipped to the time-series database.

use serde::Serialize;

/// A single scalar cell of a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// A named series carrying one or more value tuples.
///
/// The reporter always emits exactly one tuple per row per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Value>>,
}

impl Row {
    /// Build a single-sample row.
    pub fn single(name: impl Into<String>, columns: &[&str], sample: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values: vec![sample],
        }
    }

    /// Every tuple has one value per column.
    pub fn is_well_formed(&self) -> bool {
        self.values.iter().all(|v| v.len() == self.columns.len())
    }
}

/// Rows submitted to the remote client in one call.
pub type Batch = Vec<Row>;
