// ============================================================
// CSV ROW TYPES
// ============================================================
// One parsed CSV record, keyed by header or positional

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single row returned by the CSV reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Row {
    /// Header name to value, iterating in header order.
    Keyed(IndexMap<String, String>),
    /// Raw values in column order.
    Positional(Vec<String>),
}

impl Row {
    /// Zip headers with values, stopping at the shorter of the two.
    ///
    /// A repeated header keeps its first position and takes the later value.
    pub fn keyed(headers: &[String], values: Vec<String>) -> Self {
        let map = headers
            .iter()
            .cloned()
            .zip(values)
            .collect::<IndexMap<_, _>>();
        Row::Keyed(map)
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Keyed(map) => map.len(),
            Row::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Field by header name. Always `None` for positional rows.
    pub fn get(&self, header: &str) -> Option<&str> {
        match self {
            Row::Keyed(map) => map.get(header).map(String::as_str),
            Row::Positional(_) => None,
        }
    }

    /// Field by column position, for either shape.
    pub fn get_index(&self, index: usize) -> Option<&str> {
        match self {
            Row::Keyed(map) => map.get_index(index).map(|(_, v)| v.as_str()),
            Row::Positional(values) => values.get(index).map(String::as_str),
        }
    }

    /// Values in column order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Row::Keyed(map) => map.values().map(String::as_str).collect(),
            Row::Positional(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn as_keyed(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Row::Keyed(map) => Some(map),
            Row::Positional(_) => None,
        }
    }

    pub fn as_positional(&self) -> Option<&[String]> {
        match self {
            Row::Keyed(_) => None,
            Row::Positional(values) => Some(values),
        }
    }
}

/// A row with every field kept as the bytes the parser produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawRow {
    Keyed(IndexMap<Vec<u8>, Vec<u8>>),
    Positional(Vec<Vec<u8>>),
}

impl RawRow {
    /// Same zipping rules as [`Row::keyed`].
    pub fn keyed(headers: &[Vec<u8>], values: Vec<Vec<u8>>) -> Self {
        RawRow::Keyed(headers.iter().cloned().zip(values).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            RawRow::Keyed(map) => map.len(),
            RawRow::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, header: &[u8]) -> Option<&[u8]> {
        match self {
            RawRow::Keyed(map) => map.get(header).map(Vec::as_slice),
            RawRow::Positional(_) => None,
        }
    }

    pub fn get_index(&self, index: usize) -> Option<&[u8]> {
        match self {
            RawRow::Keyed(map) => map.get_index(index).map(|(_, v)| v.as_slice()),
            RawRow::Positional(values) => values.get(index).map(Vec::as_slice),
        }
    }
}
