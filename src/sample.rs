//! Groundwater samples and the column schema they share

use hashbrown::HashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use std::sync::Arc;

/// Name of the column holding the sampling location.
pub const LOCATION: &str = "Location";
/// Name of the column holding the sampling year.
pub const YEAR: &str = "Year";
/// Name of the column holding the longitude of the sampling location.
pub const LONGITUDE: &str = "Longitude";
/// Name of the column holding the latitude of the sampling location.
pub const LATITUDE: &str = "Latitude";

/// Columns written as the header of a data file that does not exist yet.
pub const DEFAULT_COLUMNS: [&str; 11] = [
    LOCATION, LONGITUDE, LATITUDE, YEAR, "As", "Fe", "U", "Pb", "Cd", "Ni", "Cr",
];

/// The ordered set of column names of a dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    headers: Vec<String>,
    /// Position of each header. The first occurrence wins for duplicated names.
    index: HashMap<String, usize>,
}

impl Schema {
    /// Returns a new Schema with the given column names, in order.
    pub fn new(headers: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (position, header) in headers.iter().enumerate() {
            index.entry(header.clone()).or_insert(position);
        }
        Self { headers, index }
    }

    /// Returns the schema used when a dataset is created from scratch.
    pub fn default_columns() -> Self {
        Self::new(DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns the position of a column, if the schema has it.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// A single groundwater measurement: one value per column of its schema.
///
/// Values are kept as the raw text found in the data file. Numeric interpretation happens where
/// the value is used.
#[derive(Clone, Debug)]
pub struct Sample {
    schema: Arc<Schema>,
    values: Vec<String>,
}

impl Sample {
    /// Returns a new Sample.
    ///
    /// Missing trailing values are padded with empty strings and surplus values are dropped, so
    /// that the sample always has exactly one value per column.
    pub fn new(schema: Arc<Schema>, mut values: Vec<String>) -> Self {
        values.resize(schema.len(), String::new());
        Self { schema, values }
    }

    /// Returns the raw value of a column, or `None` if the schema has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.schema
            .position(column)
            .map(|position| self.values[position].as_str())
    }

    pub fn location(&self) -> Option<&str> {
        self.get(LOCATION)
    }

    /// Returns the sampling year as an integer.
    ///
    /// Only the leading integer part is considered, so `2021.0` and `2021 (Q3)` are both 2021.
    pub fn year(&self) -> Option<i64> {
        self.get(YEAR).and_then(parse_leading_int)
    }

    /// Iterates over `(column, value)` pairs in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.schema
            .headers()
            .iter()
            .zip(&self.values)
            .map(|(header, value)| (header.as_str(), value.as_str()))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        self.fields().eq(other.fields())
    }
}

impl Serialize for Sample {
    /// Serialise as a map from column name to raw value, in schema order.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.fields() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Parse the optionally signed run of digits at the start of `raw`.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(raw.len(), |(i, _)| i);
    raw[..end].parse().ok()
}
