//! Comparison records and record sets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ParseError;

/// One comparison unit: two sections, their rules, and a note on how they relate.
///
/// Every field is optional. Absent fields are rendered as placeholders, never
/// treated as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Display label of the first section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_1_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_1_content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_1_rules: Option<String>,

    /// Display label of the second section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_2_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_2_content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_2_rules: Option<String>,

    /// Relation note (preferred source).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Relation note (fallback source).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Record {
    /// Build a record from one array element, tolerating any shape.
    ///
    /// Non-object elements give an empty record. Numbers and booleans are
    /// taken in their textual form; `null`, arrays, objects and empty
    /// strings count as absent.
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::default();
        };

        Self {
            section_1_id: text_field(fields, "section_1_id"),
            section_1_content: text_field(fields, "section_1_content"),
            section_1_rules: text_field(fields, "section_1_rules"),
            section_2_id: text_field(fields, "section_2_id"),
            section_2_content: text_field(fields, "section_2_content"),
            section_2_rules: text_field(fields, "section_2_rules"),
            reason: text_field(fields, "reason"),
            explanation: text_field(fields, "explanation"),
        }
    }

    /// The relation note: `reason` wins over `explanation` when both are set.
    pub fn relation_note(&self) -> Option<&str> {
        non_empty(&self.reason).or_else(|| non_empty(&self.explanation))
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Ordered records loaded from one comparison file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    /// Parse a comparison file. The top level must be a JSON array.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(raw).map_err(|e| ParseError::Syntax {
            message: e.to_string(),
        })?;

        match value {
            Value::Array(items) => Ok(Self {
                records: items.iter().map(Record::from_value).collect(),
            }),
            other => Err(ParseError::NotAnArray {
                found: json_kind(&other),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
