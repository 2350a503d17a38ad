//! Extraction record and schema models.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value stored for a field whose pattern did not match.
pub const NOT_AVAILABLE: &str = "N/A";

/// Column holding the document's file name.
pub const FILE_NAME_COLUMN: &str = "File Name";

/// Column holding the processing status.
pub const STATUS_COLUMN: &str = "Status";

/// Prefix of every failed status.
pub const ERROR_STATUS_PREFIX: &str = "Erro: ";

/// Outcome of processing a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    /// Text was extracted and at least one field matched.
    Completed,
    /// Processing failed; holds the error description.
    Failed(String),
}

impl RecordStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, RecordStatus::Completed)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Completed => f.write_str("Completed"),
            RecordStatus::Failed(reason) => write!(f, "{ERROR_STATUS_PREFIX}{reason}"),
        }
    }
}

/// One extracted field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    /// Field name.
    pub name: String,
    /// Captured text, or [`NOT_AVAILABLE`].
    pub value: String,
}

impl FieldValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Value used when the pattern did not match.
    pub fn not_available(name: impl Into<String>) -> Self {
        Self::new(name, NOT_AVAILABLE)
    }

    pub fn is_available(&self) -> bool {
        self.value != NOT_AVAILABLE
    }
}

/// Per-document result row.
///
/// Holds one value per configured field, in configuration order, followed by
/// the file name and status columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRecord {
    fields: Vec<FieldValue>,
    file_name: String,
    status: RecordStatus,
}

impl ExtractionRecord {
    /// Record for a successfully processed document.
    pub fn completed(fields: Vec<FieldValue>, file_name: impl Into<String>) -> Self {
        Self {
            fields,
            file_name: file_name.into(),
            status: RecordStatus::Completed,
        }
    }

    /// Fallback record: every field of `schema` set to [`NOT_AVAILABLE`].
    pub fn failed(schema: &Schema, file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            fields: schema
                .field_names()
                .iter()
                .map(FieldValue::not_available)
                .collect(),
            file_name: file_name.into(),
            status: RecordStatus::Failed(reason.into()),
        }
    }

    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn status(&self) -> &RecordStatus {
        &self.status
    }

    /// Look up a column value by name, including the two fixed columns.
    pub fn get(&self, column: &str) -> Option<String> {
        match column {
            FILE_NAME_COLUMN => Some(self.file_name.clone()),
            STATUS_COLUMN => Some(self.status.to_string()),
            _ => self
                .fields
                .iter()
                .find(|f| f.name == column)
                .map(|f| f.value.clone()),
        }
    }

    /// Column values in schema order: fields, file name, status.
    pub fn values(&self) -> Vec<String> {
        let mut values: Vec<String> = self.fields.iter().map(|f| f.value.clone()).collect();
        values.push(self.file_name.clone());
        values.push(self.status.to_string());
        values
    }

    /// Whether this record carries exactly the schema's fields, in order.
    pub fn matches_schema(&self, schema: &Schema) -> bool {
        self.fields.len() == schema.field_names().len()
            && self
                .fields
                .iter()
                .zip(schema.field_names())
                .all(|(field, name)| &field.name == name)
    }
}

impl Serialize for ExtractionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.serialize_entry(FILE_NAME_COLUMN, &self.file_name)?;
        map.serialize_entry(STATUS_COLUMN, &self.status.to_string())?;
        map.end()
    }
}

/// Ordered column list shared by every record of a batch and by the sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Configured field names, without the fixed columns.
    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// All columns: fields, then `File Name`, then `Status`.
    pub fn columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(String::as_str)
            .chain([FILE_NAME_COLUMN, STATUS_COLUMN])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        Schema::new(vec!["F1".to_string(), "F2".to_string()])
    }

    #[test]
    fn test_columns_order() {
        assert_eq!(schema().columns(), vec!["F1", "F2", "File Name", "Status"]);
    }

    #[test]
    fn test_failed_record_is_all_na() {
        let record = ExtractionRecord::failed(&schema(), "a.pdf", "boom");

        assert_eq!(record.values(), vec!["N/A", "N/A", "a.pdf", "Erro: boom"]);
        assert!(record.matches_schema(&schema()));
        assert!(!record.status().is_completed());
    }

    #[test]
    fn test_get_column() {
        let record = ExtractionRecord::completed(
            vec![FieldValue::new("F1", "42"), FieldValue::not_available("F2")],
            "a.pdf",
        );

        assert_eq!(record.get("F1").as_deref(), Some("42"));
        assert_eq!(record.get("F2").as_deref(), Some("N/A"));
        assert_eq!(record.get("Status").as_deref(), Some("Completed"));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_schema_mismatch() {
        let record = ExtractionRecord::completed(vec![FieldValue::new("F2", "x")], "a.pdf");
        assert!(!record.matches_schema(&schema()));
    }

    #[test]
    fn test_serialize_keeps_column_order() {
        let record = ExtractionRecord::completed(
            vec![FieldValue::new("F2", "b"), FieldValue::new("F1", "a")],
            "doc.pdf",
        );

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"F2":"b","F1":"a","File Name":"doc.pdf","Status":"Completed"}"#
        );
    }
}
