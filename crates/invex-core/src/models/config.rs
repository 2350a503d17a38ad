//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::extract::FieldPatterns;

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Input directory configuration.
    pub input: InputConfig,

    /// Fields to extract, in output column order.
    pub fields: Vec<FieldPatternConfig>,

    /// Spreadsheet output configuration.
    pub spreadsheet: SpreadsheetConfig,

    /// Database output configuration.
    pub database: DatabaseConfig,
}

impl Default for InvexConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            fields: default_fields(),
            spreadsheet: SpreadsheetConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

/// A named pattern as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPatternConfig {
    /// Field (and column) name.
    pub name: String,

    /// Regular expression with exactly one capture group. Matched
    /// case-insensitively.
    pub pattern: String,
}

impl FieldPatternConfig {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// Fields extracted when the configuration file names none.
pub fn default_fields() -> Vec<FieldPatternConfig> {
    vec![
        // Invoice number after "INVOICE #"
        FieldPatternConfig::new("Número da Fatura", r"INVOICE\s*#\s*(\d+)"),
        // dd/mm/yyyy after "DATE:"
        FieldPatternConfig::new("Data da Fatura", r"DATE[:\s]*(\d{2}/\d{2}/\d{4})"),
    ]
}

/// Where documents are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory scanned for documents (not recursive).
    pub directory: PathBuf,

    /// File name suffix selecting documents.
    pub extension: String,

    /// Match the suffix case-sensitively.
    pub case_sensitive_extension: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("pdf_directory"),
            extension: ".pdf".to_string(),
            case_sensitive_extension: true,
        }
    }
}

impl InputConfig {
    /// Input configuration for `directory` with default extension rules.
    pub fn for_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Whether a directory entry name selects a document.
    pub fn matches(&self, file_name: &str) -> bool {
        if self.case_sensitive_extension {
            file_name.ends_with(&self.extension)
        } else {
            file_name
                .to_lowercase()
                .ends_with(&self.extension.to_lowercase())
        }
    }
}

/// Spreadsheet sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadsheetConfig {
    /// Write the spreadsheet at all.
    pub enabled: bool,

    /// Directory receiving `Extracted_Data_<timestamp>.xlsx`.
    pub output_dir: PathBuf,

    /// Worksheet title.
    pub sheet_name: String,
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("."),
            sheet_name: "Extracted Data".to_string(),
        }
    }
}

/// Database sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Insert records at all.
    pub enabled: bool,

    /// SQLite database file.
    pub path: PathBuf,

    /// Target table.
    pub table: String,

    /// Create the table (one TEXT column per schema column) when missing.
    pub create_table: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("process_invoices.db"),
            table: "invoice_records".to_string(),
            create_table: true,
        }
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Compile and validate the configured field patterns.
    pub fn field_patterns(&self) -> Result<FieldPatterns, ConfigError> {
        FieldPatterns::from_config(&self.fields)
    }
}
