//! Named field patterns and text normalization.

use std::borrow::Cow;
use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::error::ConfigError;
use crate::models::config::FieldPatternConfig;
use crate::models::record::{FILE_NAME_COLUMN, FieldValue, STATUS_COLUMN, Schema};

lazy_static! {
    // Any run of spaces, tabs or line breaks
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapse every whitespace run into a single space so that patterns match
/// across line wraps.
pub fn normalize_whitespace(text: &str) -> Cow<'_, str> {
    WHITESPACE_RUN.replace_all(text, " ")
}

/// A named, compiled, case-insensitive pattern with exactly one capture
/// group.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    name: String,
    regex: Regex,
}

impl FieldPattern {
    /// Compile `pattern` for the field `name`.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if name == FILE_NAME_COLUMN || name == STATUS_COLUMN {
            return Err(ConfigError::ReservedName(name));
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| ConfigError::InvalidPattern {
                field: name.clone(),
                source,
            })?;

        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(ConfigError::CaptureGroups {
                field: name,
                found: groups,
            });
        }

        Ok(Self { name, regex })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// First capture group of the leftmost match in already normalized text.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Ordered, validated collection of field patterns.
///
/// Order defines the output column order.
#[derive(Debug, Clone)]
pub struct FieldPatterns {
    patterns: Vec<FieldPattern>,
}

impl FieldPatterns {
    /// Validate a list of compiled patterns: non-empty, unique names.
    pub fn new(patterns: Vec<FieldPattern>) -> Result<Self, ConfigError> {
        if patterns.is_empty() {
            return Err(ConfigError::NoPatterns);
        }

        let mut seen = HashSet::new();
        for pattern in &patterns {
            if !seen.insert(pattern.name()) {
                return Err(ConfigError::DuplicateName(pattern.name().to_string()));
            }
        }

        Ok(Self { patterns })
    }

    /// Compile patterns from configuration entries.
    pub fn from_config(fields: &[FieldPatternConfig]) -> Result<Self, ConfigError> {
        let patterns = fields
            .iter()
            .map(|f| FieldPattern::new(f.name.clone(), &f.pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(patterns)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Column schema for records produced with these patterns.
    pub fn schema(&self) -> Schema {
        Schema::new(self.patterns.iter().map(|p| p.name.clone()).collect())
    }

    /// Apply every pattern to `text`.
    ///
    /// Every field is present in the result, in pattern order, holding either
    /// the first capture group or `N/A`.
    pub fn extract(&self, text: &str) -> Vec<FieldValue> {
        let text = normalize_whitespace(text);

        self.patterns
            .iter()
            .map(|pattern| match pattern.capture(&text) {
                Some(value) => FieldValue::new(pattern.name(), value),
                None => FieldValue::not_available(pattern.name()),
            })
            .collect()
    }
}
