//! Field extraction from document text.

mod patterns;

pub use patterns::{normalize_whitespace, FieldPattern, FieldPatterns};
