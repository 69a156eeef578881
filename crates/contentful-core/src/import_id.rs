//! Colon-delimited import identifiers.
//!
//! Every resource declares the ordered list of segments its import id is made
//! of, e.g. `localeId:environment:spaceId`. One parser handles all of them so
//! error messages are uniform and always name the expected format.

use crate::error::{ContentfulError, Result};

const SEPARATOR: char = ':';

/// Ordered segment names accepted by a resource's import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportFormat {
    resource_type: &'static str,
    fields: &'static [&'static str],
}

impl ImportFormat {
    pub const fn new(resource_type: &'static str, fields: &'static [&'static str]) -> Self {
        Self {
            resource_type,
            fields,
        }
    }

    pub fn resource_type(&self) -> &'static str {
        self.resource_type
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// The human readable format, e.g. `webhookId:spaceId`.
    pub fn pattern(&self) -> String {
        self.fields.join(":")
    }

    /// Splits `raw` into exactly `fields().len()` non-empty segments.
    pub fn parse(&self, raw: &str) -> Result<ImportId> {
        let segments: Vec<&str> = raw.split(SEPARATOR).collect();
        if segments.len() != self.fields.len() {
            return Err(self.malformed(
                raw,
                format!(
                    "expected {} segment(s) separated by ':', found {}",
                    self.fields.len(),
                    segments.len()
                ),
            ));
        }

        if let Some(pos) = segments.iter().position(|s| s.trim().is_empty()) {
            return Err(self.malformed(raw, format!("segment {} is empty", self.fields[pos])));
        }

        Ok(ImportId {
            fields: self.fields,
            values: segments.into_iter().map(str::to_string).collect(),
        })
    }

    fn malformed(&self, raw: &str, reason: String) -> ContentfulError {
        ContentfulError::MalformedImportId {
            resource_type: self.resource_type.to_string(),
            id: raw.to_string(),
            format: self.pattern(),
            reason,
        }
    }
}

/// A parsed import id. Segments are looked up by the names of their format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportId {
    fields: &'static [&'static str],
    values: Vec<String>,
}

impl ImportId {
    /// Returns the segment called `field`.
    ///
    /// # Panics
    ///
    /// Panics if `field` is not part of the format the id was parsed with;
    /// that is a programming error in the calling resource.
    pub fn get(&self, field: &str) -> &str {
        let pos = self
            .fields
            .iter()
            .position(|f| *f == field)
            .unwrap_or_else(|| panic!("import format has no segment named {field}"));
        &self.values[pos]
    }

    pub fn segments(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }
}
