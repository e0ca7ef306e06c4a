//! Field metadata describing what a plugin samples

use serde::{Deserialize, Serialize};

/// Unit a field is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldUnit {
    /// Percentage (0.0 to 100.0)
    Percent,
    /// Byte count
    Byte,
    /// Bit count
    Bit,
    /// Plain number (events, cores...)
    Number,
    /// Seconds
    Seconds,
    /// Free text
    Text,
}

/// Metadata describing a single sampled field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Key used in snapshots and views
    pub id: String,
    /// Description of what this field represents
    pub description: String,
    /// Unit of the stored value
    pub unit: FieldUnit,
    /// The stored value is a counter delta that is shown per second
    #[serde(default)]
    pub rate: bool,
    /// Field may be elided from narrow layouts
    #[serde(default)]
    pub optional: bool,
    /// Label used when space is short
    #[serde(default)]
    pub short_name: Option<String>,
    /// Smallest auto-unit symbol to use when rendering (e.g. 'K')
    #[serde(default)]
    pub min_symbol: Option<char>,
}

impl FieldMetadata {
    /// Create a new field metadata
    pub fn new(id: impl Into<String>, description: impl Into<String>, unit: FieldUnit) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            unit,
            rate: false,
            optional: false,
            short_name: None,
            min_symbol: None,
        }
    }

    pub fn rate(mut self) -> Self {
        self.rate = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn short_name(mut self, name: impl Into<String>) -> Self {
        self.short_name = Some(name.into());
        self
    }

    pub fn min_symbol(mut self, symbol: char) -> Self {
        self.min_symbol = Some(symbol);
        self
    }

    /// Label to show in front of the value
    pub fn label(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_flags() {
        let field = FieldMetadata::new("soft_interrupts", "software interrupts", FieldUnit::Number)
            .rate()
            .optional()
            .short_name("sw_int")
            .min_symbol('K');

        assert!(field.rate);
        assert!(field.optional);
        assert_eq!(field.label(), "sw_int");
        assert_eq!(field.min_symbol, Some('K'));
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let field = FieldMetadata::new("user", "user time", FieldUnit::Percent);
        assert_eq!(field.label(), "user");
        assert!(!field.optional);
    }
}
