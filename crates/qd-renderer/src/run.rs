//! Input unit of the renderer: literal text plus its active formats.

use std::collections::HashMap;

use crate::format::Format;

/// One contiguous piece of text and the formats active for it.
///
/// Besides the resolved [`Format`] values, a run keeps the raw attribute
/// map and a block-start flag so that formatters can decide whether they
/// continue on it.
#[derive(Clone, Debug, Default)]
pub struct Run {
    text: String,
    attributes: HashMap<String, String>,
    formats: Vec<Format>,
    block_start: bool,
}

impl Run {
    /// Create a run with the given text and no formats.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A run with no text and no formats.
    ///
    /// Used as the triggering run when the stream ends.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set a raw attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a resolved format.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.formats.push(format);
        self
    }

    /// Add several resolved formats, keeping their order.
    #[must_use]
    pub fn with_formats(mut self, formats: impl IntoIterator<Item = Format>) -> Self {
        self.formats.extend(formats);
        self
    }

    /// Mark this run as the first run of a block (line).
    #[must_use]
    pub fn starting_block(mut self) -> Self {
        self.block_start = true;
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Raw value of the named attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Resolved formats in insertion order.
    #[must_use]
    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    /// Whether this run begins a new block.
    #[must_use]
    pub fn starts_block(&self) -> bool {
        self.block_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_is_plain() {
        let run = Run::new("hello");
        assert_eq!(run.text(), "hello");
        assert!(run.formats().is_empty());
        assert!(run.attributes().is_empty());
        assert!(!run.starts_block());
    }

    #[test]
    fn test_attributes() {
        let run = Run::new("x")
            .with_attribute("bold", "true")
            .with_attribute("color", "#f00");
        assert_eq!(run.attribute("bold"), Some("true"));
        assert_eq!(run.attribute("color"), Some("#f00"));
        assert_eq!(run.attribute("italic"), None);
    }

    #[test]
    fn test_empty_run() {
        let run = Run::empty().starting_block();
        assert_eq!(run.text(), "");
        assert!(run.starts_block());
    }
}
