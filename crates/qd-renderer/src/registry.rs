//! Registry mapping run attributes to formats.
//!
//! Built-in attributes follow the Quill delta vocabulary (`bold`, `color`,
//! `list`, ...). Custom rules registered with [`Registry::with_rule`]
//! override built-ins of the same name.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::format::{Format, Formatter, Place};
use crate::list::{LIST_ATTRIBUTE, ListKind, list_formats};
use crate::run::Run;

/// Built-in attributes with a short description of their rendering.
const BUILTIN_ATTRIBUTES: &[(&str, &str)] = &[
    ("bold", "tag <strong>"),
    ("italic", "tag <em>"),
    ("underline", "tag <u>"),
    ("strike", "tag <s>"),
    ("code", "tag <code>"),
    ("script", "tag <sub> or <sup>"),
    ("color", "style color:<value>"),
    ("background", "style background-color:<value>"),
    ("font", "class <prefix>font-<value>"),
    ("size", "class <prefix>size-<value>"),
    ("list", "wrappers <ul>/<ol> and <li>"),
    ("align", "block"),
    ("header", "block"),
    ("indent", "block"),
    ("blockquote", "block"),
    ("code-block", "block"),
    ("direction", "block"),
];

/// Attributes that apply to a whole line rather than a span of text.
const BLOCK_ATTRIBUTES: &[&str] = &[
    LIST_ATTRIBUTE,
    "align",
    "header",
    "indent",
    "blockquote",
    "code-block",
    "direction",
];

const DEFAULT_CLASS_PREFIX: &str = "ql-";

/// Custom attribute rendering rule.
///
/// The `template` becomes the format value with every `{}` replaced by the
/// attribute value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatRule {
    pub place: Place,
    pub template: String,
}

impl FormatRule {
    pub fn new(place: Place, template: impl Into<String>) -> Self {
        Self {
            place,
            template: template.into(),
        }
    }

    fn value_for(&self, value: &str) -> String {
        self.template.replace("{}", value)
    }
}

/// Registered attribute, for listings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: String,
    pub description: String,
    /// Whether the attribute comes from a custom rule.
    pub custom: bool,
}

/// Continuation test for attribute-backed formats.
///
/// Inline formats never continue across a block boundary, so each line
/// opens its own markup inside the line's wrappers.
struct AttrFormatter {
    name: String,
    expected: Expected,
}

enum Expected {
    /// Any value other than `false`.
    Enabled,
    Exact(String),
}

impl AttrFormatter {
    fn toggle(name: &str) -> Arc<dyn Formatter> {
        Arc::new(Self {
            name: name.to_owned(),
            expected: Expected::Enabled,
        })
    }

    fn exact(name: &str, value: &str) -> Arc<dyn Formatter> {
        Arc::new(Self {
            name: name.to_owned(),
            expected: Expected::Exact(value.to_owned()),
        })
    }
}

impl Formatter for AttrFormatter {
    fn continues_on(&self, run: &Run) -> bool {
        if run.starts_block() {
            return false;
        }
        match (run.attribute(&self.name), &self.expected) {
            (Some(value), Expected::Enabled) => value != "false",
            (Some(value), Expected::Exact(expected)) => value == expected,
            (None, _) => false,
        }
    }
}

/// Attribute to format registry.
///
/// Resolved formats are cached per `(attribute, value)` so every run using
/// the same attribute value shares one formatter.
pub struct Registry {
    class_prefix: String,
    rules: BTreeMap<String, FormatRule>,
    cache: HashMap<(String, String), Vec<Format>>,
}

impl Registry {
    /// Create a registry with the built-in attributes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            class_prefix: DEFAULT_CLASS_PREFIX.to_owned(),
            rules: BTreeMap::new(),
            cache: HashMap::new(),
        }
    }

    /// Set the prefix of built-in class names (`font`, `size`, `align`).
    #[must_use]
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self.cache.clear();
        self
    }

    /// Register a custom attribute rule.
    #[must_use]
    pub fn with_rule(mut self, name: impl Into<String>, rule: FormatRule) -> Self {
        let name = name.into();
        self.cache.retain(|(attr, _), _| *attr != name);
        self.rules.insert(name, rule);
        self
    }

    /// Whether `name` is a line-level attribute.
    ///
    /// Block attributes are taken from the newline that ends a line and
    /// applied to every run of that line.
    #[must_use]
    pub fn is_block_attribute(&self, name: &str) -> bool {
        !self.rules.contains_key(name) && BLOCK_ATTRIBUTES.contains(&name)
    }

    /// Resolve one attribute to its formats.
    ///
    /// Returns `None` for attributes (or attribute values) the registry
    /// doesn't know. A disabled toggle (`bold: false`) resolves to no
    /// formats.
    pub fn resolve(&mut self, name: &str, value: &str) -> Option<Vec<Format>> {
        let key = (name.to_owned(), value.to_owned());
        if let Some(formats) = self.cache.get(&key) {
            return Some(formats.clone());
        }

        let formats = match self.rules.get(name) {
            Some(rule) => resolve_rule(name, value, rule)?,
            None => self.resolve_builtin(name, value)?,
        };

        self.cache.insert(key, formats.clone());
        Some(formats)
    }

    /// All registered attributes, built-ins first, sorted by name within
    /// each group.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeInfo> {
        let mut builtins: Vec<AttributeInfo> = BUILTIN_ATTRIBUTES
            .iter()
            .filter(|(name, _)| !self.rules.contains_key(*name))
            .map(|(name, description)| AttributeInfo {
                name: (*name).to_owned(),
                description: description.replace("<prefix>", &self.class_prefix),
                custom: false,
            })
            .collect();
        builtins.sort_by(|a, b| a.name.cmp(&b.name));

        let custom = self.rules.iter().map(|(name, rule)| AttributeInfo {
            name: name.clone(),
            description: format!("{} {}", rule.place, rule.template.replace("{}", "<value>")),
            custom: true,
        });

        builtins.into_iter().chain(custom).collect()
    }

    fn resolve_builtin(&self, name: &str, value: &str) -> Option<Vec<Format>> {
        let prefix = &self.class_prefix;
        let format = match name {
            "bold" | "italic" | "underline" | "strike" | "code" => {
                if value == "false" {
                    return Some(Vec::new());
                }
                let tag = match name {
                    "bold" => "strong",
                    "italic" => "em",
                    "underline" => "u",
                    "strike" => "s",
                    _ => "code",
                };
                Format::new(Place::Tag, tag, AttrFormatter::toggle(name))
            }
            "script" => {
                let tag = match value {
                    "sub" => "sub",
                    "super" => "sup",
                    _ => return None,
                };
                Format::new(Place::Tag, tag, AttrFormatter::exact(name, value))
            }
            "color" => Format::new(
                Place::Style,
                format!("color:{value}"),
                AttrFormatter::exact(name, value),
            ),
            "background" => Format::new(
                Place::Style,
                format!("background-color:{value}"),
                AttrFormatter::exact(name, value),
            ),
            "font" | "size" => Format::new(
                Place::Class,
                format!("{prefix}{name}-{value}"),
                AttrFormatter::exact(name, value),
            ),
            LIST_ATTRIBUTE => return ListKind::from_attribute(value).map(list_formats),
            _ if BLOCK_ATTRIBUTES.contains(&name) => Format::new(
                Place::Block,
                format!("{prefix}{name}-{value}"),
                AttrFormatter::exact(name, value),
            ),
            _ => return None,
        };
        Some(vec![format])
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a custom rule. Tag rules only resolve to element names, since
/// tag values are written into markup unescaped.
fn resolve_rule(name: &str, value: &str, rule: &FormatRule) -> Option<Vec<Format>> {
    if value == "false" {
        return Some(Vec::new());
    }
    let format_value = rule.value_for(value);
    if rule.place == Place::Tag && !is_element_name(&format_value) {
        tracing::debug!(
            attribute = name,
            value = format_value.as_str(),
            "Rejecting tag rule value"
        );
        return None;
    }
    Some(vec![Format::new(
        rule.place,
        format_value,
        AttrFormatter::exact(name, value),
    )])
}

fn is_element_name(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
