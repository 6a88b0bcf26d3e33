//! Format model: one formatting attribute instance and its capabilities.
//!
//! A [`Format`] pairs a [`Place`] and a value with a shared [`Formatter`].
//! The formatter answers whether a later run still carries the attribute;
//! formatters that also implement [`Wrapper`] produce their own open and
//! close markup instead of a generic tag.

use std::fmt;
use std::sync::Arc;

use crate::run::Run;

/// Category of a format.
///
/// Determines both the markup shape and the nesting precedence among
/// generic formats: `Tag` renders outermost, then `Class`, then `Style`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Place {
    /// Element-like format, rendered as `<value>` / `</value>`.
    Tag,
    /// Rendered as `<span class="value">` / `</span>`.
    Class,
    /// Rendered as `<span style="value">` / `</span>`.
    Style,
    /// Block-level format. Never rendered inline; dropped by the open stack.
    Block,
}

impl Place {
    /// Whether formats of this place produce inline markup.
    #[must_use]
    pub fn is_inline(self) -> bool {
        !matches!(self, Self::Block)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tag => "tag",
            Self::Class => "class",
            Self::Style => "style",
            Self::Block => "block",
        };
        f.write_str(name)
    }
}

/// Behavior attached to a format.
///
/// One formatter instance is shared by every run that uses the same
/// attribute value.
pub trait Formatter: Send + Sync {
    /// Whether `run` still carries this attribute.
    ///
    /// This is the only test used to decide whether an open format must
    /// close before `run` is rendered.
    fn continues_on(&self, run: &Run) -> bool;

    /// Wrapper capability, if this formatter renders its own markup.
    ///
    /// Default returns `None`: the format renders as a generic tag.
    fn wrapper(&self) -> Option<&dyn Wrapper> {
        None
    }
}

/// Custom open/close markup for structural formats.
///
/// Formats with this capability are never rendered as a generic tag.
pub trait Wrapper: Send + Sync {
    /// Markup to emit when the format is opened.
    ///
    /// `open` is the full open stack, including the format itself.
    /// An empty string means "no markup this time".
    fn pre_wrap(&self, open: &[Format]) -> String;

    /// Markup to emit when the format closes.
    ///
    /// `open` is the open stack before removal and `run` is the run that
    /// caused the close (an empty run at end of stream).
    fn post_wrap(&self, open: &[Format], run: &Run) -> String;
}

/// One attribute instance applied to a run.
///
/// Two formats are equal when their place and value match, regardless of
/// which formatter instance they carry.
#[derive(Clone)]
pub struct Format {
    place: Place,
    value: String,
    formatter: Arc<dyn Formatter>,
}

impl Format {
    /// Create a format from its place, value and shared formatter.
    pub fn new(place: Place, value: impl Into<String>, formatter: Arc<dyn Formatter>) -> Self {
        Self {
            place,
            value: value.into(),
            formatter,
        }
    }

    /// Format category.
    #[must_use]
    pub fn place(&self) -> Place {
        self.place
    }

    /// Tag name, class name or style declaration.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether `run` still carries this format.
    #[must_use]
    pub fn continues_on(&self, run: &Run) -> bool {
        self.formatter.continues_on(run)
    }

    /// Wrapper capability of the underlying formatter.
    #[must_use]
    pub fn wrapper(&self) -> Option<&dyn Wrapper> {
        self.formatter.wrapper()
    }

    #[must_use]
    pub fn is_wrapper(&self) -> bool {
        self.wrapper().is_some()
    }
}

impl PartialEq for Format {
    fn eq(&self, other: &Self) -> bool {
        self.place == other.place && self.value == other.value
    }
}

impl Eq for Format {}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Format")
            .field("place", &self.place)
            .field("value", &self.value)
            .field("wrapper", &self.is_wrapper())
            .finish()
    }
}
