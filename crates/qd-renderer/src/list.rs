//! List wrappers.
//!
//! A `list` attribute resolves to two wrapper formats: a container
//! (`<ul>` / `<ol>`) that stays open across consecutive items of the same
//! kind, and an item (`<li>`) that closes at every block boundary.

use std::sync::Arc;

use crate::format::{Format, Formatter, Place, Wrapper};
use crate::run::Run;

/// Attribute carrying the list kind.
pub const LIST_ATTRIBUTE: &str = "list";

/// Kind of list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    /// Parse the `list` attribute value.
    #[must_use]
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "bullet" => Some(Self::Bullet),
            "ordered" => Some(Self::Ordered),
            _ => None,
        }
    }

    /// Attribute value for this kind.
    #[must_use]
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::Ordered => "ordered",
        }
    }

    /// Container element name.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Bullet => "ul",
            Self::Ordered => "ol",
        }
    }

    fn carried_by(self, run: &Run) -> bool {
        run.attribute(LIST_ATTRIBUTE) == Some(self.attribute())
    }
}

/// Container and item formats for a list of `kind`, container first.
#[must_use]
pub fn list_formats(kind: ListKind) -> Vec<Format> {
    vec![
        Format::new(Place::Tag, kind.tag(), Arc::new(ListContainer { kind })),
        Format::new(Place::Tag, "li", Arc::new(ListItem { kind })),
    ]
}

/// `<ul>` / `<ol>` wrapper, open for as long as runs stay in the list.
struct ListContainer {
    kind: ListKind,
}

impl Formatter for ListContainer {
    fn continues_on(&self, run: &Run) -> bool {
        self.kind.carried_by(run)
    }

    fn wrapper(&self) -> Option<&dyn Wrapper> {
        Some(self)
    }
}

impl Wrapper for ListContainer {
    fn pre_wrap(&self, _open: &[Format]) -> String {
        format!("<{}>", self.kind.tag())
    }

    fn post_wrap(&self, _open: &[Format], _run: &Run) -> String {
        format!("</{}>", self.kind.tag())
    }
}

/// `<li>` wrapper, one per block.
struct ListItem {
    kind: ListKind,
}

impl ListItem {
    /// Items only render inside a container of their kind.
    fn has_container(&self, open: &[Format]) -> bool {
        open.iter()
            .any(|f| f.is_wrapper() && f.place() == Place::Tag && f.value() == self.kind.tag())
    }
}

impl Formatter for ListItem {
    fn continues_on(&self, run: &Run) -> bool {
        self.kind.carried_by(run) && !run.starts_block()
    }

    fn wrapper(&self) -> Option<&dyn Wrapper> {
        Some(self)
    }
}

impl Wrapper for ListItem {
    fn pre_wrap(&self, open: &[Format]) -> String {
        if self.has_container(open) {
            "<li>".to_owned()
        } else {
            String::new()
        }
    }

    fn post_wrap(&self, open: &[Format], _run: &Run) -> String {
        if self.has_container(open) {
            "</li>".to_owned()
        } else {
            String::new()
        }
    }
}
