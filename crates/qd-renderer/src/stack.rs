//! Open-format stack transitions.
//!
//! [`transition`] computes, for one run, the markup needed to move from the
//! formats currently open to the formats the run carries:
//!
//! 1. Close pass, innermost first. Formats that do not continue on the run
//!    close. Wrapper formats close in place through
//!    [`Wrapper::post_wrap`](crate::Wrapper::post_wrap). A generic format
//!    that is not innermost first closes the generic formats inside it and
//!    records them for reopening.
//! 2. Temporarily closed formats and the run's new formats are appended in
//!    canonical order (see [`canonical_order`]) and rendered.
//! 3. The run's text follows.
//!
//! The function is pure: the caller owns the stack and the output buffer.

use std::cmp::Ordering;

use crate::escape::escape_html;
use crate::format::{Format, Place};
use crate::run::Run;

/// One piece of renderer output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment {
    /// Generic opening tag (`<em>`, `<span class="x">`).
    Open(String),
    /// Generic closing tag (`</em>`, `</span>`).
    Close(String),
    /// Non-empty markup from a wrapper's `pre_wrap`.
    Wrap(String),
    /// Non-empty markup from a wrapper's `post_wrap`.
    Unwrap(String),
    /// Literal run text, unescaped.
    Text(String),
}

impl Fragment {
    /// Whether this fragment opens generic markup.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// Whether this fragment closes generic markup.
    #[must_use]
    pub fn is_close(&self) -> bool {
        matches!(self, Self::Close(_))
    }

    /// Raw fragment content.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open(s) | Self::Close(s) | Self::Wrap(s) | Self::Unwrap(s) | Self::Text(s) => s,
        }
    }
}

/// Result of advancing the open stack over one run.
#[derive(Debug)]
pub struct Transition {
    /// Open stack after the run, in nesting order.
    pub open: Vec<Format>,
    /// Output produced for the run.
    pub fragments: Vec<Fragment>,
}

/// Canonical rendering order for formats opened together.
///
/// Wrapper formats come first and keep their relative order (the sort is
/// stable and all wrappers compare equal). Generic formats follow, ordered
/// by place (`Tag`, `Class`, `Style`) and then by value.
pub fn canonical_order(a: &Format, b: &Format) -> Ordering {
    match (a.is_wrapper(), b.is_wrapper()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a
            .place()
            .cmp(&b.place())
            .then_with(|| a.value().cmp(b.value())),
    }
}

/// Advance the open stack `open` over `run`.
pub fn transition(open: &[Format], run: &Run) -> Transition {
    let mut stack = open.to_vec();
    let mut fragments = Vec::new();

    let reopen = close_stale(&mut stack, run, &mut fragments);

    let mut opening = reopen;
    for format in run.formats() {
        if !format.place().is_inline() {
            tracing::debug!(
                place = %format.place(),
                value = format.value(),
                "Dropping non-inline format"
            );
            continue;
        }
        if stack.contains(format) || opening.contains(format) {
            continue;
        }
        opening.push(format.clone());
    }
    open_all(&mut stack, opening, &mut fragments);

    if !run.text().is_empty() {
        fragments.push(Fragment::Text(run.text().to_owned()));
    }

    Transition {
        open: stack,
        fragments,
    }
}

/// Close every format in `open`, innermost first.
///
/// Used at end of stream. Wrappers receive an empty run as the triggering
/// run.
pub fn flush(open: &[Format]) -> Vec<Fragment> {
    let mut stack = open.to_vec();
    let mut fragments = Vec::with_capacity(stack.len());
    let end = Run::empty();

    while let Some(top) = stack.last() {
        let fragment = match top.wrapper() {
            Some(wrapper) => unwrap_fragment(wrapper.post_wrap(&stack, &end)),
            None => close_fragment(top),
        };
        fragments.extend(fragment);
        stack.pop();
    }

    fragments
}

/// Close pass. Returns the formats closed only to reach a deeper one.
fn close_stale(
    stack: &mut Vec<Format>,
    run: &Run,
    fragments: &mut Vec<Fragment>,
) -> Vec<Format> {
    let mut reopen = Vec::new();
    let mut i = stack.len();

    while i > 0 {
        i -= 1;
        if stack[i].continues_on(run) {
            continue;
        }

        // Wrappers frame the remaining structure and close where they are.
        let post = {
            let current: &[Format] = stack;
            current[i]
                .wrapper()
                .map(|wrapper| wrapper.post_wrap(current, run))
        };
        if let Some(markup) = post {
            stack.remove(i);
            fragments.extend(unwrap_fragment(markup));
            continue;
        }

        // Every generic format above `i` continues on `run`: the stale ones
        // were closed on earlier iterations. Wrappers stay where they are.
        let mut j = stack.len();
        while j > i + 1 {
            j -= 1;
            if stack[j].is_wrapper() {
                continue;
            }
            let inner = stack.remove(j);
            fragments.extend(close_fragment(&inner));
            reopen.push(inner);
        }

        let stale = stack.remove(i);
        fragments.extend(close_fragment(&stale));
    }

    if !reopen.is_empty() {
        tracing::trace!(count = reopen.len(), "Re-nesting temporarily closed formats");
    }

    reopen
}

/// Append `opening` to the stack in canonical order and render it.
fn open_all(
    stack: &mut Vec<Format>,
    mut opening: Vec<Format>,
    fragments: &mut Vec<Fragment>,
) {
    opening.sort_by(canonical_order);

    let start = stack.len();
    stack.extend(opening);

    let stack: &[Format] = stack;
    for format in &stack[start..] {
        let fragment = match format.wrapper() {
            Some(wrapper) => wrap_fragment(wrapper.pre_wrap(stack)),
            None => open_fragment(format),
        };
        fragments.extend(fragment);
    }
}

/// Generic opening markup for a format.
fn open_fragment(format: &Format) -> Option<Fragment> {
    let markup = match format.place() {
        Place::Tag => format!("<{}>", format.value()),
        Place::Class => format!(r#"<span class="{}">"#, escape_html(format.value())),
        Place::Style => format!(r#"<span style="{}">"#, escape_html(format.value())),
        Place::Block => return None,
    };
    Some(Fragment::Open(markup))
}

/// Generic closing markup for a format.
fn close_fragment(format: &Format) -> Option<Fragment> {
    match format.place() {
        Place::Tag => Some(Fragment::Close(format!("</{}>", format.value()))),
        Place::Class | Place::Style => Some(Fragment::Close("</span>".to_owned())),
        Place::Block => None,
    }
}

fn wrap_fragment(markup: String) -> Option<Fragment> {
    (!markup.is_empty()).then_some(Fragment::Wrap(markup))
}

fn unwrap_fragment(markup: String) -> Option<Fragment> {
    (!markup.is_empty()).then_some(Fragment::Unwrap(markup))
}
