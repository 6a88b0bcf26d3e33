//! Run renderer writing markup into an output buffer.

use crate::escape::push_escaped;
use crate::format::Format;
use crate::run::Run;
use crate::stack::{Fragment, flush, transition};

/// Rendering options.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Escape special HTML characters in run text.
    pub escape_text: bool,
    /// Emit `"\n"` for line breaks between lines without block formats.
    pub line_breaks: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape_text: true,
            line_breaks: true,
        }
    }
}

/// Result of rendering a document.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML.
    pub html: String,
    /// Warnings generated while decoding (e.g., skipped embeds).
    pub warnings: Vec<String>,
}

/// Renders runs one at a time, keeping the stack of open formats.
///
/// One renderer processes exactly one document. Call [`advance`](Self::advance)
/// for every run in order, then [`finish`](Self::finish) to close whatever is
/// still open.
///
/// # Example
///
/// ```
/// use qd_renderer::{Registry, Run, StackRenderer};
///
/// let mut registry = Registry::new();
/// let formats = registry.resolve("bold", "true").unwrap_or_default();
/// let hello = Run::new("Hello")
///     .with_attribute("bold", "true")
///     .with_formats(formats);
///
/// let mut renderer = StackRenderer::new();
/// renderer.advance(&hello);
/// renderer.advance(&Run::new(" world"));
/// assert_eq!(renderer.finish(), "<strong>Hello</strong> world");
/// ```
pub struct StackRenderer {
    output: String,
    open: Vec<Format>,
    escape_text: bool,
}

impl StackRenderer {
    /// Create a renderer that escapes run text.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(1024),
            open: Vec::new(),
            escape_text: true,
        }
    }

    /// Create a renderer configured from `options`.
    #[must_use]
    pub fn with_options(options: &RenderOptions) -> Self {
        Self::new().with_text_escaping(options.escape_text)
    }

    /// Enable or disable HTML escaping of run text.
    #[must_use]
    pub fn with_text_escaping(mut self, enabled: bool) -> Self {
        self.escape_text = enabled;
        self
    }

    /// Render one run: close stale formats, open new ones, write the text.
    pub fn advance(&mut self, run: &Run) {
        let step = transition(&self.open, run);
        self.open = step.open;
        self.write(&step.fragments);
    }

    /// Formats currently open, in nesting order.
    #[must_use]
    pub fn open_formats(&self) -> &[Format] {
        &self.open
    }

    /// Output written so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Close every open format and return the output.
    #[must_use]
    pub fn finish(mut self) -> String {
        let fragments = flush(&self.open);
        self.open.clear();
        self.write(&fragments);
        self.output
    }

    fn write(&mut self, fragments: &[Fragment]) {
        for fragment in fragments {
            match fragment {
                Fragment::Text(text) if self.escape_text => push_escaped(&mut self.output, text),
                other => self.output.push_str(other.as_str()),
            }
        }
    }
}

impl Default for StackRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a complete sequence of runs with default options.
pub fn render_runs<'a>(runs: impl IntoIterator<Item = &'a Run>) -> String {
    let mut renderer = StackRenderer::new();
    for run in runs {
        renderer.advance(run);
    }
    renderer.finish()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::format::{Formatter, Place};

    struct Attr(&'static str);

    impl Formatter for Attr {
        fn continues_on(&self, run: &Run) -> bool {
            run.attribute(self.0).is_some()
        }
    }

    fn bold(text: &str) -> Run {
        Run::new(text)
            .with_attribute("bold", "true")
            .with_format(Format::new(Place::Tag, "strong", Arc::new(Attr("bold"))))
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_runs(&[] as &[Run]), "");
    }

    #[test]
    fn test_render_plain_and_bold() {
        let runs = [Run::new("a "), bold("b"), bold("c"), Run::new(" d")];
        assert_eq!(render_runs(&runs), "a <strong>bc</strong> d");
    }

    #[test]
    fn test_text_escaped_by_default() {
        assert_eq!(render_runs(&[bold("1 < 2")]), "<strong>1 &lt; 2</strong>");
    }

    #[test]
    fn test_text_escaping_disabled() {
        let mut renderer = StackRenderer::new().with_text_escaping(false);
        renderer.advance(&Run::new("<br>"));
        assert_eq!(renderer.finish(), "<br>");
    }

    #[test]
    fn test_with_options() {
        let options = RenderOptions {
            escape_text: false,
            ..RenderOptions::default()
        };
        let mut renderer = StackRenderer::with_options(&options);
        renderer.advance(&Run::new("&"));
        assert_eq!(renderer.finish(), "&");
    }

    #[test]
    fn test_open_formats_tracked_between_runs() {
        let mut renderer = StackRenderer::new();
        renderer.advance(&bold("x"));
        assert_eq!(renderer.open_formats().len(), 1);
        assert_eq!(renderer.output(), "<strong>x");
        renderer.advance(&Run::new("y"));
        assert!(renderer.open_formats().is_empty());
        assert_eq!(renderer.finish(), "<strong>x</strong>y");
    }

    #[test]
    fn test_finish_closes_open_formats() {
        let mut renderer = StackRenderer::default();
        renderer.advance(&bold("x"));
        assert_eq!(renderer.finish(), "<strong>x</strong>");
    }
}
