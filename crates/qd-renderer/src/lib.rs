//! Open-format stack renderer for attributed text runs.
//!
//! A document arrives as a sequence of [`Run`]s, each carrying text and the
//! [`Format`]s active for it. [`StackRenderer`] keeps the formats currently
//! open and, for every run, emits the minimal well-nested transition:
//! stale formats close (re-nesting inner formats when a non-innermost one
//! must end), new formats open in a canonical order, then the text follows.
//!
//! # Architecture
//!
//! - [`format`](Format): the format model. A [`Formatter`] decides whether a
//!   format continues on a run; a [`Wrapper`] renders custom markup for
//!   structural formats such as lists.
//! - [`transition`]: the pure per-run algorithm, returning the new stack and
//!   the emitted [`Fragment`]s.
//! - [`StackRenderer`]: applies transitions to an output buffer.
//! - [`Registry`]: maps Quill delta attributes to formats.
//! - [`render_delta`]: decodes delta JSON and renders it.
//!
//! # Example
//!
//! ```
//! use qd_renderer::{Registry, RenderOptions, render_delta};
//!
//! let delta = r#"[{"insert":"Hello "},{"insert":"world","attributes":{"bold":true}}]"#;
//! let result = render_delta(delta, &mut Registry::new(), &RenderOptions::default()).unwrap();
//! assert_eq!(result.html, "Hello <strong>world</strong>");
//! ```

mod delta;
mod escape;
mod format;
mod list;
mod registry;
mod renderer;
mod run;
mod stack;

pub use delta::{Decoded, DeltaError, decode, render_delta};
pub use escape::escape_html;
pub use format::{Format, Formatter, Place, Wrapper};
pub use list::{LIST_ATTRIBUTE, ListKind, list_formats};
pub use registry::{AttributeInfo, FormatRule, Registry};
pub use renderer::{RenderOptions, RenderResult, StackRenderer, render_runs};
pub use run::Run;
pub use stack::{Fragment, Transition, canonical_order, flush, transition};
