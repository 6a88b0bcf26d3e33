//! Quill delta decoding.
//!
//! Turns a document delta (`{"ops": [...]}` or a bare op array) into runs:
//!
//! - string inserts are split at `\n`; every text segment becomes a run with
//!   the op's inline attributes plus the block attributes of its line;
//! - block attributes (`list`, `align`, ...) are read from the op holding the
//!   newline that ends the line;
//! - the first run of each line starts a block;
//! - a line whose block formats include a wrapper (a list item) consumes
//!   its newline, any other line ends with a `"\n"` run when line breaks are
//!   enabled.
//!
//! Embeds and unknown attributes are skipped and reported as warnings.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::format::Format;
use crate::registry::Registry;
use crate::renderer::{RenderOptions, RenderResult, StackRenderer};
use crate::run::Run;

/// Delta decoding error.
#[derive(Debug, thiserror::Error)]
pub enum DeltaError {
    /// Input is not valid delta JSON.
    #[error("Invalid delta JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Op is a `retain` or `delete`, which only appear in change deltas.
    #[error("Op {index} is not an insert: only document deltas can be rendered")]
    NotADocument {
        /// Position of the op in the delta.
        index: usize,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Wrapped { ops: Vec<Op> },
    Bare(Vec<Op>),
}

impl Document {
    fn into_ops(self) -> Vec<Op> {
        match self {
            Self::Wrapped { ops } | Self::Bare(ops) => ops,
        }
    }
}

#[derive(Deserialize)]
struct Op {
    insert: Option<Value>,
    #[serde(default)]
    attributes: Map<String, Value>,
}

/// Runs decoded from a delta.
#[derive(Debug, Default)]
pub struct Decoded {
    /// Runs in document order, ready for [`StackRenderer::advance`].
    pub runs: Vec<Run>,
    /// Skipped embeds, unknown attributes and ignored attribute values.
    pub warnings: Vec<String>,
}

/// Text collected for the current line.
struct Segment {
    text: String,
    attributes: Vec<(String, String)>,
}

struct Decoder<'r> {
    registry: &'r mut Registry,
    line_breaks: bool,
    line: Vec<Segment>,
    decoded: Decoded,
    reported: HashSet<String>,
}

impl<'r> Decoder<'r> {
    fn new(registry: &'r mut Registry, options: &RenderOptions) -> Self {
        Self {
            registry,
            line_breaks: options.line_breaks,
            line: Vec::new(),
            decoded: Decoded::default(),
            reported: HashSet::new(),
        }
    }

    fn push_op(&mut self, index: usize, op: Op) -> Result<(), DeltaError> {
        let Some(insert) = op.insert else {
            return Err(DeltaError::NotADocument { index });
        };
        let Value::String(text) = insert else {
            tracing::warn!(index, "Skipping embed");
            self.warn(format!("Skipped unsupported embed at op {index}"));
            return Ok(());
        };

        let attributes = self.attribute_strings(index, &op.attributes);
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            self.push_text(first, &attributes);
        }
        for part in parts {
            self.end_line(&attributes, true);
            self.push_text(part, &attributes);
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str, attributes: &[(String, String)]) {
        if text.is_empty() {
            return;
        }
        let inline = attributes
            .iter()
            .filter(|(name, _)| !self.registry.is_block_attribute(name))
            .cloned()
            .collect();
        self.line.push(Segment {
            text: text.to_owned(),
            attributes: inline,
        });
    }

    /// Emit runs for the current line.
    ///
    /// `attributes` are those of the op holding the terminating newline;
    /// only its block attributes apply to the line.
    fn end_line(&mut self, attributes: &[(String, String)], newline: bool) {
        let block: Vec<(String, String)> = attributes
            .iter()
            .filter(|(name, _)| self.registry.is_block_attribute(name))
            .cloned()
            .collect();
        let block_formats: Vec<Format> = block
            .iter()
            .flat_map(|(name, value)| self.resolve(name, value))
            .collect();
        let wrapped = block_formats.iter().any(Format::is_wrapper);

        let segments = std::mem::take(&mut self.line);
        let mut block_start = true;
        for segment in segments {
            let run = self.line_run(&segment.text, &block, &block_formats, block_start);
            let run = self.with_inline(run, &segment.attributes);
            self.decoded.runs.push(run);
            block_start = false;
        }

        if !newline {
            return;
        }
        if wrapped {
            if block_start {
                // Empty line: the wrappers still need a run to open on.
                let run = self.line_run("", &block, &block_formats, true);
                self.decoded.runs.push(run);
            }
        } else if self.line_breaks {
            let run = self.line_run("\n", &block, &block_formats, block_start);
            self.decoded.runs.push(run);
        }
    }

    fn line_run(
        &self,
        text: &str,
        block: &[(String, String)],
        block_formats: &[Format],
        block_start: bool,
    ) -> Run {
        let mut run = Run::new(text).with_formats(block_formats.iter().cloned());
        for (name, value) in block {
            run = run.with_attribute(name.clone(), value.clone());
        }
        if block_start { run.starting_block() } else { run }
    }

    fn with_inline(&mut self, mut run: Run, attributes: &[(String, String)]) -> Run {
        for (name, value) in attributes {
            run = run
                .with_attribute(name.clone(), value.clone())
                .with_formats(self.resolve(name, value));
        }
        run
    }

    fn resolve(&mut self, name: &str, value: &str) -> Vec<Format> {
        if let Some(formats) = self.registry.resolve(name, value) {
            return formats;
        }
        tracing::debug!(attribute = name, value, "Unknown attribute");
        if self.reported.insert(name.to_owned()) {
            self.warn(format!("Unknown attribute '{name}' ignored"));
        }
        Vec::new()
    }

    /// Attribute values as strings. `null` removes an attribute.
    fn attribute_strings(
        &mut self,
        index: usize,
        attributes: &Map<String, Value>,
    ) -> Vec<(String, String)> {
        let mut result = Vec::with_capacity(attributes.len());
        for (name, value) in attributes {
            let value = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    self.warn(format!(
                        "Attribute '{name}' at op {index} has a structured value and was ignored"
                    ));
                    continue;
                }
            };
            result.push((name.clone(), value));
        }
        result
    }

    fn warn(&mut self, message: String) {
        self.decoded.warnings.push(message);
    }

    fn finish(mut self) -> Decoded {
        if !self.line.is_empty() {
            self.end_line(&[], false);
        }
        self.decoded
    }
}

/// Decode delta JSON into runs, resolving attributes through `registry`.
pub fn decode(
    json: &str,
    registry: &mut Registry,
    options: &RenderOptions,
) -> Result<Decoded, DeltaError> {
    let document: Document = serde_json::from_str(json)?;
    let mut decoder = Decoder::new(registry, options);
    for (index, op) in document.into_ops().into_iter().enumerate() {
        decoder.push_op(index, op)?;
    }
    Ok(decoder.finish())
}

/// Decode and render a delta document.
pub fn render_delta(
    json: &str,
    registry: &mut Registry,
    options: &RenderOptions,
) -> Result<RenderResult, DeltaError> {
    let decoded = decode(json, registry, options)?;

    let mut renderer = StackRenderer::with_options(options);
    for run in &decoded.runs {
        renderer.advance(run);
    }
    let html = renderer.finish();

    tracing::debug!(
        runs = decoded.runs.len(),
        warnings = decoded.warnings.len(),
        "Rendered delta"
    );

    Ok(RenderResult {
        html,
        warnings: decoded.warnings,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::format::Place;
    use crate::registry::FormatRule;

    fn render(json: &str) -> RenderResult {
        render_delta(json, &mut Registry::new(), &RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_plain_paragraph() {
        let result = render(r#"{"ops":[{"insert":"Hello\n"}]}"#);
        assert_eq!(result.html, "Hello\n");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_bare_op_array() {
        assert_eq!(render(r#"[{"insert":"Hi\n"}]"#).html, "Hi\n");
    }

    #[test]
    fn test_inline_bold() {
        let result = render(
            r#"[{"insert":"Hi "},{"insert":"there","attributes":{"bold":true}},{"insert":"\n"}]"#,
        );
        assert_eq!(result.html, "Hi <strong>there</strong>\n");
    }

    #[test]
    fn test_mixed_inline_formats_canonical_order() {
        let result = render(
            r##"[{"insert":"x","attributes":{"color":"#f00","italic":true,"font":"serif"}}]"##,
        );
        assert_eq!(
            result.html,
            r#"<em><span class="ql-font-serif"><span style="color:#f00">x</span></span></em>"#
        );
    }

    #[test]
    fn test_bullet_list() {
        let result = render(
            r#"[
                {"insert":"one"},{"insert":"\n","attributes":{"list":"bullet"}},
                {"insert":"two"},{"insert":"\n","attributes":{"list":"bullet"}}
            ]"#,
        );
        assert_eq!(result.html, "<ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn test_list_with_inline_formats_then_paragraph() {
        let result = render(
            r#"[
                {"insert":"a","attributes":{"bold":true}},
                {"insert":"\n","attributes":{"list":"ordered"}},
                {"insert":"b","attributes":{"bold":true}},
                {"insert":"\n","attributes":{"list":"ordered"}},
                {"insert":"after\n"}
            ]"#,
        );
        assert_eq!(
            result.html,
            "<ol><li><strong>a</strong></li><li><strong>b</strong></li></ol>after\n"
        );
    }

    #[test]
    fn test_empty_list_item() {
        let result = render(r#"[{"insert":"\n","attributes":{"list":"bullet"}}]"#);
        assert_eq!(result.html, "<ul><li></li></ul>");
    }

    #[test]
    fn test_aligned_line_keeps_line_break() {
        let result = render(
            r#"[{"insert":"x"},{"insert":"\n","attributes":{"align":"center"}},{"insert":"y\n"}]"#,
        );
        assert_eq!(result.html, "x\ny\n");
    }

    #[test]
    fn test_line_breaks_disabled() {
        let options = RenderOptions {
            line_breaks: false,
            ..RenderOptions::default()
        };
        let result = render_delta(r#"[{"insert":"a\nb\n"}]"#, &mut Registry::new(), &options)
            .unwrap();
        assert_eq!(result.html, "ab");
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(render(r#"[{"insert":"<b> & co"}]"#).html, "&lt;b&gt; &amp; co");
    }

    #[test]
    fn test_embed_skipped_with_warning() {
        let result = render(r#"[{"insert":{"image":"x.png"}},{"insert":"t\n"}]"#);
        assert_eq!(result.html, "t\n");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("embed"));
    }

    #[test]
    fn test_unknown_attribute_reported_once() {
        let result = render(
            r#"[{"insert":"a","attributes":{"sparkle":true}},{"insert":"b","attributes":{"sparkle":true}}]"#,
        );
        assert_eq!(result.html, "ab");
        assert_eq!(result.warnings, vec!["Unknown attribute 'sparkle' ignored".to_owned()]);
    }

    #[test]
    fn test_tag_rule_value_cannot_inject_markup() {
        let mut registry = Registry::new().with_rule("h", FormatRule::new(Place::Tag, "h{}"));
        let result = render_delta(
            r#"[{"insert":"x","attributes":{"h":"1 onclick=alert(1)"}}]"#,
            &mut registry,
            &RenderOptions::default(),
        )
        .unwrap();
        assert_eq!(result.html, "x");
        assert_eq!(result.warnings, vec!["Unknown attribute 'h' ignored".to_owned()]);
    }

    #[test]
    fn test_null_attribute_ignored() {
        let result = render(r#"[{"insert":"a","attributes":{"bold":null}}]"#);
        assert_eq!(result.html, "a");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_structured_attribute_value_reported() {
        let result = render(r#"[{"insert":"a","attributes":{"bold":{"x":1}}}]"#);
        assert_eq!(result.html, "a");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_retain_is_rejected() {
        let err = render_delta(
            r#"[{"insert":"a"},{"retain":3}]"#,
            &mut Registry::new(),
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DeltaError::NotADocument { index: 1 }));
    }

    #[test]
    fn test_invalid_json() {
        let err = decode("{", &mut Registry::new(), &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, DeltaError::Json(_)));
    }

    #[test]
    fn test_decoded_runs_mark_block_starts() {
        let decoded = decode(
            r#"[{"insert":"a"},{"insert":"b","attributes":{"italic":true}},{"insert":"\nc"}]"#,
            &mut Registry::new(),
            &RenderOptions::default(),
        )
        .unwrap();
        let shape: Vec<(&str, bool)> = decoded
            .runs
            .iter()
            .map(|run| (run.text(), run.starts_block()))
            .collect();
        assert_eq!(
            shape,
            vec![("a", true), ("b", false), ("\n", false), ("c", true)]
        );
        assert_eq!(decoded.runs[1].attribute("italic"), Some("true"));
    }

    #[test]
    fn test_empty_document() {
        let result = render(r#"{"ops":[]}"#);
        assert_eq!(result.html, "");
        assert!(result.warnings.is_empty());
    }
}
