//! HTML escaping for run text and attribute values.

/// Escape special HTML characters.
///
/// Used for literal run text and for the quoted `class` / `style`
/// attribute values of generic span formats.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    push_escaped(&mut result, s);
    result
}

/// Append `s` to `out`, escaping special HTML characters in place.
pub(crate) fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_escape_html_plain_text_unchanged() {
        assert_eq!(escape_html("color:red"), "color:red");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_push_escaped_appends() {
        let mut out = String::from("<b>");
        push_escaped(&mut out, "1 < 2");
        assert_eq!(out, "<b>1 &lt; 2");
    }
}
