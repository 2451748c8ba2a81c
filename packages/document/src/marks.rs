//! # Inline Marks
//!
//! Rich text is stored as inline markup. Marks are toggled across the whole
//! text of a block: text already wrapped entirely in a mark is unwrapped,
//! anything else gets wrapped.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mark", rename_all = "lowercase")]
pub enum InlineMark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Marker,
    Link { href: String },
}

impl InlineMark {
    fn tag_name(&self) -> &'static str {
        match self {
            InlineMark::Bold => "b",
            InlineMark::Italic => "i",
            InlineMark::Underline => "u",
            InlineMark::Strike => "s",
            InlineMark::Code => "code",
            InlineMark::Marker => "mark",
            InlineMark::Link { .. } => "a",
        }
    }

    fn open_tag(&self) -> String {
        match self {
            InlineMark::Link { href } => format!("<a href=\"{}\">", escape_attribute(href)),
            other => format!("<{}>", other.tag_name()),
        }
    }

    fn close_tag(&self) -> String {
        format!("</{}>", self.tag_name())
    }

    /// Length of the opening tag at the start of `text`, if it opens this mark.
    /// Any link counts as a link mark regardless of its target.
    fn opening_len(&self, text: &str) -> Option<usize> {
        let name = self.tag_name();
        let rest = text.strip_prefix('<')?.strip_prefix(name)?;
        match rest.chars().next()? {
            '>' => Some(name.len() + 2),
            ' ' if matches!(self, InlineMark::Link { .. }) => {
                rest.find('>').map(|end| name.len() + 2 + end)
            }
            _ => None,
        }
    }

    /// Whether the whole of `text` is wrapped in this mark
    pub fn is_applied(&self, text: &str) -> bool {
        self.unwrap_inner(text).is_some()
    }

    fn unwrap_inner<'a>(&self, text: &'a str) -> Option<&'a str> {
        let open_len = self.opening_len(text)?;
        let close = self.close_tag();
        let inner = text.get(open_len..)?.strip_suffix(close.as_str())?;

        // `<b>a</b> and <b>b</b>` starts and ends with the mark but is not one span
        let mut depth: i64 = 0;
        let mut rest = inner;
        while let Some(pos) = rest.find('<') {
            let candidate = &rest[pos..];
            if candidate.starts_with(close.as_str()) {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            } else if self.opening_len(candidate).is_some() {
                depth += 1;
            }
            rest = &candidate[1..];
        }

        (depth == 0).then_some(inner)
    }

    /// Wrap or unwrap `text` in this mark
    pub fn toggle(&self, text: &str) -> String {
        match self.unwrap_inner(text) {
            Some(inner) => inner.to_string(),
            None => format!("{}{}{}", self.open_tag(), text, self.close_tag()),
        }
    }

    /// Wrap `text` unless it already carries this mark
    pub fn apply(&self, text: &str) -> String {
        if self.is_applied(text) {
            text.to_string()
        } else {
            format!("{}{}{}", self.open_tag(), text, self.close_tag())
        }
    }

    /// Unwrap `text` if it carries this mark
    pub fn remove(&self, text: &str) -> String {
        self.unwrap_inner(text).unwrap_or(text).to_string()
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_wraps_and_unwraps() {
        let bold = InlineMark::Bold;
        let wrapped = bold.toggle("Hello");
        assert_eq!(wrapped, "<b>Hello</b>");
        assert_eq!(bold.toggle(&wrapped), "Hello");
    }

    #[test]
    fn test_separate_spans_are_not_one_mark() {
        let bold = InlineMark::Bold;
        let text = "<b>a</b> and <b>b</b>";
        assert!(!bold.is_applied(text));
        assert_eq!(bold.toggle(text), "<b><b>a</b> and <b>b</b></b>");
    }

    #[test]
    fn test_nested_same_mark_is_balanced() {
        let italic = InlineMark::Italic;
        assert!(italic.is_applied("<i>a <i>b</i> c</i>"));
    }

    #[test]
    fn test_link_toggle_escapes_href() {
        let link = InlineMark::Link {
            href: "https://x.dev/?a=1&b=\"2\"".to_string(),
        };
        let wrapped = link.toggle("site");
        assert_eq!(
            wrapped,
            "<a href=\"https://x.dev/?a=1&amp;b=&quot;2&quot;\">site</a>"
        );

        // Removing a link does not care which target it had
        let other = InlineMark::Link {
            href: "https://elsewhere".to_string(),
        };
        assert_eq!(other.toggle(&wrapped), "site");
    }

    #[test]
    fn test_bold_does_not_match_other_b_tags() {
        let bold = InlineMark::Bold;
        assert!(!bold.is_applied("<br>line</b>"));
    }

    #[test]
    fn test_mark_serialization() {
        let json = serde_json::to_string(&InlineMark::Link {
            href: "https://a".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"mark":"link","href":"https://a"}"#);

        let mark: InlineMark = serde_json::from_str(r#"{"mark":"bold"}"#).unwrap();
        assert_eq!(mark, InlineMark::Bold);
    }
}
