//! # Post-Render Hooks
//!
//! Optional passes over rendered markup, run by the caller after
//! [`crate::render`]. Presentation lives here instead of in the document:
//! hooks may decorate markup but never see or change blocks.

use crate::error::CodecResult;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use tracing::debug;

/// Transformation applied to rendered markup
pub trait PostRenderHook: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, html: &str) -> String;
}

/// Ordered list of hooks; each sees the previous one's output
#[derive(Debug, Default)]
pub struct PostRenderChain {
    hooks: Vec<Box<dyn PostRenderHook>>,
}

impl PostRenderChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hook: impl PostRenderHook + 'static) -> Self {
        self.push(hook);
        self
    }

    pub fn push(&mut self, hook: impl PostRenderHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn run(&self, html: &str) -> String {
        let mut output = html.to_string();
        for hook in &self.hooks {
            debug!(hook = hook.name(), "running post-render hook");
            output = hook.apply(&output);
        }
        output
    }
}

/// Adds CSS classes to opening tags by tag name.
///
/// Existing `class` attributes are extended rather than duplicated.
#[derive(Debug, Clone)]
pub struct TagClassHook {
    classes: BTreeMap<String, String>,
    pattern: Option<Regex>,
}

impl TagClassHook {
    pub fn new<I, T, C>(classes: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = (T, C)>,
        T: Into<String>,
        C: Into<String>,
    {
        let classes: BTreeMap<String, String> = classes
            .into_iter()
            .map(|(tag, class)| (tag.into().to_ascii_lowercase(), class.into()))
            .collect();

        // Longest names first so `h1` is never shadowed by a shorter prefix.
        let mut tags: Vec<&str> = classes.keys().map(String::as_str).collect();
        tags.sort_by_key(|tag| std::cmp::Reverse(tag.len()));
        let pattern = if tags.is_empty() {
            None
        } else {
            let alternatives = tags
                .iter()
                .map(|tag| regex::escape(tag))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(
                r"<(?P<tag>{})(?P<attrs>(?:\s[^>]*?)?)(?P<close>\s*/)?>",
                alternatives
            ))?)
        };

        Ok(Self { classes, pattern })
    }

    /// Typographic classes for article pages
    pub fn prose() -> CodecResult<Self> {
        Self::new([
            ("h1", "text-4xl font-bold mt-8 mb-4 leading-tight"),
            ("h2", "text-3xl font-bold mt-7 mb-3 leading-tight"),
            ("h3", "text-2xl font-semibold mt-6 mb-3 leading-tight"),
            ("h4", "text-xl font-semibold mt-5 mb-2 leading-tight"),
            ("h5", "text-lg font-semibold mt-4 mb-2 leading-tight"),
            ("h6", "text-base font-semibold mt-4 mb-2 leading-tight"),
            ("p", "text-base leading-relaxed text-gray-700 my-3"),
            ("blockquote", "border-l-4 border-gray-300 pl-4 italic"),
            ("cite", "text-sm text-gray-600"),
            ("pre", "bg-gray-100 p-4 rounded-md overflow-x-auto"),
            ("hr", "my-8"),
            ("figure", "my-8"),
            ("img", "w-full rounded-lg"),
            ("figcaption", "text-center text-sm text-gray-600 mt-2"),
        ])
    }

    fn decorate(&self, caps: &Captures) -> String {
        let tag = &caps["tag"];
        let attrs = caps.name("attrs").map_or("", |m| m.as_str());
        let close = caps.name("close").map_or("", |m| m.as_str());
        let Some(class) = self.classes.get(&tag.to_ascii_lowercase()) else {
            return caps[0].to_string();
        };

        match existing_class().captures(attrs) {
            Some(existing) => {
                let whole = existing.get(0).map_or(0..0, |m| m.range());
                let merged = format!("class=\"{} {}\"", &existing[1], class);
                format!(
                    "<{}{}{}{}{}>",
                    tag,
                    &attrs[..whole.start],
                    merged,
                    &attrs[whole.end..],
                    close
                )
            }
            None => format!("<{}{} class=\"{}\"{}>", tag, attrs, class, close),
        }
    }
}

fn existing_class() -> &'static Regex {
    static CLASS: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    CLASS.get_or_init(|| Regex::new(r#"class="([^"]*)""#).expect("class pattern is valid"))
}

impl PostRenderHook for TagClassHook {
    fn name(&self) -> &str {
        "tag-class"
    }

    fn apply(&self, html: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern
                .replace_all(html, |caps: &Captures| self.decorate(caps))
                .into_owned(),
            None => html.to_string(),
        }
    }
}
