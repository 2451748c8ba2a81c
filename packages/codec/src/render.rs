//! # Render Form
//!
//! Read-only markup for previews and published pages. Each payload type
//! renders itself through [`RenderBlock`]; the dispatch in [`render_block`]
//! is a single exhaustive match, so a new block type is one new arm.
//!
//! Rich text (heading, paragraph, list items, quote text) is inline markup
//! already and is emitted as-is. Plain-text fields (code, captions, alt text,
//! URLs) are escaped.

use crate::error::CodecWarning;
use crate::text::escape_html;
use scribe_document::{
    Block, CodeData, DelimiterData, EmbedData, HeadingData, ImageData, ListData, ListStyle,
    ParagraphData, QuoteData, RawData,
};
use tracing::{instrument, warn};

/// Options for markup rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Put each element on its own indented line
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

impl RenderOptions {
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Default::default()
        }
    }
}

/// Rendered markup plus the blocks that had to be left out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub html: String,
    pub warnings: Vec<CodecWarning>,
}

pub(crate) struct Context<'a> {
    options: &'a RenderOptions,
    depth: usize,
    buffer: String,
    index: usize,
    warnings: Vec<CodecWarning>,
}

impl<'a> Context<'a> {
    fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
            index: 0,
            warnings: Vec::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    /// `<tag attrs>inner</tag>` on one line
    fn element(&mut self, tag: &str, attrs: &str, inner: &str) {
        self.add_line(&format!("<{tag}{attrs}>{inner}</{tag}>"));
    }

    fn open(&mut self, tag: &str, attrs: &str) {
        self.add_line(&format!("<{tag}{attrs}>"));
        self.indent();
    }

    fn close(&mut self, tag: &str) {
        self.dedent();
        self.add_line(&format!("</{tag}>"));
    }

    fn void(&mut self, tag: &str, attrs: &str) {
        self.add_line(&format!("<{tag}{attrs} />"));
    }

    fn warn(&mut self, warning: CodecWarning) {
        warn!(%warning, "omitting block from markup");
        self.warnings.push(warning);
    }

    fn finish(self) -> Rendered {
        Rendered {
            html: self.buffer,
            warnings: self.warnings,
        }
    }
}

fn attr(name: &str, value: &str) -> String {
    format!(" {}=\"{}\"", name, escape_html(value))
}

/// A block payload that knows how to write its own markup
pub(crate) trait RenderBlock {
    fn render(&self, ctx: &mut Context);
}

impl RenderBlock for HeadingData {
    fn render(&self, ctx: &mut Context) {
        let tag = format!("h{}", self.level());
        ctx.element(&tag, "", &self.text);
    }
}

impl RenderBlock for ParagraphData {
    fn render(&self, ctx: &mut Context) {
        ctx.element("p", "", &self.text);
    }
}

impl RenderBlock for ListData {
    fn render(&self, ctx: &mut Context) {
        let tag = match self.style {
            ListStyle::Ordered => "ol",
            ListStyle::Unordered => "ul",
        };
        ctx.open(tag, "");
        for item in &self.items {
            ctx.element("li", "", item);
        }
        ctx.close(tag);
    }
}

impl RenderBlock for QuoteData {
    fn render(&self, ctx: &mut Context) {
        ctx.open("blockquote", "");
        ctx.element("p", "", &self.text);
        if let Some(caption) = non_blank(&self.caption) {
            ctx.element("cite", "", &escape_html(caption));
        }
        ctx.close("blockquote");
    }
}

impl RenderBlock for CodeData {
    fn render(&self, ctx: &mut Context) {
        // Single line even when pretty: whitespace inside <pre> is content.
        ctx.add_line(&format!("<pre><code>{}</code></pre>", escape_html(&self.code)));
    }
}

impl RenderBlock for DelimiterData {
    fn render(&self, ctx: &mut Context) {
        ctx.void("hr", "");
    }
}

impl RenderBlock for ImageData {
    fn render(&self, ctx: &mut Context) {
        let Some(url) = self.resolved_url() else {
            let index = ctx.index;
            ctx.warn(CodecWarning::MissingImageUrl { index });
            return;
        };

        let caption = non_blank(&self.caption);
        let alt = non_blank(&self.alt).or(caption).unwrap_or("");

        ctx.open("figure", "");
        ctx.void("img", &format!("{}{}", attr("src", url), attr("alt", alt)));
        if let Some(caption) = caption {
            ctx.element("figcaption", "", &escape_html(caption));
        }
        ctx.close("figure");
    }
}

impl RenderBlock for EmbedData {
    fn render(&self, ctx: &mut Context) {
        ctx.open("figure", &attr("class", "embed"));
        ctx.add_line(&self.embed);
        if let Some(caption) = non_blank(&self.caption) {
            ctx.element("figcaption", "", &escape_html(caption));
        }
        ctx.close("figure");
    }
}

impl RenderBlock for RawData {
    fn render(&self, ctx: &mut Context) {
        ctx.add_line(&self.html);
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn render_block(block: &Block, ctx: &mut Context) {
    match block {
        Block::Heading(data) => data.render(ctx),
        Block::Paragraph(data) => data.render(ctx),
        Block::List(data) => data.render(ctx),
        Block::Quote(data) => data.render(ctx),
        Block::Code(data) => data.render(ctx),
        Block::Delimiter(data) => data.render(ctx),
        Block::Image(data) => data.render(ctx),
        Block::Embed(data) => data.render(ctx),
        Block::Raw(data) => data.render(ctx),
        Block::Opaque(opaque) => {
            let warning = CodecWarning::UnknownBlockType {
                index: ctx.index,
                tag: opaque.tag.clone(),
            };
            ctx.warn(warning);
        }
    }
}

/// Render a document to read-only markup
#[instrument(skip_all)]
pub fn render<D>(doc: &D, options: &RenderOptions) -> Rendered
where
    D: AsRef<[Block]> + ?Sized,
{
    let mut ctx = Context::new(options);
    for (index, block) in doc.as_ref().iter().enumerate() {
        ctx.index = index;
        render_block(block, &mut ctx);
    }
    ctx.finish()
}

/// Compact markup with default options, warnings discarded
pub fn render_html<D>(doc: &D) -> String
where
    D: AsRef<[Block]> + ?Sized,
{
    render(doc, &RenderOptions::default()).html
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_document::{Document, ImageData, OpaqueBlock};
    use serde_json::json;

    #[test]
    fn test_render_text_blocks() {
        let doc = Document::from_blocks(vec![
            Block::heading(3, "Title <i>here</i>"),
            Block::paragraph("Body &amp; soul"),
            Block::list(ListStyle::Ordered, vec!["a".into(), "b".into()]),
            Block::quote("Be brief.", Some("Anon <x>".into())),
        ]);

        assert_eq!(
            render_html(&doc),
            "<h3>Title <i>here</i></h3><p>Body &amp; soul</p><ol><li>a</li><li>b</li></ol>\
             <blockquote><p>Be brief.</p><cite>Anon &lt;x&gt;</cite></blockquote>"
        );
    }

    #[test]
    fn test_code_is_escaped_verbatim() {
        let doc = Document::from_blocks(vec![Block::code("if a < b && c {\n  <b>x</b>\n}")]);
        assert_eq!(
            render_html(&doc),
            "<pre><code>if a &lt; b &amp;&amp; c {\n  &lt;b&gt;x&lt;/b&gt;\n}</code></pre>"
        );
    }

    #[test]
    fn test_image_and_embed() {
        let image = ImageData {
            url: Some("https://cdn.example/p.png".into()),
            caption: Some("A \"pic\"".into()),
            ..Default::default()
        };
        let doc = Document::from_blocks(vec![
            Block::Image(image),
            Block::delimiter(),
            Block::embed("<iframe src=\"https://video.example/1\"></iframe>"),
        ]);

        assert_eq!(
            render_html(&doc),
            "<figure><img src=\"https://cdn.example/p.png\" alt=\"A &quot;pic&quot;\" />\
             <figcaption>A &quot;pic&quot;</figcaption></figure><hr />\
             <figure class=\"embed\"><iframe src=\"https://video.example/1\"></iframe></figure>"
        );
    }

    #[test]
    fn test_image_without_url_is_skipped() {
        let doc = Document::from_blocks(vec![
            Block::paragraph("before"),
            Block::Image(ImageData::pending("upload.png")),
        ]);

        let rendered = render(&doc, &RenderOptions::default());
        assert_eq!(rendered.html, "<p>before</p>");
        assert_eq!(
            rendered.warnings,
            vec![CodecWarning::MissingImageUrl { index: 1 }]
        );
    }

    #[test]
    fn test_opaque_block_is_omitted_with_warning() {
        let doc = Document::from_blocks(vec![
            Block::Opaque(OpaqueBlock {
                tag: "checklist".into(),
                data: json!({ "items": [] }),
            }),
            Block::raw("<aside>note</aside>"),
        ]);

        let rendered = render(&doc, &RenderOptions::default());
        assert_eq!(rendered.html, "<aside>note</aside>");
        assert_eq!(
            rendered.warnings,
            vec![CodecWarning::UnknownBlockType {
                index: 0,
                tag: "checklist".into()
            }]
        );
    }

    #[test]
    fn test_pretty_rendering() {
        let doc = Document::from_blocks(vec![
            Block::list(ListStyle::Unordered, vec!["x".into()]),
            Block::paragraph("y"),
        ]);

        assert_eq!(
            render(&doc, &RenderOptions::pretty()).html,
            "<ul>\n  <li>x</li>\n</ul>\n<p>y</p>\n"
        );
    }
}
