//! # Scribe Codec
//!
//! Translates documents to and from their external representations and
//! derives text metrics from them.
//!
//! ```text
//!            encode                       render
//! structured form ◄──── Document ────────────────► markup
//!                 ────►     │
//!            decode         └──► metrics (words, reading time, excerpt, title)
//! ```
//!
//! Everything here is a pure function of its input. Decoding and rendering
//! never fail because of one bad block; they skip it and report a
//! [`CodecWarning`].

mod config;
mod content;
mod error;
mod legacy;
mod metrics;
mod post_render;
mod render;
mod structured;
mod text;
mod validate;

pub use config::{CodecConfig, CONFIG_FILE_NAME, DEFAULT_AUTHOR, DEFAULT_WORDS_PER_MINUTE};
pub use content::{decode_content, decode_content_str, ContentShape};
pub use error::{CodecError, CodecResult, CodecWarning, ConfigError};
pub use legacy::{decode_legacy_html, decode_tiptap};
pub use metrics::{
    block_text, blocks_to_text, excerpt, excerpt_with, first_heading_text, infer_title,
    infer_title_with, reading_time, word_count, Metrics, MetricsEngine, DEFAULT_ELLIPSIS,
    DEFAULT_EXCERPT_LENGTH, UNTITLED_TITLE,
};
pub use post_render::{PostRenderChain, PostRenderHook, TagClassHook};
pub use render::{render, render_html, RenderOptions, Rendered};
pub use structured::{
    decode, decode_str, encode, encode_json, encode_with_warnings, Decoded, StructuredForm,
};
pub use validate::{
    has_visible_text, validate, validate_for_draft, validate_for_publish, ValidationError,
    ValidationMode,
};

#[cfg(test)]
mod tests;
