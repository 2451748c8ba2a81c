use scribe_codec::{
    decode_content_str, encode_json, render, validate_for_publish, CodecConfig, CodecError,
    Decoded, Metrics, MetricsEngine, PostRenderChain, RenderOptions, TagClassHook,
};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub struct RenderResult {
    html: String,
    warnings: Vec<String>,
}

#[wasm_bindgen]
impl RenderResult {
    #[wasm_bindgen(getter)]
    pub fn html(&self) -> String {
        self.html.clone()
    }

    /// Human-readable notes for blocks that were left out
    #[wasm_bindgen(getter)]
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.clone()
    }
}

fn to_js<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn load(content: &str) -> Result<Decoded, CodecError> {
    decode_content_str(content)
}

fn engine(config_json: Option<&str>) -> Result<MetricsEngine, String> {
    let config = match config_json {
        Some(json) => CodecConfig::from_json(json).map_err(|e| e.to_string())?,
        None => CodecConfig::default(),
    };
    Ok(MetricsEngine::new(config))
}

fn render_content(content: &str, pretty: bool, prose: bool) -> Result<RenderResult, CodecError> {
    let decoded = load(content)?;
    let options = RenderOptions {
        pretty,
        ..Default::default()
    };
    let rendered = render(&decoded.document, &options);

    let html = if prose {
        PostRenderChain::new()
            .with(TagClassHook::prose()?)
            .run(&rendered.html)
    } else {
        rendered.html
    };

    let warnings = decoded
        .warnings
        .iter()
        .chain(&rendered.warnings)
        .map(|w| w.to_string())
        .collect();

    Ok(RenderResult { html, warnings })
}

fn metrics_for(content: &str, config_json: Option<&str>) -> Result<Metrics, String> {
    let engine = engine(config_json)?;
    let decoded = load(content).map_err(|e| e.to_string())?;
    Ok(engine.measure(&decoded.document))
}

/// Render stored article content (any supported shape) to markup
#[wasm_bindgen(js_name = renderHtml)]
pub fn render_html_js(content: &str, pretty: bool, prose: bool) -> Result<RenderResult, JsValue> {
    render_content(content, pretty, prose).map_err(to_js)
}

/// Word count, reading time and excerpt as JSON
#[wasm_bindgen(js_name = computeMetrics)]
pub fn compute_metrics_js(content: &str, config_json: Option<String>) -> Result<String, JsValue> {
    let metrics = metrics_for(content, config_json.as_deref()).map_err(to_js)?;
    serde_json::to_string(&metrics).map_err(to_js)
}

#[wasm_bindgen(js_name = inferTitle)]
pub fn infer_title_js(content: &str, config_json: Option<String>) -> Result<String, JsValue> {
    let engine = engine(config_json.as_deref()).map_err(to_js)?;
    let decoded = load(content).map_err(to_js)?;
    Ok(engine.title(&decoded.document))
}

/// Whether the content has enough text to be published
#[wasm_bindgen(js_name = validateForPublish)]
pub fn validate_for_publish_js(content: &str) -> Result<bool, JsValue> {
    let decoded = load(content).map_err(to_js)?;
    Ok(validate_for_publish(&decoded.document).is_ok())
}

/// Re-encode content in the canonical structured form
#[wasm_bindgen(js_name = normalizeContent)]
pub fn normalize_content_js(content: &str) -> Result<String, JsValue> {
    let decoded = load(content).map_err(to_js)?;
    encode_json(&decoded.document).map_err(to_js)
}
