//! WASM bindings for browser-based editing workflows.
//!
//! This module exposes the pipeline operations to JavaScript via wasm-bindgen.
//! Trees and edit maps cross the boundary as JSON text.

use wasm_bindgen::prelude::*;

use crate::{ChunkConfig, EditMap, Error};

fn to_js(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Convert HTML into tree JSON.
#[wasm_bindgen(js_name = htmlToJson)]
pub fn html_to_json(html: &str) -> Result<String, JsValue> {
    crate::html_to_json(html).map_err(to_js)
}

/// Render tree JSON back into HTML.
#[wasm_bindgen(js_name = jsonToHtml)]
pub fn json_to_html(json: &str) -> Result<String, JsValue> {
    crate::json_to_html(json).map_err(to_js)
}

/// Extract chunks from tree JSON.
///
/// `max_chars` defaults to 4000 when omitted.
#[wasm_bindgen(js_name = extractChunks)]
pub fn extract_chunks(json: &str, max_chars: Option<usize>) -> Result<Vec<String>, JsValue> {
    let config = match max_chars {
        Some(n) => ChunkConfig::new().with_max_chars(n),
        None => ChunkConfig::default(),
    };
    crate::extract_chunks_with(json, &config).map_err(to_js)
}

/// Parse edited chunk text. Returns the edit map as a JSON object.
#[wasm_bindgen(js_name = parseEditedChunks)]
pub fn parse_edited_chunks(text: &str) -> Result<String, JsValue> {
    serde_json::to_string(&crate::parse_edited_chunks(text)).map_err(|e| to_js(e.into()))
}

/// Merge an edit map (JSON object of id → text) into tree JSON.
#[wasm_bindgen(js_name = applyEdits)]
pub fn apply_edits(json: &str, edits_json: &str) -> Result<String, JsValue> {
    let edits: EditMap = serde_json::from_str(edits_json)
        .map_err(|e| to_js(Error::InvalidEditMap(e.to_string())))?;
    crate::apply_edits(json, &edits).map_err(to_js)
}
