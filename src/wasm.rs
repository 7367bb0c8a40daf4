use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::model::FormData;
use crate::settings::{Language, Settings};

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn form_from_js(form: JsValue) -> Result<FormData, JsValue> {
    serde_wasm_bindgen::from_value(form).map_err(|e| JsValue::from_str(&format!("Invalid form: {}", e)))
}

/// Render a composition job (JSON) to PDF bytes.
#[wasm_bindgen(js_name = composePdf)]
pub fn compose_pdf(job_json: &str) -> Result<Vec<u8>, JsValue> {
    crate::render_json(job_json, &Settings::default())
        .map(|composed| composed.bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The normalized label for a form, or `null` while it is incomplete.
#[wasm_bindgen(js_name = buildLabel)]
pub fn build_label(form: JsValue) -> Result<JsValue, JsValue> {
    let form = form_from_js(form)?;
    to_js(&crate::label::build_label_record(&form))
}

/// Field → message map. Empty object means the form is valid.
#[wasm_bindgen(js_name = validateForm)]
pub fn validate_form(form: JsValue, language: &str) -> Result<JsValue, JsValue> {
    let form = form_from_js(form)?;
    let language = Language::from_code(language).unwrap_or_default();
    to_js(&crate::label::validate(&form, language))
}
