//! Conversion of JavaScript exceptions into bridge errors

use bridge_traits::error::BridgeError;
use wasm_bindgen::{JsCast, JsValue};

/// Extract a readable message from a thrown JavaScript value.
pub fn js_message(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        text
    } else if let Some(js_err) = err.dyn_ref::<js_sys::Error>() {
        js_err.message().into()
    } else {
        format!("{err:?}")
    }
}

/// Wrap a JavaScript exception raised during `context`.
pub fn js_error(context: &str, err: JsValue) -> BridgeError {
    BridgeError::OperationFailed(format!("{context}: {}", js_message(&err)))
}
