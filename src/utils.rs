use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlInputElement, HtmlSelectElement, Node};
use yew::prelude::*;

use crate::error::{PortalError, Result};

/// Cast a rendered node, reporting the element id when it is missing.
pub fn cast_node<T>(node_ref: &NodeRef, id: &str) -> Result<T>
where
    T: JsCast + AsRef<Node> + From<JsValue>,
{
    node_ref
        .cast::<T>()
        .ok_or_else(|| PortalError::MissingElement(id.to_string()))
}

pub fn input_value(e: &InputEvent) -> Option<String> {
    e.target_dyn_into::<HtmlInputElement>().map(|input| input.value())
}

pub fn checkbox_checked(e: &Event) -> Option<bool> {
    e.target_dyn_into::<HtmlInputElement>().map(|input| input.checked())
}

pub fn select_value(e: &Event) -> Option<String> {
    e.target_dyn_into::<HtmlSelectElement>().map(|select| select.value())
}

/// `map-screenshot-<millis>.png`
pub fn screenshot_file_name(timestamp_ms: f64) -> String {
    format!("map-screenshot-{}.png", timestamp_ms as u64)
}
