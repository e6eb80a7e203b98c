use js_sys::Function;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

use mapfirst::error::MarkerError;
use mapfirst::model::{ClusterDisplayItem, MarkerKind, MarkerStyle};
use mapfirst::reconcile::ElementFactory;

use crate::interop::{console_warn, describe, is_nullish};

pub const CLASS_PRIMARY: &str = "mapfirst-marker--primary";
pub const CLASS_DOT: &str = "mapfirst-marker--dot";
pub const CLASS_PRIMARY_TYPE: &str = "mapfirst-marker--primary-type";
pub const CLASS_SELECTED: &str = "mapfirst-marker--selected";
pub const CLASS_PENDING: &str = "mapfirst-marker--pending";
pub const KEY_ATTR: &str = "data-mapfirst-key";

/// Wraps the page's `elementFactory(item, style) -> HTMLElement | null`.
///
/// The page draws the marker; state flags are mirrored as classes so a style
/// change can be applied to the existing element without calling back into JS.
pub struct JsElementFactory {
    build: Function,
}

impl JsElementFactory {
    pub fn new(build: Function) -> Self { JsElementFactory { build } }
}

pub fn apply_style(el: &Element, item: &ClusterDisplayItem, style: &MarkerStyle) -> Result<(), JsValue> {
    let classes = el.class_list();
    classes.toggle_with_force(CLASS_PRIMARY, style.kind == MarkerKind::Primary)?;
    classes.toggle_with_force(CLASS_DOT, style.kind == MarkerKind::Dot)?;
    classes.toggle_with_force(CLASS_PRIMARY_TYPE, style.primary_type)?;
    classes.toggle_with_force(CLASS_SELECTED, style.selected)?;
    classes.toggle_with_force(CLASS_PENDING, style.pending)?;
    el.set_attribute(KEY_ATTR, item.key())
}

impl ElementFactory<Element> for JsElementFactory {
    fn build(&mut self, item: &ClusterDisplayItem, style: &MarkerStyle) -> Option<Element> {
        let (item_js, style_js) = match (serde_wasm_bindgen::to_value(item), serde_wasm_bindgen::to_value(style)) {
            (Ok(i), Ok(s)) => (i, s),
            (Err(e), _) | (_, Err(e)) => {
                console_warn(&format!("mapfirst: cannot hand '{}' to elementFactory: {e}", item.key()));
                return None;
            }
        };
        let out = match self.build.call2(&JsValue::NULL, &item_js, &style_js) {
            Ok(v) => v,
            Err(e) => {
                console_warn(&format!("mapfirst: elementFactory threw for '{}': {}", item.key(), describe(&e)));
                return None;
            }
        };
        if is_nullish(&out) { return None; }
        let el = match out.dyn_into::<Element>() {
            Ok(el) => el,
            Err(_) => {
                console_warn(&format!("mapfirst: elementFactory returned a non-element for '{}'", item.key()));
                return None;
            }
        };
        if let Err(e) = apply_style(&el, item, style) {
            console_warn(&format!("mapfirst: styling '{}' failed: {}", item.key(), describe(&e)));
        }
        Some(el)
    }

    fn restyle(&mut self, element: &Element, item: &ClusterDisplayItem, style: &MarkerStyle) -> Result<(), MarkerError> {
        apply_style(element, item, style).map_err(|e| {
            console_warn(&format!("mapfirst: restyling '{}' failed: {}", item.key(), describe(&e)));
            MarkerError::Restyle(describe(&e))
        })
    }
}
