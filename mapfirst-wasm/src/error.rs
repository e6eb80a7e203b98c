use wasm_bindgen::prelude::*;

use mapfirst::error::CoreError;

use crate::interop::{new_obj, set_kv};

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

pub fn core(e: &CoreError) -> JsValue {
    match e {
        CoreError::Destroyed => destroyed(),
        CoreError::Config(c) => err("invalid_config", c.to_string(), None),
        CoreError::CapsExceeded { count, cap } => {
            let d = new_obj();
            set_kv(&d, "count", &JsValue::from_f64(*count as f64));
            set_kv(&d, "cap", &JsValue::from_f64(*cap as f64));
            err("caps_exceeded", e.to_string(), Some(d.into()))
        }
    }
}

#[inline]
pub fn destroyed() -> JsValue { err("destroyed", CoreError::Destroyed.to_string(), None) }

#[inline]
pub fn invalid_engine(got: &str) -> JsValue {
    let d = new_obj();
    set_kv(&d, "got", &JsValue::from_str(got));
    err("invalid_engine", "engine must be one of maplibre, mapbox, google", Some(d.into()))
}

#[inline]
pub fn invalid_config(message: impl Into<String>) -> JsValue { err("invalid_config", message, None) }

#[inline]
pub fn invalid_markers(message: impl Into<String>) -> JsValue { err("invalid_markers", message, None) }

#[inline]
pub fn invalid_type(got: &JsValue) -> JsValue {
    let d = new_obj();
    set_kv(&d, "got", got);
    err("invalid_type", "expected Accommodation, Eat & Drink, Attraction or null", Some(d.into()))
}

#[inline]
pub fn invalid_id(got: &JsValue) -> JsValue {
    let d = new_obj();
    set_kv(&d, "got", got);
    err("invalid_id", "property id must be a non-negative integer or null", Some(d.into()))
}

#[inline]
pub fn invalid_argument(param: &str, expected: &str) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    err("invalid_argument", format!("parameter '{param}' must be {expected}"), Some(d.into()))
}

/// A call from inside an `onRender` callback re-entered the instance.
#[inline]
pub fn busy() -> JsValue { err("busy", "instance is rendering; retry after the callback returns", None) }
