use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use mapfirst::error::{AdapterError, MarkerError};
use mapfirst::model::LngLat;

pub fn new_obj() -> Object { Object::new() }

pub fn set_kv(obj: &Object, k: &str, v: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(k), v);
}

pub fn get(target: &JsValue, k: &str) -> Result<JsValue, JsValue> {
    Reflect::get(target, &JsValue::from_str(k))
}

pub fn is_nullish(v: &JsValue) -> bool { v.is_null() || v.is_undefined() }

/// Calls `target[method](...args)` with `this` bound to `target`.
pub fn call(target: &JsValue, method: &str, args: &[&JsValue]) -> Result<JsValue, JsValue> {
    let f: Function = get(target, method)?.dyn_into()?;
    let argv = Array::new();
    for a in args { argv.push(a); }
    f.apply(target, &argv)
}

/// `new ctor(...args)`
pub fn construct(ctor: &JsValue, args: &[&JsValue]) -> Result<JsValue, JsValue> {
    let f: Function = ctor.clone().dyn_into()?;
    let argv = Array::new();
    for a in args { argv.push(a); }
    Reflect::construct(&f, &argv)
}

pub fn finite(v: &JsValue) -> Option<f64> { v.as_f64().filter(|x| x.is_finite()) }

/// Reads a finite number property, e.g. `lngLat.lng`.
pub fn num_field(target: &JsValue, k: &str) -> Option<f64> {
    get(target, k).ok().as_ref().and_then(finite)
}

pub fn describe(e: &JsValue) -> String {
    e.as_string()
        .or_else(|| get(e, "message").ok().and_then(|m| m.as_string()))
        .unwrap_or_else(|| format!("{e:?}"))
}

/// `[lng, lat]`, the array form gl-js accepts everywhere.
pub fn lng_lat_array(at: LngLat) -> JsValue {
    Array::of2(&JsValue::from_f64(at.lng), &JsValue::from_f64(at.lat)).into()
}

/// `{lat, lng}`, the literal form Google Maps accepts everywhere.
pub fn lat_lng_literal(at: LngLat) -> JsValue {
    let o = new_obj();
    set_kv(&o, "lat", &JsValue::from_f64(at.lat));
    set_kv(&o, "lng", &JsValue::from_f64(at.lng));
    o.into()
}

pub fn engine_err(e: JsValue) -> AdapterError { AdapterError::Engine(describe(&e)) }

pub fn marker_err(wrap: fn(String) -> MarkerError) -> impl Fn(JsValue) -> MarkerError {
    move |e| wrap(describe(&e))
}

/// No tracing subscriber lives in the page, so engine trouble goes to the console too.
pub fn console_warn(msg: &str) {
    web_sys::console::warn_1(&JsValue::from_str(msg));
}
