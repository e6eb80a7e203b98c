//! Stateless reflection helpers for the gl-js family (MapLibre GL, Mapbox GL).
//!
//! Both engines expose the same `Map` and `Marker` surface, so their
//! adapters and marker backends share these calls and keep their own state.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

use mapfirst::adapter::{ListenerId, ViewportHandler};
use mapfirst::error::{AdapterError, MarkerError};
use mapfirst::model::{Bounds, ClusterDisplayItem, LngLat, MarkerKind, ScreenPoint};

use crate::interop::{
    call, console_warn, construct, describe, engine_err, finite, get, is_nullish, lng_lat_array,
    marker_err, new_obj, num_field, set_kv,
};

/// Every event after which the visible geometry may have changed.
pub const VIEW_EVENTS: [&str; 4] = ["move", "zoom", "rotate", "pitch"];

pub fn center(map: &JsValue) -> Result<LngLat, AdapterError> {
    let c = call(map, "getCenter", &[]).map_err(engine_err)?;
    if is_nullish(&c) { return Err(AdapterError::Unavailable("center")); }
    match (num_field(&c, "lng"), num_field(&c, "lat")) {
        (Some(lng), Some(lat)) => Ok(LngLat::new(lng, lat)),
        _ => Err(AdapterError::InvalidValue("getCenter")),
    }
}

pub fn scalar(map: &JsValue, getter: &'static str) -> Result<f64, AdapterError> {
    let v = call(map, getter, &[]).map_err(engine_err)?;
    finite(&v).ok_or(AdapterError::InvalidValue(getter))
}

fn corner(b: &JsValue, getter: &str) -> Option<LngLat> {
    let c = call(b, getter, &[]).ok()?;
    Some(LngLat::new(num_field(&c, "lng")?, num_field(&c, "lat")?))
}

/// `Bounds::ZERO` when the engine has no bounds yet or any corner is unusable.
pub fn bounds(map: &JsValue) -> Bounds {
    let Ok(b) = call(map, "getBounds", &[]) else { return Bounds::ZERO; };
    if is_nullish(&b) { return Bounds::ZERO; }
    match (corner(&b, "getSouthWest"), corner(&b, "getNorthEast")) {
        (Some(sw), Some(ne)) => Bounds { sw, ne },
        _ => Bounds::ZERO,
    }
}

pub fn project(map: &JsValue, lng: f64, lat: f64) -> ScreenPoint {
    let Ok(p) = call(map, "project", &[&lng_lat_array(LngLat::new(lng, lat))]) else {
        return ScreenPoint::ORIGIN;
    };
    match (num_field(&p, "x"), num_field(&p, "y")) {
        (Some(x), Some(y)) => ScreenPoint::new(x, y),
        _ => ScreenPoint::ORIGIN,
    }
}

/// One handler registered for all of `VIEW_EVENTS`.
pub struct GlListener {
    pub id: ListenerId,
    closure: Closure<dyn FnMut()>,
}

impl GlListener {
    fn function(&self) -> &JsValue { self.closure.as_ref() }
}

pub fn subscribe(map: &JsValue, id: ListenerId, handler: ViewportHandler) -> GlListener {
    let listener = GlListener { id, closure: Closure::wrap(handler) };
    for ev in VIEW_EVENTS {
        if let Err(e) = call(map, "on", &[&JsValue::from_str(ev), listener.function()]) {
            console_warn(&format!("mapfirst: subscribing to '{ev}' failed: {}", describe(&e)));
        }
    }
    listener
}

/// Detaches every event. If the engine refuses, the closure is leaked so a
/// later event cannot reach freed memory.
pub fn unsubscribe(map: &JsValue, listener: GlListener) {
    let mut detached = true;
    for ev in VIEW_EVENTS {
        if let Err(e) = call(map, "off", &[&JsValue::from_str(ev), listener.function()]) {
            console_warn(&format!("mapfirst: unsubscribing from '{ev}' failed: {}", describe(&e)));
            detached = false;
        }
    }
    if !detached {
        listener.closure.forget();
    }
}

fn anchor(item: &ClusterDisplayItem) -> &'static str {
    match item.kind() {
        MarkerKind::Primary => "bottom",
        MarkerKind::Dot => "center",
    }
}

/// `new ns.Marker({element, anchor}).setLngLat(at).addTo(map)`
pub fn create_marker(
    ns: &JsValue,
    map: &JsValue,
    element: Element,
    at: LngLat,
    item: &ClusterDisplayItem,
) -> Result<Option<JsValue>, MarkerError> {
    let ctor = get(ns, "Marker").map_err(marker_err(MarkerError::Create))?;
    if is_nullish(&ctor) {
        return Err(MarkerError::Create("namespace has no Marker constructor".to_string()));
    }
    let opts = new_obj();
    set_kv(&opts, "element", &element);
    set_kv(&opts, "anchor", &JsValue::from_str(anchor(item)));
    let marker = construct(&ctor, &[&JsValue::from(opts)]).map_err(marker_err(MarkerError::Create))?;
    call(&marker, "setLngLat", &[&lng_lat_array(at)]).map_err(marker_err(MarkerError::Create))?;
    if let Err(e) = call(&marker, "addTo", &[map]) {
        let _ = call(&marker, "remove", &[]);
        return Err(marker_err(MarkerError::Create)(e));
    }
    Ok(Some(marker))
}

pub fn remove_marker(marker: &JsValue) -> Result<(), MarkerError> {
    call(marker, "remove", &[]).map(|_| ()).map_err(marker_err(MarkerError::Remove))
}

pub fn set_position(marker: &JsValue, at: LngLat) -> Result<(), MarkerError> {
    call(marker, "setLngLat", &[&lng_lat_array(at)]).map(|_| ()).map_err(marker_err(MarkerError::Update))
}

pub fn marker_element(marker: &JsValue) -> Option<Element> {
    call(marker, "getElement", &[]).ok()?.dyn_into::<Element>().ok()
}
