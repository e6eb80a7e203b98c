//! Google Maps JavaScript API.
//!
//! Differences from the gl-js engines that matter here: center and bounds
//! corners are `LatLng` objects with `lat()`/`lng()` methods, heading is
//! reported in [0, 360), there is no `project()` on the map (pixels come from
//! the world projection scaled by zoom), and listeners are registered through
//! `google.maps.event` and removed through the returned handle.

use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

use mapfirst::adapter::{ListenerId, MapAdapter, ViewportHandler};
use mapfirst::error::{AdapterError, MarkerError};
use mapfirst::geometry::math::normalize_bearing;
use mapfirst::geometry::mercator::TILE_SIZE;
use mapfirst::model::{Bounds, ClusterDisplayItem, LngLat, MarkerKind, ScreenPoint};
use mapfirst::reconcile::MarkerBackend;

use crate::interop::{
    call, console_warn, construct, describe, engine_err, finite, get, is_nullish, lat_lng_literal,
    marker_err, new_obj, num_field, set_kv,
};

pub const VIEW_EVENTS: [&str; 4] = ["center_changed", "zoom_changed", "heading_changed", "tilt_changed"];

fn lat_lng(v: &JsValue) -> Option<LngLat> {
    let lat = call(v, "lat", &[]).ok().as_ref().and_then(finite)?;
    let lng = call(v, "lng", &[]).ok().as_ref().and_then(finite)?;
    Some(LngLat::new(lng, lat))
}

struct GoogleListener {
    id: ListenerId,
    // Kept alive for as long as the handles below are registered.
    closure: Closure<dyn FnMut()>,
    handles: Vec<JsValue>,
}

/// Viewport access for a `google.maps.Map`.
pub struct GoogleMapsAdapter {
    ns: JsValue,
    map: JsValue,
    listeners: Vec<GoogleListener>,
    next_id: ListenerId,
    destroyed: bool,
}

impl GoogleMapsAdapter {
    pub fn new(ns: JsValue, map: JsValue) -> Self {
        GoogleMapsAdapter { ns, map, listeners: Vec::new(), next_id: 1, destroyed: false }
    }

    pub fn listener_count(&self) -> usize { self.listeners.len() }

    fn live(&self) -> Result<(), AdapterError> {
        if self.destroyed { Err(AdapterError::Destroyed) } else { Ok(()) }
    }

    fn event_ns(&self) -> Result<JsValue, JsValue> { get(&get(&self.ns, "maps")?, "event") }

    /// Unset numeric getters (heading, tilt on raster maps) read as zero.
    fn optional_scalar(&self, getter: &'static str) -> Result<f64, AdapterError> {
        self.live()?;
        let v = call(&self.map, getter, &[]).map_err(engine_err)?;
        if is_nullish(&v) { return Ok(0.0); }
        finite(&v).ok_or(AdapterError::InvalidValue(getter))
    }

    fn world_point(projection: &JsValue, at: LngLat) -> Option<(f64, f64)> {
        let p = call(projection, "fromLatLngToPoint", &[&lat_lng_literal(at)]).ok()?;
        Some((num_field(&p, "x")?, num_field(&p, "y")?))
    }

    // A handle that refuses removal keeps the closure alive for good.
    fn release(&self, l: GoogleListener) {
        let mut detached = true;
        for h in &l.handles {
            if let Err(e) = call(h, "remove", &[]) {
                console_warn(&format!("mapfirst: removing a map listener failed: {}", describe(&e)));
                detached = false;
            }
        }
        if !detached {
            l.closure.forget();
        }
    }
}

impl MapAdapter for GoogleMapsAdapter {
    fn center(&self) -> Result<LngLat, AdapterError> {
        self.live()?;
        let c = call(&self.map, "getCenter", &[]).map_err(engine_err)?;
        if is_nullish(&c) { return Err(AdapterError::Unavailable("center")); }
        lat_lng(&c).ok_or(AdapterError::InvalidValue("getCenter"))
    }

    fn zoom(&self) -> Result<f64, AdapterError> {
        self.live()?;
        let v = call(&self.map, "getZoom", &[]).map_err(engine_err)?;
        if is_nullish(&v) { return Err(AdapterError::Unavailable("zoom")); }
        finite(&v).ok_or(AdapterError::InvalidValue("getZoom"))
    }

    fn bearing(&self) -> Result<f64, AdapterError> {
        self.optional_scalar("getHeading").map(normalize_bearing)
    }

    fn pitch(&self) -> Result<f64, AdapterError> { self.optional_scalar("getTilt") }

    /// Undefined until the first idle event.
    fn bounds(&self) -> Bounds {
        if self.destroyed { return Bounds::ZERO; }
        let Ok(b) = call(&self.map, "getBounds", &[]) else { return Bounds::ZERO; };
        if is_nullish(&b) { return Bounds::ZERO; }
        let sw = call(&b, "getSouthWest", &[]).ok().as_ref().and_then(lat_lng);
        let ne = call(&b, "getNorthEast", &[]).ok().as_ref().and_then(lat_lng);
        match (sw, ne) {
            (Some(sw), Some(ne)) => Bounds { sw, ne },
            _ => Bounds::ZERO,
        }
    }

    /// Top-down only; heading and tilt are not applied.
    fn project(&self, lng: f64, lat: f64) -> ScreenPoint {
        if self.destroyed { return ScreenPoint::ORIGIN; }
        let Ok(projection) = call(&self.map, "getProjection", &[]) else { return ScreenPoint::ORIGIN; };
        if is_nullish(&projection) { return ScreenPoint::ORIGIN; }
        let bounds = self.bounds();
        let Ok(zoom) = self.zoom() else { return ScreenPoint::ORIGIN; };
        if bounds.is_zero() { return ScreenPoint::ORIGIN; }

        let nw = LngLat::new(bounds.sw.lng, bounds.ne.lat);
        let (Some((px, py)), Some((ox, oy))) =
            (Self::world_point(&projection, LngLat::new(lng, lat)), Self::world_point(&projection, nw))
        else {
            return ScreenPoint::ORIGIN;
        };
        let scale = 2f64.powf(zoom);
        let mut x = (px - ox) * scale;
        // the view straddles the antimeridian
        if x < 0.0 && bounds.sw.lng > bounds.ne.lng {
            x += TILE_SIZE * scale;
        }
        ScreenPoint::new(x, (py - oy) * scale)
    }

    fn on_viewport_change(&mut self, handler: ViewportHandler) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        if self.destroyed { return id; }
        let closure = Closure::wrap(handler);
        let mut handles = Vec::with_capacity(VIEW_EVENTS.len());
        match self.event_ns() {
            Ok(event) => {
                for ev in VIEW_EVENTS {
                    let f: &JsValue = closure.as_ref();
                    match call(&event, "addListener", &[&self.map, &JsValue::from_str(ev), f]) {
                        Ok(h) => handles.push(h),
                        Err(e) => console_warn(&format!("mapfirst: subscribing to '{ev}' failed: {}", describe(&e))),
                    }
                }
            }
            Err(e) => console_warn(&format!("mapfirst: google.maps.event unavailable: {}", describe(&e))),
        }
        self.listeners.push(GoogleListener { id, closure, handles });
        id
    }

    fn off_viewport_change(&mut self, id: ListenerId) {
        if let Some(pos) = self.listeners.iter().position(|l| l.id == id) {
            let l = self.listeners.remove(pos);
            self.release(l);
        }
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        let all: Vec<GoogleListener> = self.listeners.drain(..).collect();
        for l in all { self.release(l); }
    }
}

/// `google.maps.marker.AdvancedMarkerElement` instances on one map.
pub struct GoogleMarkers {
    ns: JsValue,
    map: JsValue,
}

impl GoogleMarkers {
    pub fn new(ns: JsValue, map: JsValue) -> Self { GoogleMarkers { ns, map } }

    fn ctor(&self) -> Result<JsValue, JsValue> {
        get(&get(&get(&self.ns, "maps")?, "marker")?, "AdvancedMarkerElement")
    }
}

impl MarkerBackend for GoogleMarkers {
    type Handle = JsValue;
    type Element = Element;

    fn create_marker(&mut self, element: Element, at: LngLat, item: &ClusterDisplayItem) -> Result<Option<JsValue>, MarkerError> {
        let ctor = self.ctor().map_err(marker_err(MarkerError::Create))?;
        if is_nullish(&ctor) {
            return Err(MarkerError::Create("google.maps.marker.AdvancedMarkerElement is not loaded".to_string()));
        }
        let opts = new_obj();
        set_kv(&opts, "map", &self.map);
        set_kv(&opts, "position", &lat_lng_literal(at));
        set_kv(&opts, "content", &element);
        // primaries stack above dots
        let z = match item.kind() { MarkerKind::Primary => 2.0, MarkerKind::Dot => 1.0 };
        set_kv(&opts, "zIndex", &JsValue::from_f64(z));
        construct(&ctor, &[&JsValue::from(opts)]).map(Some).map_err(marker_err(MarkerError::Create))
    }

    fn remove_marker(&mut self, handle: JsValue) -> Result<(), MarkerError> {
        Reflect::set(&handle, &JsValue::from_str("map"), &JsValue::NULL)
            .map(|_| ())
            .map_err(marker_err(MarkerError::Remove))
    }

    fn update_position(&mut self, handle: &JsValue, at: LngLat) -> Result<(), MarkerError> {
        Reflect::set(handle, &JsValue::from_str("position"), &lat_lng_literal(at))
            .map(|_| ())
            .map_err(marker_err(MarkerError::Update))
    }

    fn element(&self, handle: &JsValue) -> Option<Element> {
        get(handle, "content").ok()?.dyn_into::<Element>().ok()
    }
}
