use wasm_bindgen::JsValue;
use web_sys::Element;

use mapfirst::adapter::{ListenerId, MapAdapter, ViewportHandler};
use mapfirst::error::{AdapterError, MarkerError};
use mapfirst::geometry::math::normalize_bearing;
use mapfirst::model::{Bounds, ClusterDisplayItem, LngLat, ScreenPoint};
use mapfirst::reconcile::MarkerBackend;

use super::gl::{self, GlListener};

/// Viewport access for a `mapboxgl.Map`. Under the globe projection
/// `getBounds()` may be null; the shared helper reports that as unknown.
pub struct MapboxAdapter {
    map: JsValue,
    listeners: Vec<GlListener>,
    next_id: ListenerId,
    destroyed: bool,
}

impl MapboxAdapter {
    pub fn new(map: JsValue) -> Self {
        MapboxAdapter { map, listeners: Vec::new(), next_id: 1, destroyed: false }
    }

    pub fn listener_count(&self) -> usize { self.listeners.len() }

    fn live(&self) -> Result<(), AdapterError> {
        if self.destroyed { Err(AdapterError::Destroyed) } else { Ok(()) }
    }
}

impl MapAdapter for MapboxAdapter {
    fn center(&self) -> Result<LngLat, AdapterError> {
        self.live()?;
        gl::center(&self.map)
    }

    fn zoom(&self) -> Result<f64, AdapterError> {
        self.live()?;
        gl::scalar(&self.map, "getZoom")
    }

    fn bearing(&self) -> Result<f64, AdapterError> {
        self.live()?;
        gl::scalar(&self.map, "getBearing").map(normalize_bearing)
    }

    fn pitch(&self) -> Result<f64, AdapterError> {
        self.live()?;
        // v3 allows pitch up to 85 degrees; anything beyond is a bad read.
        gl::scalar(&self.map, "getPitch").and_then(|p| {
            if (0.0..=90.0).contains(&p) { Ok(p) } else { Err(AdapterError::InvalidValue("getPitch")) }
        })
    }

    fn bounds(&self) -> Bounds {
        if self.destroyed { return Bounds::ZERO; }
        gl::bounds(&self.map)
    }

    fn project(&self, lng: f64, lat: f64) -> ScreenPoint {
        if self.destroyed { return ScreenPoint::ORIGIN; }
        gl::project(&self.map, lng, lat)
    }

    fn on_viewport_change(&mut self, handler: ViewportHandler) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        if !self.destroyed {
            self.listeners.push(gl::subscribe(&self.map, id, handler));
        }
        id
    }

    fn off_viewport_change(&mut self, id: ListenerId) {
        if let Some(pos) = self.listeners.iter().position(|l| l.id == id) {
            let l = self.listeners.remove(pos);
            gl::unsubscribe(&self.map, l);
        }
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        for l in self.listeners.drain(..) {
            gl::unsubscribe(&self.map, l);
        }
    }
}

/// `mapboxgl.Marker` instances added to one map.
pub struct MapboxMarkers {
    ns: JsValue,
    map: JsValue,
}

impl MapboxMarkers {
    pub fn new(ns: JsValue, map: JsValue) -> Self { MapboxMarkers { ns, map } }
}

impl MarkerBackend for MapboxMarkers {
    type Handle = JsValue;
    type Element = Element;

    fn create_marker(&mut self, element: Element, at: LngLat, item: &ClusterDisplayItem) -> Result<Option<JsValue>, MarkerError> {
        gl::create_marker(&self.ns, &self.map, element, at, item)
    }

    fn remove_marker(&mut self, handle: JsValue) -> Result<(), MarkerError> { gl::remove_marker(&handle) }

    fn update_position(&mut self, handle: &JsValue, at: LngLat) -> Result<(), MarkerError> { gl::set_position(handle, at) }

    fn element(&self, handle: &JsValue) -> Option<Element> { gl::marker_element(handle) }
}
