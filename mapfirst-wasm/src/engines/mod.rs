pub mod gl;
pub mod google;
pub mod mapbox;
pub mod maplibre;

use wasm_bindgen::JsValue;
use web_sys::Element;

use mapfirst::adapter::MapAdapter;
use mapfirst::error::MarkerError;
use mapfirst::model::{ClusterDisplayItem, LngLat};
use mapfirst::reconcile::MarkerBackend;

use crate::interop::console_warn;

pub type DynAdapter = Box<dyn MapAdapter>;
pub type DynMarkers = Box<dyn MarkerBackend<Handle = JsValue, Element = Element>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Engine {
    MapLibre,
    Mapbox,
    Google,
}

impl Engine {
    pub fn parse(s: &str) -> Option<Engine> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maplibre" => Some(Engine::MapLibre),
            "mapbox" => Some(Engine::Mapbox),
            "google" => Some(Engine::Google),
            _ => None,
        }
    }

    /// `ns` is the engine global: `maplibregl`, `mapboxgl` or `google`.
    pub fn connect(self, ns: &JsValue, map: &JsValue) -> (DynAdapter, DynMarkers) {
        match self {
            Engine::MapLibre => (
                Box::new(maplibre::MapLibreAdapter::new(map.clone())),
                Box::new(Logged(maplibre::MapLibreMarkers::new(ns.clone(), map.clone()))),
            ),
            Engine::Mapbox => (
                Box::new(mapbox::MapboxAdapter::new(map.clone())),
                Box::new(Logged(mapbox::MapboxMarkers::new(ns.clone(), map.clone()))),
            ),
            Engine::Google => (
                Box::new(google::GoogleMapsAdapter::new(ns.clone(), map.clone())),
                Box::new(Logged(google::GoogleMarkers::new(ns.clone(), map.clone()))),
            ),
        }
    }
}

/// Forwards to an engine backend and echoes each failure to the browser
/// console, where no tracing subscriber is listening.
pub struct Logged<B>(pub B);

fn warned(e: MarkerError) -> MarkerError {
    console_warn(&format!("mapfirst: {e}"));
    e
}

impl<B: MarkerBackend> MarkerBackend for Logged<B> {
    type Handle = B::Handle;
    type Element = B::Element;

    fn create_marker(
        &mut self,
        element: Self::Element,
        at: LngLat,
        item: &ClusterDisplayItem,
    ) -> Result<Option<Self::Handle>, MarkerError> {
        self.0.create_marker(element, at, item).map_err(|e| {
            console_warn(&format!("mapfirst: marker '{}': {e}", item.key()));
            e
        })
    }

    fn remove_marker(&mut self, handle: Self::Handle) -> Result<(), MarkerError> {
        self.0.remove_marker(handle).map_err(warned)
    }

    fn update_position(&mut self, handle: &Self::Handle, at: LngLat) -> Result<(), MarkerError> {
        self.0.update_position(handle, at).map_err(warned)
    }

    fn element(&self, handle: &Self::Handle) -> Option<Self::Element> { self.0.element(handle) }
}
