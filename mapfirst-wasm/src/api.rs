use js_sys::Function;
use wasm_bindgen::prelude::*;

use mapfirst::config::ClusterConfig;
use mapfirst::error::CoreError;
use mapfirst::model::{ClusterDisplayItem, Property, PropertyId, PropertyType, ViewState};

use crate::engines::Engine;
use crate::interop::{console_warn, describe, is_nullish, new_obj, set_kv};
use crate::{error, Core, MapFirst};

/// Largest integer a JS number holds exactly.
const MAX_SAFE_ID: f64 = 9_007_199_254_740_991.0;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Accepts nothing, a config object or the same document as a JSON string.
fn parse_config(options: JsValue) -> Result<ClusterConfig, JsValue> {
    if is_nullish(&options) {
        return Ok(ClusterConfig::default());
    }
    if let Some(s) = options.as_string() {
        return ClusterConfig::from_json_str(&s).map_err(|e| error::invalid_config(e.to_string()));
    }
    serde_wasm_bindgen::from_value(options).map_err(|e| error::invalid_config(e.to_string()))
}

fn parse_id(v: &JsValue) -> Result<Option<PropertyId>, JsValue> {
    if is_nullish(v) { return Ok(None); }
    match v.as_f64() {
        Some(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= MAX_SAFE_ID => Ok(Some(n as PropertyId)),
        _ => Err(error::invalid_id(v)),
    }
}

fn parse_type(v: &JsValue) -> Result<Option<PropertyType>, JsValue> {
    if is_nullish(v) { return Ok(None); }
    v.as_string()
        .as_deref()
        .and_then(PropertyType::parse)
        .map(Some)
        .ok_or_else(|| error::invalid_type(v))
}

fn envelope(r: Result<JsValue, JsValue>) -> JsValue {
    match r {
        Ok(v) => error::ok(v),
        Err(e) => e,
    }
}

impl MapFirst {
    fn with_core<T>(&self, f: impl FnOnce(&mut Core) -> Result<T, CoreError>) -> Result<T, JsValue> {
        let mut core = self.inner.try_borrow_mut().map_err(|_| error::busy())?;
        f(&mut core).map_err(|e| error::core(&e))
    }

    fn rendered_count(&self) -> Result<JsValue, JsValue> {
        let core = self.inner.try_borrow().map_err(|_| error::busy())?;
        Ok(JsValue::from_f64(core.get_clusters().len() as f64))
    }
}

#[wasm_bindgen]
impl MapFirst {
    /// `engine` is `"maplibre"`, `"mapbox"` or `"google"`; `namespace` is the
    /// matching global. Throws an error envelope on bad arguments.
    #[wasm_bindgen(constructor)]
    pub fn new(
        engine: &str,
        map: JsValue,
        namespace: JsValue,
        element_factory: JsValue,
        options: JsValue,
    ) -> Result<MapFirst, JsValue> {
        let engine = Engine::parse(engine).ok_or_else(|| error::invalid_engine(engine))?;
        if !map.is_object() {
            return Err(error::invalid_argument("map", "a map instance"));
        }
        if !namespace.is_object() {
            return Err(error::invalid_argument("namespace", "the engine namespace object"));
        }
        let factory: Function = element_factory
            .dyn_into()
            .map_err(|_| error::invalid_argument("elementFactory", "a function"))?;
        let config = parse_config(options)?;
        MapFirst::rs_new(engine, &namespace, &map, factory, config).map_err(|e| error::core(&e))
    }

    /// Replaces the property list and re-renders. Resolves to the number of
    /// rendered markers.
    #[wasm_bindgen(js_name = setMarkers)]
    pub fn set_markers(&self, markers: JsValue) -> JsValue {
        if self.rs_is_destroyed() { return error::destroyed(); }
        let props: Vec<Property> = match serde_wasm_bindgen::from_value(markers) {
            Ok(p) => p,
            Err(e) => return error::invalid_markers(e.to_string()),
        };
        envelope(self.with_core(|c| c.set_markers(props)).and_then(|()| self.rendered_count()))
    }

    /// `null` returns to the category inferred from the data.
    #[wasm_bindgen(js_name = setPrimaryType)]
    pub fn set_primary_type(&self, primary: JsValue) -> JsValue {
        let r = parse_type(&primary)
            .and_then(|t| self.with_core(|c| c.set_primary_type(t)))
            .map(|()| JsValue::UNDEFINED);
        envelope(r)
    }

    #[wasm_bindgen(js_name = setSelectedMarker)]
    pub fn set_selected_marker(&self, id: JsValue) -> JsValue {
        let r = parse_id(&id)
            .and_then(|id| self.with_core(|c| c.set_selected_marker(id)))
            .map(|()| JsValue::UNDEFINED);
        envelope(r)
    }

    pub fn refresh(&self) -> JsValue {
        envelope(self.with_core(|c| c.refresh()).and_then(|()| self.rendered_count()))
    }

    #[wasm_bindgen(js_name = getClusters)]
    pub fn get_clusters(&self) -> JsValue {
        let Ok(core) = self.inner.try_borrow() else { return error::busy(); };
        if core.is_destroyed() { return error::destroyed(); }
        match serde_wasm_bindgen::to_value(core.get_clusters()) {
            Ok(v) => error::ok(v),
            Err(e) => error::err("serialize", e.to_string(), None),
        }
    }

    /// Same as `getClusters`, serialized for logging or snapshots.
    #[wasm_bindgen(js_name = getClustersJson)]
    pub fn get_clusters_json(&self) -> JsValue {
        let Ok(core) = self.inner.try_borrow() else { return error::busy(); };
        if core.is_destroyed() { return error::destroyed(); }
        match serde_json::to_string(core.get_clusters()) {
            Ok(s) => error::ok(JsValue::from_str(&s)),
            Err(e) => error::err("serialize", e.to_string(), None),
        }
    }

    #[wasm_bindgen(js_name = visibleProperties)]
    pub fn visible_properties(&self) -> JsValue {
        let Ok(core) = self.inner.try_borrow() else { return error::busy(); };
        let visible = match core.visible_properties() {
            Ok(v) => v,
            Err(e) => return error::core(&e),
        };
        match serde_wasm_bindgen::to_value(&visible) {
            Ok(v) => error::ok(v),
            Err(e) => error::err("serialize", e.to_string(), None),
        }
    }

    /// Counters from the last render.
    #[wasm_bindgen(js_name = lastStats)]
    pub fn last_stats(&self) -> JsValue {
        let Ok(core) = self.inner.try_borrow() else { return error::busy(); };
        let s = core.last_stats();
        let o = new_obj();
        for (k, v) in [
            ("created", s.created),
            ("reused", s.reused),
            ("moved", s.moved),
            ("removed", s.removed),
            ("failed", s.failed),
            ("skipped", s.skipped),
        ] {
            set_kv(&o, k, &JsValue::from_f64(v as f64));
        }
        error::ok(o.into())
    }

    /// `callback(clusters, viewState | null)` after every render; `null` clears it.
    #[wasm_bindgen(js_name = onRender)]
    pub fn on_render(&self, callback: JsValue) -> JsValue {
        if is_nullish(&callback) {
            return envelope(self.with_core(|c| c.set_observer(None)).map(|()| JsValue::UNDEFINED));
        }
        let Ok(callback) = callback.dyn_into::<Function>() else {
            return error::invalid_argument("callback", "a function or null");
        };
        let observer = move |items: &[ClusterDisplayItem], view: Option<&ViewState>| {
            let items_js = serde_wasm_bindgen::to_value(items).unwrap_or(JsValue::NULL);
            let view_js = view
                .and_then(|v| serde_wasm_bindgen::to_value(v).ok())
                .unwrap_or(JsValue::NULL);
            if let Err(e) = callback.call2(&JsValue::NULL, &items_js, &view_js) {
                console_warn(&format!("mapfirst: onRender callback threw: {}", describe(&e)));
            }
        };
        envelope(self.with_core(|c| c.set_observer(Some(Box::new(observer)))).map(|()| JsValue::UNDEFINED))
    }

    /// Removes every marker and listener. Calling it again is a no-op.
    pub fn destroy(&self) -> JsValue {
        envelope(self.with_core(|c| c.destroy()).map(|()| JsValue::UNDEFINED))
    }

    #[wasm_bindgen(getter, js_name = isDestroyed)]
    pub fn is_destroyed(&self) -> bool { self.rs_is_destroyed() }
}
