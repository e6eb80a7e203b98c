use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::prelude::*;

use mapfirst::adapter::{MapAdapter, ViewportHandler};
use mapfirst::config::ClusterConfig;
use mapfirst::error::CoreError;
use mapfirst::reconcile::MarkerReconciler;
use mapfirst::MapFirstCore;

mod api;
pub mod engines;
mod error;
pub mod factory;
mod interop;

use engines::{DynAdapter, DynMarkers, Engine};
use factory::JsElementFactory;
use interop::console_warn;

pub(crate) type Core = MapFirstCore<DynAdapter, DynMarkers>;

/// One clustered marker layer bound to one map instance.
#[wasm_bindgen]
pub struct MapFirst { pub(crate) inner: Rc<RefCell<Core>> }

impl MapFirst {
    pub fn rs_new(
        engine: Engine,
        ns: &JsValue,
        map: &JsValue,
        element_factory: Function,
        config: ClusterConfig,
    ) -> Result<MapFirst, CoreError> {
        let (adapter, markers) = engine.connect(ns, map);
        let reconciler = MarkerReconciler::new(markers, Box::new(JsElementFactory::new(element_factory)));
        let inner = Rc::new(RefCell::new(MapFirstCore::new(adapter, reconciler, config)?));

        let weak = Rc::downgrade(&inner);
        let on_view: ViewportHandler = Box::new(move || {
            let Some(rc) = weak.upgrade() else { return; };
            // Events raised while a render is in progress are dropped; the
            // render already reads the latest viewport.
            let Ok(mut core) = rc.try_borrow_mut() else { return; };
            if let Err(e) = core.refresh() {
                console_warn(&format!("mapfirst: viewport refresh failed: {e}"));
            }
        });
        inner.borrow_mut().adapter_mut().on_viewport_change(on_view);
        Ok(MapFirst { inner })
    }

    pub fn rs_is_destroyed(&self) -> bool {
        self.inner.try_borrow().map_or(false, |c| c.is_destroyed())
    }
}

impl Drop for MapFirst {
    // Native listeners hold closures owned by the adapter; unregister them
    // before those closures are freed.
    fn drop(&mut self) {
        if let Ok(mut core) = self.inner.try_borrow_mut() {
            let _ = core.destroy();
        }
    }
}
