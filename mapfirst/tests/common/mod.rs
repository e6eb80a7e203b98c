#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use mapfirst::adapter::{ListenerId, MapAdapter, ViewportHandler};
use mapfirst::error::{AdapterError, MarkerError};
use mapfirst::model::{
    Bounds, ClusterDisplayItem, LngLat, MarkerStyle, PropertyId, ScreenPoint,
};
use mapfirst::reconcile::{ElementFactory, MarkerBackend};

/// Maps one degree to `scale` pixels on both axes, y pointing down from lat 0.
pub struct PixelAdapter {
    pub scale: f64,
    pub zoom: f64,
    pub center: LngLat,
    pub bounds: Bounds,
    pub fail: bool,
    pub listeners: Vec<(ListenerId, ViewportHandler)>,
    pub next_id: ListenerId,
    pub destroy_calls: usize,
}

impl PixelAdapter {
    pub fn new(scale: f64, zoom: f64) -> Self {
        PixelAdapter {
            scale,
            zoom,
            center: LngLat::default(),
            bounds: Bounds::ZERO,
            fail: false,
            listeners: Vec::new(),
            next_id: 1,
            destroy_calls: 0,
        }
    }
}

impl MapAdapter for PixelAdapter {
    fn center(&self) -> Result<LngLat, AdapterError> {
        if self.fail { Err(AdapterError::Unavailable("center")) } else { Ok(self.center) }
    }
    fn zoom(&self) -> Result<f64, AdapterError> {
        if self.fail { Err(AdapterError::Unavailable("zoom")) } else { Ok(self.zoom) }
    }
    fn bearing(&self) -> Result<f64, AdapterError> { Ok(0.0) }
    fn pitch(&self) -> Result<f64, AdapterError> { Ok(0.0) }
    fn bounds(&self) -> Bounds { self.bounds }
    fn project(&self, lng: f64, lat: f64) -> ScreenPoint {
        ScreenPoint::new(lng * self.scale, -lat * self.scale)
    }
    fn on_viewport_change(&mut self, handler: ViewportHandler) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, handler));
        id
    }
    fn off_viewport_change(&mut self, id: ListenerId) {
        self.listeners.retain(|(l, _)| *l != id);
    }
    fn destroy(&mut self) {
        self.destroy_calls += 1;
        self.listeners.clear();
    }
}

#[derive(Debug, Default)]
pub struct FakeElement {
    pub built_for: String,
    pub styles: Vec<MarkerStyle>,
}

pub type ElementRef = Rc<RefCell<FakeElement>>;

/// Native marker stand-in that records every call.
#[derive(Default)]
pub struct RecordingBackend {
    pub next: u64,
    pub live: HashMap<u64, (ElementRef, LngLat)>,
    pub creates: usize,
    pub removes: usize,
    pub updates: usize,
    pub fail_create: HashSet<PropertyId>,
    pub decline_create: HashSet<PropertyId>,
    pub fail_update: HashSet<u64>,
    pub fail_remove: bool,
}

impl MarkerBackend for RecordingBackend {
    type Handle = u64;
    type Element = ElementRef;

    fn create_marker(&mut self, element: ElementRef, at: LngLat, item: &ClusterDisplayItem) -> Result<Option<u64>, MarkerError> {
        if self.fail_create.contains(&item.id()) {
            return Err(MarkerError::Create(format!("rejected {}", item.id())));
        }
        if self.decline_create.contains(&item.id()) {
            return Ok(None);
        }
        self.next += 1;
        self.creates += 1;
        self.live.insert(self.next, (element, at));
        Ok(Some(self.next))
    }

    fn remove_marker(&mut self, handle: u64) -> Result<(), MarkerError> {
        self.removes += 1;
        if self.fail_remove {
            return Err(MarkerError::Remove("engine refused".into()));
        }
        self.live.remove(&handle);
        Ok(())
    }

    fn update_position(&mut self, handle: &u64, at: LngLat) -> Result<(), MarkerError> {
        if self.fail_update.contains(handle) {
            return Err(MarkerError::Update("stale handle".into()));
        }
        self.updates += 1;
        if let Some(slot) = self.live.get_mut(handle) { slot.1 = at; }
        Ok(())
    }

    fn element(&self, handle: &u64) -> Option<ElementRef> {
        self.live.get(handle).map(|(el, _)| el.clone())
    }
}

#[derive(Default)]
pub struct TestFactory {
    pub hide: HashSet<PropertyId>,
    pub fail_restyle: bool,
}

impl ElementFactory<ElementRef> for TestFactory {
    fn build(&mut self, item: &ClusterDisplayItem, style: &MarkerStyle) -> Option<ElementRef> {
        if self.hide.contains(&item.id()) {
            return None;
        }
        Some(Rc::new(RefCell::new(FakeElement { built_for: item.key().to_string(), styles: vec![*style] })))
    }

    fn restyle(&mut self, element: &ElementRef, _item: &ClusterDisplayItem, style: &MarkerStyle) -> Result<(), MarkerError> {
        if self.fail_restyle {
            return Err(MarkerError::Restyle("detached".into()));
        }
        element.borrow_mut().styles.push(*style);
        Ok(())
    }
}
