//! Engine-neutral viewport access.
//!
//! Every supported map engine gets one `MapAdapter` implementation. The
//! clusterer and the orchestrator only ever talk to this trait, so the same
//! grouping is produced whatever engine draws the map.

use crate::error::AdapterError;
use crate::model::{Bounds, LngLat, ScreenPoint};

pub type ListenerId = u32;

/// Invoked after the viewport moved, zoomed, rotated or tilted.
pub type ViewportHandler = Box<dyn FnMut()>;

pub trait MapAdapter {
    fn center(&self) -> Result<LngLat, AdapterError>;

    fn zoom(&self) -> Result<f64, AdapterError>;

    /// Degrees in (-180, 180], clockwise from north.
    fn bearing(&self) -> Result<f64, AdapterError>;

    /// Degrees of tilt away from top-down.
    fn pitch(&self) -> Result<f64, AdapterError>;

    /// Visible area. `Bounds::ZERO` while the engine cannot tell yet.
    fn bounds(&self) -> Bounds;

    /// Viewport pixels for a coordinate. Points the engine cannot project
    /// yet come back as `ScreenPoint::ORIGIN`; off-screen points may be
    /// approximate.
    fn project(&self, lng: f64, lat: f64) -> ScreenPoint;

    /// Subscribes to every move/zoom/rotate/pitch notification of the engine.
    fn on_viewport_change(&mut self, handler: ViewportHandler) -> ListenerId;

    /// Unknown ids are ignored.
    fn off_viewport_change(&mut self, id: ListenerId);

    /// Releases every native registration. Safe to call more than once.
    fn destroy(&mut self);
}

impl<A: MapAdapter + ?Sized> MapAdapter for Box<A> {
    fn center(&self) -> Result<LngLat, AdapterError> { (**self).center() }
    fn zoom(&self) -> Result<f64, AdapterError> { (**self).zoom() }
    fn bearing(&self) -> Result<f64, AdapterError> { (**self).bearing() }
    fn pitch(&self) -> Result<f64, AdapterError> { (**self).pitch() }
    fn bounds(&self) -> Bounds { (**self).bounds() }
    fn project(&self, lng: f64, lat: f64) -> ScreenPoint { (**self).project(lng, lat) }
    fn on_viewport_change(&mut self, handler: ViewportHandler) -> ListenerId {
        (**self).on_viewport_change(handler)
    }
    fn off_viewport_change(&mut self, id: ListenerId) { (**self).off_viewport_change(id) }
    fn destroy(&mut self) { (**self).destroy() }
}
