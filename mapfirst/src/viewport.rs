//! Headless Web-Mercator viewport.
//!
//! A `MapAdapter` that needs no map engine: it keeps center, zoom, bearing
//! and a pixel size, and projects with the same spherical Mercator math the
//! browser engines use. Useful for server-side clustering and for tests.
//! Pitch is reported but not applied to the projection.

use crate::adapter::{ListenerId, MapAdapter, ViewportHandler};
use crate::error::AdapterError;
use crate::geometry::limits::{clamp_zoom, MERCATOR_MAX_LAT};
use crate::geometry::math::{normalize_bearing, rotate};
use crate::geometry::mercator::{from_world, to_world};
use crate::model::{Bounds, LngLat, ScreenPoint};

pub struct StaticViewport {
    center: LngLat,
    zoom: f64,
    bearing: f64,
    pitch: f64,
    width: f64,
    height: f64,
    listeners: Vec<(ListenerId, ViewportHandler)>,
    next_listener: ListenerId,
    destroyed: bool,
}

impl StaticViewport {
    pub fn new(center: LngLat, zoom: f64, width: f64, height: f64) -> Self {
        StaticViewport {
            center,
            zoom: clamp_zoom(zoom),
            bearing: 0.0,
            pitch: 0.0,
            width: width.max(0.0),
            height: height.max(0.0),
            listeners: Vec::new(),
            next_listener: 1,
            destroyed: false,
        }
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = normalize_bearing(bearing);
        self
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = if pitch.is_finite() { pitch.max(0.0).min(85.0) } else { 0.0 };
        self
    }

    pub fn size(&self) -> (f64, f64) { (self.width, self.height) }

    pub fn listener_count(&self) -> usize { self.listeners.len() }

    pub fn is_destroyed(&self) -> bool { self.destroyed }

    /// Moves the camera and notifies subscribers.
    pub fn jump_to(&mut self, center: LngLat, zoom: f64) {
        self.center = center;
        self.zoom = clamp_zoom(zoom);
        self.notify();
    }

    pub fn rotate_to(&mut self, bearing: f64) {
        self.bearing = normalize_bearing(bearing);
        self.notify();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.notify();
    }

    fn notify(&mut self) {
        for (_, h) in self.listeners.iter_mut() { h(); }
    }

    fn unproject(&self, x: f64, y: f64) -> LngLat {
        let (cx, cy) = to_world(self.center.lng, self.center.lat, self.zoom);
        let (dx, dy) = rotate(x - self.width / 2.0, y - self.height / 2.0, self.bearing);
        let (lng, lat) = from_world(cx + dx, cy + dy, self.zoom);
        LngLat { lng, lat }
    }
}

impl MapAdapter for StaticViewport {
    fn center(&self) -> Result<LngLat, AdapterError> {
        if self.destroyed { return Err(AdapterError::Destroyed); }
        Ok(self.center)
    }

    fn zoom(&self) -> Result<f64, AdapterError> {
        if self.destroyed { return Err(AdapterError::Destroyed); }
        Ok(self.zoom)
    }

    fn bearing(&self) -> Result<f64, AdapterError> {
        if self.destroyed { return Err(AdapterError::Destroyed); }
        Ok(self.bearing)
    }

    fn pitch(&self) -> Result<f64, AdapterError> {
        if self.destroyed { return Err(AdapterError::Destroyed); }
        Ok(self.pitch)
    }

    fn bounds(&self) -> Bounds {
        if self.destroyed || self.width <= 0.0 || self.height <= 0.0 { return Bounds::ZERO; }
        let corners = [
            self.unproject(0.0, 0.0),
            self.unproject(self.width, 0.0),
            self.unproject(0.0, self.height),
            self.unproject(self.width, self.height),
        ];
        let mut sw = LngLat { lng: f64::INFINITY, lat: f64::INFINITY };
        let mut ne = LngLat { lng: f64::NEG_INFINITY, lat: f64::NEG_INFINITY };
        for c in corners {
            sw.lng = sw.lng.min(c.lng); sw.lat = sw.lat.min(c.lat);
            ne.lng = ne.lng.max(c.lng); ne.lat = ne.lat.max(c.lat);
        }
        sw.lat = sw.lat.max(-MERCATOR_MAX_LAT);
        ne.lat = ne.lat.min(MERCATOR_MAX_LAT);
        Bounds { sw, ne }
    }

    fn project(&self, lng: f64, lat: f64) -> ScreenPoint {
        if self.destroyed || !lng.is_finite() || !lat.is_finite() { return ScreenPoint::ORIGIN; }
        let (cx, cy) = to_world(self.center.lng, self.center.lat, self.zoom);
        let (px, py) = to_world(lng, lat, self.zoom);
        let (dx, dy) = rotate(px - cx, py - cy, -self.bearing);
        ScreenPoint { x: dx + self.width / 2.0, y: dy + self.height / 2.0 }
    }

    fn on_viewport_change(&mut self, handler: ViewportHandler) -> ListenerId {
        let id = self.next_listener;
        self.next_listener = self.next_listener.wrapping_add(1);
        if !self.destroyed { self.listeners.push((id, handler)); }
        id
    }

    fn off_viewport_change(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    fn destroy(&mut self) {
        self.listeners.clear();
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn center_projects_to_middle() {
        let v = StaticViewport::new(LngLat::new(2.35, 48.85), 12.0, 800.0, 600.0);
        let p = v.project(2.35, 48.85);
        assert!((p.x - 400.0).abs() < 1e-6 && (p.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn east_is_right_north_is_up() {
        let v = StaticViewport::new(LngLat::new(0.0, 0.0), 5.0, 400.0, 400.0);
        assert!(v.project(1.0, 0.0).x > 200.0);
        assert!(v.project(0.0, 1.0).y < 200.0);
    }

    #[test]
    fn bearing_rotates_east_to_top() {
        let v = StaticViewport::new(LngLat::new(0.0, 0.0), 5.0, 400.0, 400.0).with_bearing(90.0);
        let p = v.project(1.0, 0.0);
        assert!((p.x - 200.0).abs() < 1e-6);
        assert!(p.y < 200.0);
    }

    #[test]
    fn bounds_contain_center_and_unproject_corners() {
        let v = StaticViewport::new(LngLat::new(10.0, 45.0), 8.0, 1024.0, 768.0);
        let b = v.bounds();
        assert!(b.contains(LngLat::new(10.0, 45.0)));
        let sw = v.project(b.sw.lng, b.sw.lat);
        assert!(sw.x.abs() < 1e-6 && (sw.y - 768.0).abs() < 1e-6);
        assert_eq!(StaticViewport::new(LngLat::default(), 3.0, 0.0, 0.0).bounds(), Bounds::ZERO);
    }

    #[test]
    fn listeners_fire_and_are_released() {
        let hits = Rc::new(Cell::new(0));
        let mut v = StaticViewport::new(LngLat::default(), 2.0, 100.0, 100.0);
        let h = hits.clone();
        let id = v.on_viewport_change(Box::new(move || h.set(h.get() + 1)));
        v.jump_to(LngLat::new(1.0, 1.0), 3.0);
        v.rotate_to(45.0);
        assert_eq!(hits.get(), 2);
        v.off_viewport_change(id);
        v.jump_to(LngLat::new(2.0, 2.0), 3.0);
        assert_eq!(hits.get(), 2);

        let h = hits.clone();
        v.on_viewport_change(Box::new(move || h.set(h.get() + 10)));
        v.destroy();
        v.destroy();
        assert_eq!(v.listener_count(), 0);
        assert!(v.center().is_err());
        assert_eq!(v.project(1.0, 1.0), ScreenPoint::ORIGIN);
    }
}
