use crate::config::{ClusterConfig, ThresholdStep};
use crate::geometry::mercator::meters_to_pixels;

/// Pixel distances in effect for one render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub primary: f64,
    pub dot: f64,
}

/// Step-function lookup: the last breakpoint whose `min_zoom` is <= `zoom`.
/// Zooms below the first breakpoint use the first entry.
pub fn resolve_step(table: &[ThresholdStep], zoom: f64) -> Option<f64> {
    let first = table.first()?;
    if !zoom.is_finite() { return Some(first.pixels); }
    let mut px = first.pixels;
    for s in table {
        if s.min_zoom <= zoom { px = s.pixels; } else { break; }
    }
    Some(px)
}

impl Thresholds {
    pub fn resolve(config: &ClusterConfig, zoom: f64, lat: f64) -> Thresholds {
        let floor = config.min_threshold_px;
        let pick = |radius: Option<f64>, table: &[ThresholdStep]| match radius {
            Some(m) => meters_to_pixels(m, lat, zoom, floor),
            None => resolve_step(table, zoom).unwrap_or(floor),
        };
        Thresholds {
            primary: pick(config.primary_radius_meters, &config.primary_thresholds),
            dot: pick(config.dot_radius_meters, &config.dot_thresholds),
        }
    }
}
