// Spherical Web-Mercator helpers (EPSG:3857, 256 px tiles)

use std::f64::consts::PI;

use super::limits::{clamp_zoom, MERCATOR_MAX_LAT};

pub const TILE_SIZE: f64 = 256.0;
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Ground resolution at the equator, zoom 0: 2πR / 256.
pub const METERS_PER_PIXEL_Z0: f64 = 156_543.033_92;

#[inline]
pub fn world_size(zoom: f64) -> f64 { TILE_SIZE * 2f64.powf(clamp_zoom(zoom)) }

/// Ground meters covered by one screen pixel at `lat`/`zoom`.
pub fn meters_per_pixel(lat: f64, zoom: f64) -> f64 {
    let lat = if lat.is_finite() { lat.max(-MERCATOR_MAX_LAT).min(MERCATOR_MAX_LAT) } else { 0.0 };
    METERS_PER_PIXEL_Z0 * lat.to_radians().cos() / 2f64.powf(clamp_zoom(zoom))
}

/// Converts a ground radius into screen pixels, never below `min_px`.
pub fn meters_to_pixels(meters: f64, lat: f64, zoom: f64, min_px: f64) -> f64 {
    let mpp = meters_per_pixel(lat, zoom);
    let raw = if mpp > 0.0 { meters / mpp } else { 0.0 };
    if raw.is_finite() && raw > min_px { raw } else { min_px }
}

/// Projects lng/lat to world pixels at `zoom`, origin at the north-west corner.
pub fn to_world(lng: f64, lat: f64, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = lat.max(-MERCATOR_MAX_LAT).min(MERCATOR_MAX_LAT);
    let x = (lng + 180.0) / 360.0 * size;
    let phi = lat.to_radians();
    let y = (1.0 - (phi.tan() + 1.0 / phi.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

pub fn from_world(x: f64, y: f64, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / size;
    let lat = n.sinh().atan().to_degrees();
    (lng, lat)
}
