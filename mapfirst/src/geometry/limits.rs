// Centralized ingestion limits for data handed over by the host application

// Property list cap; larger lists are rejected by `set_markers`
pub const MAX_PROPERTIES: usize = 50_000;

// Geographic bounds
pub const LAT_MIN: f64 = -90.0;
pub const LAT_MAX: f64 = 90.0;
pub const LNG_MIN: f64 = -180.0;
pub const LNG_MAX: f64 = 180.0;

// Web-Mercator cannot represent the poles; projection clamps to this latitude
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_6;

// Zoom range accepted by every supported engine
pub const ZOOM_MIN: f64 = 0.0;
pub const ZOOM_MAX: f64 = 24.0;

#[inline]
pub fn in_lat_bounds(lat: f64) -> bool { lat.is_finite() && lat >= LAT_MIN && lat <= LAT_MAX }

#[inline]
pub fn in_lng_bounds(lng: f64) -> bool { lng.is_finite() && lng >= LNG_MIN && lng <= LNG_MAX }

#[inline]
pub fn clamp_zoom(z: f64) -> f64 { if z.is_finite() { z.max(ZOOM_MIN).min(ZOOM_MAX) } else { ZOOM_MIN } }
