#[inline]
pub fn dist_sq(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1; let dy = y2 - y1;
    dx*dx + dy*dy
}

#[inline]
pub fn finite_or_zero(v: f64) -> f64 { if v.is_finite() { v } else { 0.0 } }

/// Wraps an angle in degrees into (-180, 180].
pub fn normalize_bearing(deg: f64) -> f64 {
    if !deg.is_finite() { return 0.0; }
    let mut b = deg % 360.0;
    if b <= -180.0 { b += 360.0; }
    if b > 180.0 { b -= 360.0; }
    b
}

/// Rotates (x, y) clockwise by `deg` on a y-down screen.
#[inline]
pub fn rotate(x: f64, y: f64, deg: f64) -> (f64, f64) {
    let (s, c) = deg.to_radians().sin_cos();
    (x*c - y*s, x*s + y*c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_wraps_into_half_open_range() {
        assert_eq!(normalize_bearing(0.0), 0.0);
        assert_eq!(normalize_bearing(180.0), 180.0);
        assert_eq!(normalize_bearing(-180.0), 180.0);
        assert_eq!(normalize_bearing(270.0), -90.0);
        assert_eq!(normalize_bearing(-450.0), -90.0);
        assert_eq!(normalize_bearing(f64::NAN), 0.0);
    }

    #[test]
    fn rotate_quarter_turn() {
        let (x, y) = rotate(1.0, 0.0, 90.0);
        assert!((x - 0.0).abs() < 1e-12);
        assert!((y - 1.0).abs() < 1e-12);
    }
}
