use tracing::debug;

use crate::adapter::MapAdapter;
use crate::error::AdapterError;
use crate::geometry::math::normalize_bearing;
use crate::model::ViewState;

fn read(adapter: &dyn MapAdapter) -> Result<ViewState, AdapterError> {
    let center = adapter.center()?;
    Ok(ViewState {
        longitude: center.lng,
        latitude: center.lat,
        zoom: adapter.zoom()?,
        bearing: normalize_bearing(adapter.bearing()?),
        pitch: adapter.pitch()?,
    })
}

/// Point-in-time snapshot of the viewport, or `None` when the engine cannot
/// answer (not loaded yet, torn down, garbage values).
pub fn extract_view_state(adapter: &dyn MapAdapter) -> Option<ViewState> {
    match read(adapter) {
        Ok(v) if v.is_finite() => Some(v),
        Ok(v) => {
            debug!(?v, "discarding non-finite view state");
            None
        }
        Err(e) => {
            debug!(error = %e, "view state unavailable");
            None
        }
    }
}
