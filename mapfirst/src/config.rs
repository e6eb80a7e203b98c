//! Clustering configuration.
//!
//! The breakpoint tables are product-tuned values. They are kept as data so a
//! host can override them, and `validate` only checks that they describe a
//! usable step function.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::model::PropertyType;

/// Pixel threshold in effect from `min_zoom` up to the next breakpoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdStep {
    pub min_zoom: f64,
    pub pixels: f64,
}

const fn step(min_zoom: f64, pixels: f64) -> ThresholdStep {
    ThresholdStep { min_zoom, pixels }
}

pub const DEFAULT_PRIMARY_THRESHOLDS: [ThresholdStep; 6] = [
    step(0.0, 80.0),
    step(10.0, 64.0),
    step(12.0, 56.0),
    step(14.0, 48.0),
    step(16.0, 40.0),
    step(18.0, 32.0),
];

pub const DEFAULT_DOT_THRESHOLDS: [ThresholdStep; 6] = [
    step(0.0, 120.0),
    step(10.0, 96.0),
    step(12.0, 84.0),
    step(14.0, 72.0),
    step(16.0, 60.0),
    step(18.0, 48.0),
];

pub const DEFAULT_MIN_THRESHOLD_PX: f64 = 8.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterConfig {
    pub primary_thresholds: Vec<ThresholdStep>,
    pub dot_thresholds: Vec<ThresholdStep>,
    /// Ground radius that replaces the primary table when set.
    pub primary_radius_meters: Option<f64>,
    /// Ground radius that replaces the dot table when set.
    pub dot_radius_meters: Option<f64>,
    pub min_threshold_px: f64,
    pub default_primary_type: PropertyType,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            primary_thresholds: DEFAULT_PRIMARY_THRESHOLDS.to_vec(),
            dot_thresholds: DEFAULT_DOT_THRESHOLDS.to_vec(),
            primary_radius_meters: None,
            dot_radius_meters: None,
            min_threshold_px: DEFAULT_MIN_THRESHOLD_PX,
            default_primary_type: PropertyType::Accommodation,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_table("primaryThresholds", &self.primary_thresholds)?;
        validate_table("dotThresholds", &self.dot_thresholds)?;
        if let Some(m) = self.primary_radius_meters {
            if !(m.is_finite() && m > 0.0) {
                return Err(ConfigError::InvalidRadius("primaryRadiusMeters"));
            }
        }
        if let Some(m) = self.dot_radius_meters {
            if !(m.is_finite() && m > 0.0) {
                return Err(ConfigError::InvalidRadius("dotRadiusMeters"));
            }
        }
        if !(self.min_threshold_px.is_finite() && self.min_threshold_px > 0.0) {
            return Err(ConfigError::InvalidFloor);
        }
        Ok(())
    }

    pub fn from_json_value(v: Value) -> Result<ClusterConfig, ConfigError> {
        let cfg: ClusterConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Json(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> Result<ClusterConfig, ConfigError> {
        let cfg: ClusterConfig =
            serde_json::from_str(s).map_err(|e| ConfigError::Json(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn validate_table(name: &'static str, table: &[ThresholdStep]) -> Result<(), ConfigError> {
    if table.is_empty() {
        return Err(ConfigError::EmptyTable(name));
    }
    for (i, s) in table.iter().enumerate() {
        if !s.min_zoom.is_finite() {
            return Err(ConfigError::UnorderedTable { table: name, index: i });
        }
        if !(s.pixels.is_finite() && s.pixels > 0.0) {
            return Err(ConfigError::InvalidPixels { table: name, index: i });
        }
        if i > 0 {
            let prev = table[i - 1];
            if s.min_zoom <= prev.min_zoom {
                return Err(ConfigError::UnorderedTable { table: name, index: i });
            }
            if s.pixels > prev.pixels {
                return Err(ConfigError::InvalidPixels { table: name, index: i });
            }
        }
    }
    Ok(())
}
