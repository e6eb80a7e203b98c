pub mod adapter;
pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod view_state;
pub mod viewport;
pub mod geometry {
    pub mod limits;
    pub mod math;
    pub mod mercator;
}
pub mod algorithms {
    pub mod clustering;
    pub mod ranking;
    pub mod thresholds;
    pub mod union_find;
}

use adapter::MapAdapter;
use algorithms::clustering::{cluster_properties, ClusterRequest};
use config::ClusterConfig;
use error::CoreError;
use geometry::limits::MAX_PROPERTIES;
use model::{ClusterDisplayItem, LngLat, Property, PropertyId, PropertyType, ViewState};
use reconcile::{MarkerBackend, MarkerReconciler, RenderStats};
use tracing::debug;

pub use view_state::extract_view_state;

/// Called after every render with the clusters and the view they came from.
pub type RenderObserver = Box<dyn FnMut(&[ClusterDisplayItem], Option<&ViewState>)>;

/// Owns the property list, selection and primary category, and drives
/// project → cluster → reconcile for one map.
pub struct MapFirstCore<A: MapAdapter, B: MarkerBackend> {
    adapter: A,
    reconciler: MarkerReconciler<B>,
    config: ClusterConfig,
    properties: Vec<Property>,
    primary_override: Option<PropertyType>,
    selected_id: Option<PropertyId>,
    clusters: Vec<ClusterDisplayItem>,
    last_stats: RenderStats,
    observer: Option<RenderObserver>,
    destroyed: bool,
}

impl<A: MapAdapter, B: MarkerBackend> MapFirstCore<A, B> {
    pub fn new(adapter: A, reconciler: MarkerReconciler<B>, config: ClusterConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(MapFirstCore {
            adapter,
            reconciler,
            config,
            properties: Vec::new(),
            primary_override: None,
            selected_id: None,
            clusters: Vec::new(),
            last_stats: RenderStats::default(),
            observer: None,
            destroyed: false,
        })
    }

    fn ensure_live(&self) -> Result<(), CoreError> {
        if self.destroyed { Err(CoreError::Destroyed) } else { Ok(()) }
    }

    pub fn is_destroyed(&self) -> bool { self.destroyed }

    pub fn adapter(&self) -> &A { &self.adapter }

    pub fn adapter_mut(&mut self) -> &mut A { &mut self.adapter }

    pub fn reconciler(&self) -> &MarkerReconciler<B> { &self.reconciler }

    pub fn config(&self) -> &ClusterConfig { &self.config }

    pub fn properties(&self) -> &[Property] { &self.properties }

    pub fn selected_id(&self) -> Option<PropertyId> { self.selected_id }

    /// Clusters produced by the last render.
    pub fn get_clusters(&self) -> &[ClusterDisplayItem] { &self.clusters }

    pub fn last_stats(&self) -> RenderStats { self.last_stats }

    /// Explicit override, else the category of the first property that has
    /// one, else the configured default.
    pub fn primary_type(&self) -> PropertyType {
        self.primary_override
            .or_else(|| self.properties.iter().find_map(|p| p.property_type))
            .unwrap_or(self.config.default_primary_type)
    }

    pub fn set_observer(&mut self, observer: Option<RenderObserver>) -> Result<(), CoreError> {
        self.ensure_live()?;
        self.observer = observer;
        Ok(())
    }

    /// Replaces the whole property list and re-renders. Lists over
    /// `MAX_PROPERTIES` are rejected and the previous list stays in place.
    pub fn set_markers(&mut self, properties: Vec<Property>) -> Result<(), CoreError> {
        self.ensure_live()?;
        if properties.len() > MAX_PROPERTIES {
            return Err(CoreError::CapsExceeded { count: properties.len(), cap: MAX_PROPERTIES });
        }
        self.properties = properties;
        self.refresh()
    }

    /// `None` returns to the inferred category.
    pub fn set_primary_type(&mut self, primary: Option<PropertyType>) -> Result<(), CoreError> {
        self.ensure_live()?;
        self.primary_override = primary;
        self.refresh()
    }

    pub fn set_selected_marker(&mut self, id: Option<PropertyId>) -> Result<(), CoreError> {
        self.ensure_live()?;
        self.selected_id = id;
        self.refresh()
    }

    /// Re-clusters against the current viewport and updates the markers.
    /// Adapter and marker failures are absorbed; only use-after-destroy errors.
    pub fn refresh(&mut self) -> Result<(), CoreError> {
        self.ensure_live()?;
        let view = extract_view_state(&self.adapter);
        let primary = self.primary_type();
        let req = ClusterRequest {
            properties: &self.properties,
            primary_type: primary,
            selected_id: self.selected_id,
            zoom: view.map_or(0.0, |v| v.zoom),
            latitude: view.map_or(0.0, |v| v.latitude),
        };
        let clusters = cluster_properties(&self.adapter, &req, &self.config);
        self.last_stats = self.reconciler.render(&clusters, primary, self.selected_id);
        self.clusters = clusters;
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.clusters, view.as_ref());
        }
        Ok(())
    }

    /// Properties whose coordinates lie inside the current bounds. Unknown
    /// (zero) bounds count as covering everything.
    pub fn visible_properties(&self) -> Result<Vec<&Property>, CoreError> {
        self.ensure_live()?;
        let bounds = self.adapter.bounds();
        Ok(self
            .properties
            .iter()
            .filter(|p| match p.coordinates() {
                Some(c) => bounds.is_zero() || bounds.contains(LngLat::from(c)),
                None => false,
            })
            .collect())
    }

    /// Tears down every marker and the adapter's listeners. A second call is a no-op.
    pub fn destroy(&mut self) -> Result<(), CoreError> {
        if self.destroyed { return Ok(()); }
        self.destroyed = true;
        let stats = self.reconciler.destroy();
        debug!(removed = stats.removed, "map instance destroyed");
        self.adapter.destroy();
        self.clusters.clear();
        self.properties.clear();
        self.observer = None;
        Ok(())
    }
}
