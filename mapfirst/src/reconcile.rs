//! Keyed marker reconciliation.
//!
//! The reconciler owns every native marker handle. Each render diffs the new
//! cluster output against a table keyed by `ClusterDisplayItem::key`:
//!
//! - exact key hit: the marker only moves;
//! - same property id and kind under another key: only the style changed, so
//!   the handle is kept, its element restyled in place and the entry re-keyed;
//! - otherwise: a new native marker is created.
//!
//! Entries whose key disappeared are removed. Native failures are logged and
//! confined to the one marker involved; the rest of the batch still renders.
//! Every handle that was successfully created is removed exactly once, either
//! by eviction, by replacement or by `destroy`.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::MarkerError;
use crate::model::{ClusterDisplayItem, LngLat, MarkerKind, MarkerStyle, PropertyId, PropertyType};

/// The four native primitives an engine must provide.
pub trait MarkerBackend {
    type Handle;
    type Element;

    /// `Ok(None)` means the engine declined to show anything for this item.
    fn create_marker(
        &mut self,
        element: Self::Element,
        at: LngLat,
        item: &ClusterDisplayItem,
    ) -> Result<Option<Self::Handle>, MarkerError>;

    fn remove_marker(&mut self, handle: Self::Handle) -> Result<(), MarkerError>;

    fn update_position(&mut self, handle: &Self::Handle, at: LngLat) -> Result<(), MarkerError>;

    fn element(&self, handle: &Self::Handle) -> Option<Self::Element>;
}

impl<B: MarkerBackend + ?Sized> MarkerBackend for Box<B> {
    type Handle = B::Handle;
    type Element = B::Element;

    fn create_marker(
        &mut self,
        element: Self::Element,
        at: LngLat,
        item: &ClusterDisplayItem,
    ) -> Result<Option<Self::Handle>, MarkerError> {
        (**self).create_marker(element, at, item)
    }

    fn remove_marker(&mut self, handle: Self::Handle) -> Result<(), MarkerError> {
        (**self).remove_marker(handle)
    }

    fn update_position(&mut self, handle: &Self::Handle, at: LngLat) -> Result<(), MarkerError> {
        (**self).update_position(handle, at)
    }

    fn element(&self, handle: &Self::Handle) -> Option<Self::Element> {
        (**self).element(handle)
    }
}

/// Builds and restyles the visual element of a marker.
pub trait ElementFactory<E> {
    /// `None` means there is nothing to show for this item.
    fn build(&mut self, item: &ClusterDisplayItem, style: &MarkerStyle) -> Option<E>;

    fn restyle(&mut self, element: &E, item: &ClusterDisplayItem, style: &MarkerStyle) -> Result<(), MarkerError>;
}

#[derive(Debug)]
pub struct MarkerEntry<H> {
    pub key: String,
    pub handle: H,
    pub kind: MarkerKind,
    pub property_id: PropertyId,
    pub parent_id: Option<PropertyId>,
}

/// Counters for one render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub created: usize,
    pub reused: usize,
    pub moved: usize,
    pub removed: usize,
    pub failed: usize,
    /// Items the factory or engine chose not to show.
    pub skipped: usize,
}

impl RenderStats {
    /// True when the pass touched no native marker lifecycle.
    pub fn is_steady(&self) -> bool {
        self.created == 0 && self.removed == 0 && self.reused == 0
    }
}

pub struct MarkerReconciler<B: MarkerBackend> {
    backend: B,
    factory: Box<dyn ElementFactory<B::Element>>,
    entries: HashMap<String, MarkerEntry<B::Handle>>,
    primary_type: PropertyType,
    selected_id: Option<PropertyId>,
}

impl<B: MarkerBackend> MarkerReconciler<B> {
    pub fn new(backend: B, factory: Box<dyn ElementFactory<B::Element>>) -> Self {
        MarkerReconciler {
            backend,
            factory,
            entries: HashMap::new(),
            primary_type: PropertyType::default(),
            selected_id: None,
        }
    }

    pub fn backend(&self) -> &B { &self.backend }

    pub fn backend_mut(&mut self) -> &mut B { &mut self.backend }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn contains_key(&self, key: &str) -> bool { self.entries.contains_key(key) }

    pub fn entry(&self, key: &str) -> Option<&MarkerEntry<B::Handle>> { self.entries.get(key) }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.entries.keys().map(String::as_str) }

    pub fn primary_type(&self) -> PropertyType { self.primary_type }

    pub fn selected_id(&self) -> Option<PropertyId> { self.selected_id }

    pub fn render(
        &mut self,
        items: &[ClusterDisplayItem],
        primary_type: PropertyType,
        selected_id: Option<PropertyId>,
    ) -> RenderStats {
        self.primary_type = primary_type;
        self.selected_id = selected_id;
        let mut stats = RenderStats::default();

        let incoming: HashSet<&str> = items.iter().map(|i| i.key()).collect();

        // Pull stale entries out of the table, indexed by identity so a pure
        // style change can pick its old handle back up.
        let stale_keys: Vec<String> =
            self.entries.keys().filter(|k| !incoming.contains(k.as_str())).cloned().collect();
        let mut stale: HashMap<(PropertyId, MarkerKind), MarkerEntry<B::Handle>> = HashMap::new();
        for k in stale_keys {
            let Some(e) = self.entries.remove(&k) else { continue; };
            if let Some(prev) = stale.insert((e.property_id, e.kind), e) {
                self.release(prev, &mut stats);
            }
        }

        let claimed: HashSet<(PropertyId, MarkerKind)> = items
            .iter()
            .filter(|i| !self.entries.contains_key(i.key()))
            .map(|i| (i.id(), i.kind()))
            .filter(|id| stale.contains_key(id))
            .collect();
        let unclaimed: Vec<(PropertyId, MarkerKind)> =
            stale.keys().filter(|id| !claimed.contains(id)).copied().collect();
        for id in unclaimed {
            if let Some(e) = stale.remove(&id) { self.release(e, &mut stats); }
        }

        let mut done: HashSet<&str> = HashSet::with_capacity(items.len());
        for item in items {
            // Duplicate keys in one batch would share a single marker.
            if !done.insert(item.key()) { continue; }
            let Some(at) = item.position() else {
                stats.skipped += 1;
                continue;
            };
            if self.entries.contains_key(item.key()) {
                self.move_existing(item, at, &mut stats);
            } else if let Some(prev) = stale.remove(&(item.id(), item.kind())) {
                self.reuse(prev, item, at, &mut stats);
            } else {
                self.create(item, at, &mut stats);
            }
        }
        // Reached only when an item was skipped after claiming a handle.
        for (_, e) in stale.drain() {
            self.release(e, &mut stats);
        }

        debug!(
            created = stats.created,
            reused = stats.reused,
            moved = stats.moved,
            removed = stats.removed,
            failed = stats.failed,
            live = self.entries.len(),
            "markers reconciled"
        );
        stats
    }

    /// Removes every live marker.
    pub fn destroy(&mut self) -> RenderStats {
        let mut stats = RenderStats::default();
        let all: Vec<MarkerEntry<B::Handle>> = self.entries.drain().map(|(_, e)| e).collect();
        for e in all { self.release(e, &mut stats); }
        stats
    }

    fn style(&self, item: &ClusterDisplayItem) -> MarkerStyle {
        MarkerStyle::for_item(item, self.primary_type, self.selected_id)
    }

    fn release(&mut self, e: MarkerEntry<B::Handle>, stats: &mut RenderStats) {
        stats.removed += 1;
        if let Err(err) = self.backend.remove_marker(e.handle) {
            warn!(key = %e.key, error = %err, "marker removal failed; leaving it behind");
        }
    }

    fn move_existing(&mut self, item: &ClusterDisplayItem, at: LngLat, stats: &mut RenderStats) {
        let Some(e) = self.entries.get(item.key()) else { return; };
        match self.backend.update_position(&e.handle, at) {
            Ok(()) => stats.moved += 1,
            Err(err) => {
                warn!(key = %item.key(), error = %err, "marker move failed; recreating");
                stats.failed += 1;
                if let Some(e) = self.entries.remove(item.key()) { self.release(e, stats); }
                self.create(item, at, stats);
            }
        }
    }

    fn reuse(&mut self, prev: MarkerEntry<B::Handle>, item: &ClusterDisplayItem, at: LngLat, stats: &mut RenderStats) {
        let style = self.style(item);
        let restyled = match self.backend.element(&prev.handle) {
            Some(el) => self.factory.restyle(&el, item, &style),
            None => Err(MarkerError::Restyle("marker has no element".to_string())),
        };
        let outcome = restyled.and_then(|()| self.backend.update_position(&prev.handle, at));
        match outcome {
            Ok(()) => {
                stats.reused += 1;
                self.entries.insert(
                    item.key().to_string(),
                    MarkerEntry {
                        key: item.key().to_string(),
                        handle: prev.handle,
                        kind: item.kind(),
                        property_id: item.id(),
                        parent_id: item.parent_id(),
                    },
                );
            }
            Err(err) => {
                warn!(key = %item.key(), error = %err, "in-place restyle failed; recreating");
                stats.failed += 1;
                self.release(prev, stats);
                self.create(item, at, stats);
            }
        }
    }

    fn create(&mut self, item: &ClusterDisplayItem, at: LngLat, stats: &mut RenderStats) {
        let style = self.style(item);
        let Some(element) = self.factory.build(item, &style) else {
            stats.skipped += 1;
            return;
        };
        match self.backend.create_marker(element, at, item) {
            Ok(Some(handle)) => {
                stats.created += 1;
                self.entries.insert(
                    item.key().to_string(),
                    MarkerEntry {
                        key: item.key().to_string(),
                        handle,
                        kind: item.kind(),
                        property_id: item.id(),
                        parent_id: item.parent_id(),
                    },
                );
            }
            Ok(None) => stats.skipped += 1,
            Err(err) => {
                warn!(key = %item.key(), error = %err, "marker creation failed");
                stats.failed += 1;
            }
        }
    }
}
