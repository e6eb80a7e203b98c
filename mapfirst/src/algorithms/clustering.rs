// Screen-space collision clustering.
//
// Points closer than the primary threshold are joined (transitively) into one
// component. Each component shows its best-ranked property as the primary
// marker; members close enough to it become dots, the selected property is
// always promoted, and whatever is left is clustered again on its own.

use std::collections::{HashMap, HashSet};


use super::ranking::pick_winner;
use super::thresholds::Thresholds;
use super::union_find::DisjointSet;
use crate::adapter::MapAdapter;
use crate::config::ClusterConfig;
use crate::geometry::math::finite_or_zero;
use crate::model::{
    ClusterDisplayItem, MarkerKind, MarkerStyle, ProjectedMarker, Property, PropertyId,
    PropertyType,
};

/// Inputs for one clustering pass.
#[derive(Clone, Copy, Debug)]
pub struct ClusterRequest<'a> {
    pub properties: &'a [Property],
    pub primary_type: PropertyType,
    pub selected_id: Option<PropertyId>,
    pub zoom: f64,
    /// Latitude used for meter-radius conversion.
    pub latitude: f64,
}

fn flag(b: bool) -> u8 { b as u8 }

/// Deterministic identity-plus-style key. Any change in kind, parent,
/// category match, selection or pending state yields a different key.
pub fn item_key(p: &Property, parent: Option<PropertyId>, style: &MarkerStyle) -> String {
    let flags = format!(
        "t{}:s{}:p{}",
        flag(style.primary_type),
        flag(style.selected),
        flag(style.pending)
    );
    match (style.kind, parent) {
        (MarkerKind::Dot, Some(parent)) => format!("dot:{}:{}:{}", p.id, parent, flags),
        (MarkerKind::Dot, None) => format!("dot:{}:-:{}", p.id, flags),
        (MarkerKind::Primary, _) => format!("primary:{}:{}", p.id, flags),
    }
}

fn style_of(p: &Property, kind: MarkerKind, primary: PropertyType, selected: Option<PropertyId>) -> MarkerStyle {
    MarkerStyle {
        kind,
        primary_type: p.property_type == Some(primary),
        selected: selected == Some(p.id),
        pending: p.is_pending(),
    }
}

pub fn primary_item(p: &Property, primary: PropertyType, selected: Option<PropertyId>) -> ClusterDisplayItem {
    let style = style_of(p, MarkerKind::Primary, primary, selected);
    ClusterDisplayItem::Primary { key: item_key(p, None, &style), property: p.clone() }
}

pub fn dot_item(p: &Property, parent: PropertyId, primary: PropertyType, selected: Option<PropertyId>) -> ClusterDisplayItem {
    let style = style_of(p, MarkerKind::Dot, primary, selected);
    ClusterDisplayItem::Dot { key: item_key(p, Some(parent), &style), property: p.clone(), parent_id: parent }
}

/// Projects every located property. Missing or malformed coordinates are
/// dropped, as are repeated ids (first occurrence wins).
pub fn project_properties<'a>(adapter: &dyn MapAdapter, properties: &'a [Property]) -> Vec<ProjectedMarker<'a>> {
    let mut seen: HashSet<PropertyId> = HashSet::with_capacity(properties.len());
    let mut out = Vec::with_capacity(properties.len());
    for (index, p) in properties.iter().enumerate() {
        let Some(c) = p.coordinates() else { continue; };
        if !seen.insert(p.id) { continue; }
        let sp = adapter.project(c.lon, c.lat);
        out.push(ProjectedMarker { property: p, index, x: finite_or_zero(sp.x), y: finite_or_zero(sp.y) });
    }
    out
}

// Connected components of `subset` under the primary threshold. A uniform
// grid with cell size == threshold limits pair checks to neighbouring cells.
fn components(markers: &[ProjectedMarker<'_>], subset: &[usize], threshold: f64) -> Vec<Vec<usize>> {
    let cell = if threshold.is_finite() && threshold > 0.0 { threshold } else { 1.0 };
    let key = |m: &ProjectedMarker<'_>| ((m.x / cell).floor() as i64, (m.y / cell).floor() as i64);
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (local, &mi) in subset.iter().enumerate() {
        grid.entry(key(&markers[mi])).or_default().push(local);
    }
    let t2 = threshold * threshold;
    let mut sets = DisjointSet::new(subset.len());
    for (local, &mi) in subset.iter().enumerate() {
        let (cx, cy) = key(&markers[mi]);
        for gx in cx.saturating_sub(1)..=cx.saturating_add(1) {
            for gy in cy.saturating_sub(1)..=cy.saturating_add(1) {
                let Some(bucket) = grid.get(&(gx, gy)) else { continue; };
                for &other in bucket {
                    if other > local && markers[mi].distance_sq(&markers[subset[other]]) <= t2 {
                        sets.union(local, other);
                    }
                }
            }
        }
    }
    sets.groups()
        .into_iter()
        .map(|g| g.into_iter().map(|local| subset[local]).collect())
        .collect()
}

/// Clusters already-projected markers. Pure and deterministic.
pub fn cluster_projected(
    markers: &[ProjectedMarker<'_>],
    primary: PropertyType,
    selected: Option<PropertyId>,
    thresholds: Thresholds,
) -> Vec<ClusterDisplayItem> {
    let mut out = Vec::with_capacity(markers.len());
    if markers.is_empty() { return out; }
    let dot_sq = thresholds.dot * thresholds.dot;
    let all: Vec<usize> = (0..markers.len()).collect();
    // Explicit stack in place of recursion on the leftover members; visits
    // sub-problems in the same depth-first order.
    let mut pending = vec![components(markers, &all, thresholds.primary).into_iter()];
    while let Some(top) = pending.last_mut() {
        let Some(members) = top.next() else {
            pending.pop();
            continue;
        };
        if let [only] = members.as_slice() {
            out.push(primary_item(markers[*only].property, primary, selected));
            continue;
        }
        let props: Vec<&Property> = members.iter().map(|&m| markers[m].property).collect();
        let Some(w) = pick_winner(&props, primary) else { continue; };
        let winner = &markers[members[w]];
        out.push(primary_item(winner.property, primary, selected));

        let mut rest = Vec::new();
        for (i, &m) in members.iter().enumerate() {
            if i == w { continue; }
            let p = markers[m].property;
            if selected == Some(p.id) {
                out.push(primary_item(p, primary, selected));
            } else if markers[m].distance_sq(winner) <= dot_sq {
                out.push(dot_item(p, winner.property.id, primary, selected));
            } else {
                rest.push(m);
            }
        }
        if !rest.is_empty() {
            pending.push(components(markers, &rest, thresholds.primary).into_iter());
        }
    }
    out
}

/// Full pass: project through the adapter, resolve thresholds, cluster.
pub fn cluster_properties(
    adapter: &dyn MapAdapter,
    req: &ClusterRequest<'_>,
    config: &ClusterConfig,
) -> Vec<ClusterDisplayItem> {
    let markers = project_properties(adapter, req.properties);
    let thresholds = Thresholds::resolve(config, req.zoom, req.latitude);
    cluster_projected(&markers, req.primary_type, req.selected_id, thresholds)
}
