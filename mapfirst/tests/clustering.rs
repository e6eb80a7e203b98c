mod common;

use std::collections::{HashMap, HashSet};

use common::PixelAdapter;
use mapfirst::algorithms::clustering::{cluster_properties, project_properties, ClusterRequest};
use mapfirst::algorithms::thresholds::Thresholds;
use mapfirst::config::ClusterConfig;
use mapfirst::geometry::mercator::{meters_to_pixels, METERS_PER_PIXEL_Z0};
use mapfirst::model::{ClusterDisplayItem, Coordinates, Property, PropertyId, PropertyType};
use proptest::prelude::*;

// 10 px per degree
fn adapter() -> PixelAdapter { PixelAdapter::new(10.0, 0.0) }

fn run(props: &[Property], primary: PropertyType, selected: Option<PropertyId>) -> Vec<ClusterDisplayItem> {
    let req = ClusterRequest { properties: props, primary_type: primary, selected_id: selected, zoom: 0.0, latitude: 0.0 };
    cluster_properties(&adapter(), &req, &ClusterConfig::default())
}

fn hotel_and_bar() -> Vec<Property> {
    vec![
        Property::new(1, "A").with_type(PropertyType::Accommodation).with_rating(4.5).at(0.0, 0.0),
        Property::new(2, "B").with_type(PropertyType::EatAndDrink).with_rating(4.9).at(1.0, 0.0),
    ]
}

#[test]
fn nearby_pair_folds_into_primary_and_dot() {
    let out = run(&hotel_and_bar(), PropertyType::Accommodation, None);
    assert_eq!(out.len(), 2);
    assert!(matches!(&out[0], ClusterDisplayItem::Primary { property, .. } if property.id == 1));
    assert!(matches!(&out[1], ClusterDisplayItem::Dot { property, parent_id: 1, .. } if property.id == 2));
}

#[test]
fn selected_member_is_never_a_dot() {
    let out = run(&hotel_and_bar(), PropertyType::Accommodation, Some(2));
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|i| i.is_primary()));
    let ids: HashSet<_> = out.iter().map(|i| i.id()).collect();
    assert_eq!(ids, HashSet::from([1, 2]));
}

#[test]
fn primary_category_decides_the_winner() {
    let out = run(&hotel_and_bar(), PropertyType::EatAndDrink, None);
    assert_eq!(out[0].id(), 2);
    assert_eq!(out[1].parent_id(), Some(2));
}

#[test]
fn unlocated_properties_are_dropped() {
    let mut props = hotel_and_bar();
    props.push(Property::new(3, "nowhere"));
    let mut nan = Property::new(4, "nan");
    nan.location = Some(Coordinates { lat: f64::NAN, lon: 3.0 });
    props.push(nan);
    props.push(Property::new(5, "off the globe").at(10.0, 123.0));
    let out = run(&props, PropertyType::Accommodation, None);
    let ids: Vec<_> = out.iter().map(|i| i.id()).collect();
    assert_eq!(ids.len(), 2);
    assert!(!ids.contains(&3) && !ids.contains(&4) && !ids.contains(&5));
}

#[test]
fn repeated_ids_keep_first_occurrence() {
    let props = vec![
        Property::new(9, "first").at(0.0, 0.0),
        Property::new(9, "second").at(50.0, 0.0),
    ];
    let projected = project_properties(&adapter(), &props);
    assert_eq!(projected.len(), 1);
    assert_eq!(projected[0].property.name, "first");
}

#[test]
fn meter_radius_at_world_zoom_clamps_to_floor() {
    let cfg = ClusterConfig { primary_radius_meters: Some(1000.0), ..ClusterConfig::default() };
    let raw = 1000.0 / METERS_PER_PIXEL_Z0;
    assert!(raw < cfg.min_threshold_px);
    assert_eq!(meters_to_pixels(1000.0, 0.0, 0.0, cfg.min_threshold_px), cfg.min_threshold_px);
    let t = Thresholds::resolve(&cfg, 0.0, 0.0);
    assert_eq!(t.primary, cfg.min_threshold_px);

    // 10 px apart is now beyond the 8 px threshold
    let props = hotel_and_bar();
    let req = ClusterRequest { properties: &props, primary_type: PropertyType::Accommodation, selected_id: None, zoom: 0.0, latitude: 0.0 };
    let out = cluster_properties(&adapter(), &req, &cfg);
    assert!(out.iter().all(|i| i.is_primary()));
}

#[test]
fn selection_changes_only_the_selected_key() {
    let props = hotel_and_bar();
    let before = run(&props, PropertyType::Accommodation, None);
    let after = run(&props, PropertyType::Accommodation, Some(1));
    assert_ne!(before[0].key(), after[0].key());
    // the dot's own flags did not change, but its parent is the same so the key holds
    assert_eq!(before[1].key(), after[1].key());
}

fn arb_type() -> impl Strategy<Value = Option<PropertyType>> {
    prop_oneof![
        Just(None),
        Just(Some(PropertyType::Accommodation)),
        Just(Some(PropertyType::EatAndDrink)),
        Just(Some(PropertyType::Attraction)),
    ]
}

fn arb_property(id: PropertyId) -> impl Strategy<Value = Property> {
    (arb_type(), 0.0f64..5.0, 0u32..500, proptest::option::of(1u32..900), any::<bool>()).prop_map(
        move |(t, rating, reviews, price, pending)| {
            let mut p = Property::new(id, format!("p{id}")).with_rating(rating).with_reviews(reviews);
            p.property_type = t;
            if let Some(v) = price { p = p.with_price(&format!("${v}")); }
            if pending { p = p.pending(); }
            p
        },
    )
}

fn arb_scene() -> impl Strategy<Value = Vec<Property>> {
    (1usize..40).prop_flat_map(|n| {
        let props: Vec<_> = (0..n as u64).map(arb_property).collect();
        let coords = proptest::collection::vec((-20.0f64..20.0, -20.0f64..20.0), n);
        (props, coords).prop_map(|(mut ps, cs)| {
            for (p, (lon, lat)) in ps.iter_mut().zip(cs) {
                p.location = Some(Coordinates { lat, lon });
            }
            ps
        })
    })
}

proptest! {
    #[test]
    fn separated_points_stay_single(
        cells in proptest::collection::hash_set((0u8..30, 0u8..15), 1..40),
        jitter in proptest::collection::vec((0.0f64..1.0, 0.0f64..1.0), 40),
    ) {
        // cells are 100 px apart, jitter is at most 10 px
        let props: Vec<Property> = cells.iter().enumerate().map(|(i, (cx, cy))| {
            let (jx, jy) = jitter[i];
            Property::new(i as u64, "p").at(*cx as f64 * 10.0 - 150.0 + jx, *cy as f64 * 10.0 - 70.0 + jy)
        }).collect();
        let out = run(&props, PropertyType::Accommodation, None);
        prop_assert_eq!(out.len(), props.len());
        prop_assert!(out.iter().all(|i| i.is_primary()));
    }

    #[test]
    fn coincident_points_form_one_cluster(
        n in 2usize..25,
        pick in any::<prop::sample::Index>(),
        select in any::<bool>(),
    ) {
        let props: Vec<Property> = (0..n as u64)
            .map(|i| Property::new(i, "same").with_rating((i % 5) as f64).at(12.0, 34.0))
            .collect();
        let selected = if select { Some(pick.index(n) as u64) } else { None };
        let out = run(&props, PropertyType::Accommodation, selected);
        prop_assert_eq!(out.len(), n);
        let primaries: Vec<_> = out.iter().filter(|i| i.is_primary()).collect();
        let winner = primaries[0].id();
        prop_assert!(primaries.len() <= 2);
        for item in &out {
            if let Some(parent) = item.parent_id() {
                prop_assert_eq!(parent, winner);
                prop_assert_ne!(Some(item.id()), selected);
            }
        }
        if let Some(s) = selected {
            prop_assert!(primaries.iter().any(|i| i.id() == s));
        }
    }

    #[test]
    fn every_located_property_appears_once(
        props in arb_scene(),
        selected in proptest::option::of(0u64..40),
        primary in prop_oneof![Just(PropertyType::Accommodation), Just(PropertyType::EatAndDrink)],
    ) {
        let out = run(&props, primary, selected);
        let mut seen: HashMap<PropertyId, usize> = HashMap::new();
        for item in &out { *seen.entry(item.id()).or_default() += 1; }
        prop_assert_eq!(seen.len(), props.len());
        prop_assert!(seen.values().all(|&c| c == 1));

        let primaries: HashSet<PropertyId> = out.iter().filter(|i| i.is_primary()).map(|i| i.id()).collect();
        for item in &out {
            if let Some(parent) = item.parent_id() {
                prop_assert!(primaries.contains(&parent));
            }
            if Some(item.id()) == selected {
                prop_assert!(item.is_primary());
            }
        }
        let keys: HashSet<&str> = out.iter().map(|i| i.key()).collect();
        prop_assert_eq!(keys.len(), out.len());
    }

    #[test]
    fn clustering_is_deterministic(props in arb_scene(), selected in proptest::option::of(0u64..40)) {
        let a = run(&props, PropertyType::Accommodation, selected);
        let b = run(&props, PropertyType::Accommodation, selected);
        prop_assert_eq!(a, b);
    }
}
