use mapfirst::algorithms::clustering::{cluster_properties, ClusterRequest};
use mapfirst::config::ClusterConfig;
use mapfirst::model::{LngLat, Property, PropertyType};
use mapfirst::viewport::StaticViewport;
use std::time::Instant;

fn lcg(seed: &mut u64) -> f64 { *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1); ((*seed >> 11) as f64) / ((1u64 << 53) as f64) }

fn build_scene(points: usize, seed: &mut u64) -> Vec<Property> {
    // Scatter around central Paris so every zoom level sees dense and sparse areas
    let types = [PropertyType::Accommodation, PropertyType::EatAndDrink, PropertyType::Attraction];
    (0..points as u64).map(|i| {
        let lon = 2.35 + (lcg(seed) - 0.5) * 0.2;
        let lat = 48.86 + (lcg(seed) - 0.5) * 0.12;
        let mut p = Property::new(i, format!("p{}", i)).with_type(types[(i % 3) as usize]).at(lon, lat)
            .with_rating((lcg(seed) * 50.0).round() / 10.0).with_reviews((lcg(seed) * 2000.0) as u32);
        if i % 4 != 0 { p = p.with_price(&format!("${}", 40 + (lcg(seed) * 400.0) as u32)); }
        p
    }).collect()
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() { return 0.0; }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len()-1)]
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut points = 5000usize;
    let mut zoom = 13.0f64;
    let mut iters = 50usize;
    let mut assert_ms: Option<f64> = None;
    for a in &args[1..] {
        if let Some(val)=a.strip_prefix("--points=") { if let Ok(v)=val.parse() { points=v; } }
        else if let Some(val)=a.strip_prefix("--zoom=") { if let Ok(v)=val.parse() { zoom=v; } }
        else if let Some(val)=a.strip_prefix("--iters=") { if let Ok(v)=val.parse() { iters=v; } }
        else if let Some(val)=a.strip_prefix("--assert-ms=") { if let Ok(v)=val.parse() { assert_ms=Some(v); } }
    }

    let mut seed = 0x5EED_CAFE_F00Du64;
    let props = build_scene(points, &mut seed);
    let viewport = StaticViewport::new(LngLat::new(2.35, 48.86), zoom, 1920.0, 1080.0);
    let cfg = ClusterConfig::default();
    let req = ClusterRequest { properties: &props, primary_type: PropertyType::Accommodation, selected_id: Some(1), zoom, latitude: 48.86 };

    let mut times_ms: Vec<f64> = Vec::with_capacity(iters);
    let mut items = 0usize; let mut dots = 0usize;
    for _ in 0..iters.max(1) {
        let t0 = Instant::now();
        let out = cluster_properties(&viewport, &req, &cfg);
        times_ms.push(t0.elapsed().as_secs_f64() * 1000.0);
        items = out.len();
        dots = out.iter().filter(|i| !i.is_primary()).count();
    }
    times_ms.sort_by(|a,b| a.total_cmp(b));
    let med = percentile(&times_ms, 0.5);
    let p90 = percentile(&times_ms, 0.9);
    println!("points={} zoom={} items={} dots={} median_ms={:.4} p90_ms={:.4}", points, zoom, items, dots, med, p90);
    if let Some(th) = assert_ms { if med > th { eprintln!("FAIL: median {:.4} ms > threshold {:.3} ms", med, th); std::process::exit(1); } }
}
