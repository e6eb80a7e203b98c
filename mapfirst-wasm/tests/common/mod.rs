#![allow(dead_code)]

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

/// A gl-js lookalike: `map.project` maps one degree to 10 px, y down.
const FAKE_GL: &str = r#"
const map = {
  center: { lng: 0, lat: 0 }, zoom: 0, bearing: 0, pitch: 0, bounds: null,
  handlers: {}, markers: [],
  getCenter() { return this.center; },
  getZoom() { return this.zoom; },
  getBearing() { return this.bearing; },
  getPitch() { return this.pitch; },
  getBounds() {
    const b = this.bounds;
    if (!b) return null;
    return { getSouthWest: () => ({ lng: b[0], lat: b[1] }), getNorthEast: () => ({ lng: b[2], lat: b[3] }) };
  },
  project(ll) { return { x: ll[0] * 10, y: -ll[1] * 10 }; },
  on(ev, f) { (this.handlers[ev] = this.handlers[ev] || []).push(f); return this; },
  off(ev, f) { this.handlers[ev] = (this.handlers[ev] || []).filter(g => g !== f); return this; },
  fire(ev) { for (const f of (this.handlers[ev] || []).slice()) f(); },
  listenerCount() { return Object.values(this.handlers).reduce((n, l) => n + l.length, 0); },
};
class Marker {
  constructor(opts) { this.el = opts.element; this.anchor = opts.anchor; this.lngLat = null; this.map = null; }
  setLngLat(ll) { this.lngLat = ll; return this; }
  addTo(m) { this.map = m; m.markers.push(this); return this; }
  remove() {
    if (this.map) { this.map.markers = this.map.markers.filter(x => x !== this); this.map = null; }
    return this;
  }
  getElement() { return this.el; }
}
return { map, ns: { Marker } };
"#;

/// A Google Maps lookalike. The projection is linear over a 256 px world:
/// x = (lng + 180) * K, y = (90 - lat) * K with K = 256 / 360.
const FAKE_GOOGLE: &str = r#"
const latLng = (lat, lng) => ({ lat: () => lat, lng: () => lng });
const map = {
  center: [10, 20], zoom: 1, heading: undefined, tilt: undefined, bounds: undefined,
  handlers: [], markers: [],
  getCenter() { return this.center ? latLng(this.center[0], this.center[1]) : undefined; },
  getZoom() { return this.zoom; },
  getHeading() { return this.heading; },
  getTilt() { return this.tilt; },
  getBounds() {
    const b = this.bounds;
    if (!b) return undefined;
    return { getSouthWest: () => latLng(b[1], b[0]), getNorthEast: () => latLng(b[3], b[2]) };
  },
  getProjection() {
    const k = 256 / 360;
    return { fromLatLngToPoint: (ll) => ({ x: (ll.lng + 180) * k, y: (90 - ll.lat) * k }) };
  },
  fire(ev) { for (const h of this.handlers.slice()) if (h.ev === ev) h.f(); },
  listenerCount() { return this.handlers.length; },
};
const event = {
  addListener(target, ev, f) {
    const h = { ev, f, remove() { target.handlers = target.handlers.filter(x => x !== h); } };
    target.handlers.push(h);
    return h;
  },
};
class AdvancedMarkerElement {
  constructor(opts) {
    this.position = opts.position; this.content = opts.content; this.zIndex = opts.zIndex;
    this._map = null;
    this.map = opts.map;
  }
  get map() { return this._map; }
  set map(m) {
    if (this._map) this._map.markers = this._map.markers.filter(x => x !== this);
    this._map = m;
    if (m) m.markers.push(this);
  }
}
return { map, ns: { maps: { event, marker: { AdvancedMarkerElement } } } };
"#;

pub struct Fake {
    pub map: JsValue,
    pub ns: JsValue,
}

fn build(src: &str) -> Fake {
    let env = Function::new_no_args(src).call0(&JsValue::NULL).unwrap();
    Fake { map: get(&env, "map"), ns: get(&env, "ns") }
}

pub fn fake_gl() -> Fake { build(FAKE_GL) }

pub fn fake_google() -> Fake { build(FAKE_GOOGLE) }

/// Builds a `<div>` named after the property; `null` for ids in `hidden`.
pub fn factory(hidden: &[u32]) -> JsValue {
    let hidden: Vec<String> = hidden.iter().map(|id| id.to_string()).collect();
    let body = format!(
        "if ([{}].includes(item.property.id)) return null;\
         const el = document.createElement('div');\
         el.textContent = item.property.name;\
         el.dataset.kind = style.kind;\
         return el;",
        hidden.join(",")
    );
    Function::new_with_args("item, style", &body).into()
}

pub fn div() -> Element {
    Function::new_no_args("return document.createElement('div');")
        .call0(&JsValue::NULL)
        .unwrap()
        .dyn_into::<Element>()
        .unwrap()
}

pub fn get(v: &JsValue, k: &str) -> JsValue { Reflect::get(v, &JsValue::from_str(k)).unwrap() }

pub fn set(v: &JsValue, k: &str, val: &JsValue) { Reflect::set(v, &JsValue::from_str(k), val).unwrap(); }

pub fn num(v: &JsValue, k: &str) -> f64 { get(v, k).as_f64().unwrap() }

pub fn call(v: &JsValue, method: &str, args: &[&JsValue]) -> JsValue {
    let f: Function = get(v, method).dyn_into().unwrap();
    let argv = Array::new();
    for a in args { argv.push(a); }
    f.apply(v, &argv).unwrap()
}

pub fn fire(fake: &Fake, ev: &str) { call(&fake.map, "fire", &[&JsValue::from_str(ev)]); }

pub fn marker_count(fake: &Fake) -> u32 { Array::from(&get(&fake.map, "markers")).length() }

pub fn listener_count(fake: &Fake) -> f64 { call(&fake.map, "listenerCount", &[]).as_f64().unwrap() }

pub fn json(src: &str) -> JsValue { js_sys::JSON::parse(src).unwrap() }

pub fn is_ok(v: &JsValue) -> bool {
    Reflect::get(v, &JsValue::from_str("ok")).ok().and_then(|x| x.as_bool()).unwrap_or(false)
}

pub fn is_err(v: &JsValue, code: &str) -> bool {
    if is_ok(v) { return false; }
    if let Ok(err) = Reflect::get(v, &JsValue::from_str("error")) {
        if let Ok(c) = Reflect::get(&err, &JsValue::from_str("code")) {
            return c.as_string().map_or(false, |s| s == code);
        }
    }
    false
}

pub fn value(v: &JsValue) -> JsValue {
    assert!(is_ok(v), "expected ok envelope");
    get(v, "value")
}

/// Captures `console.warn` until dropped.
pub struct WarnSpy(JsValue);

impl WarnSpy {
    pub fn install() -> WarnSpy {
        let src = "const orig = console.warn; const seen = [];\
                   console.warn = (...a) => { seen.push(a.map(String).join(' ')); };\
                   return { seen, restore() { console.warn = orig; } };";
        WarnSpy(Function::new_no_args(src).call0(&JsValue::NULL).unwrap())
    }

    pub fn messages(&self) -> Vec<String> {
        Array::from(&get(&self.0, "seen")).iter().filter_map(|m| m.as_string()).collect()
    }

    pub fn saw(&self, needle: &str) -> bool { self.messages().iter().any(|m| m.contains(needle)) }
}

impl Drop for WarnSpy {
    fn drop(&mut self) { call(&self.0, "restore", &[]); }
}
