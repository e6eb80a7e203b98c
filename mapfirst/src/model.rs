use serde::{Deserialize, Serialize};

use crate::geometry::limits;

pub type PropertyId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[default]
    #[serde(rename = "Accommodation")]
    Accommodation,
    #[serde(rename = "Eat & Drink")]
    EatAndDrink,
    #[serde(rename = "Attraction")]
    Attraction,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Accommodation => "Accommodation",
            PropertyType::EatAndDrink => "Eat & Drink",
            PropertyType::Attraction => "Attraction",
        }
    }

    /// Accepts the display names used on the wire.
    pub fn parse(s: &str) -> Option<PropertyType> {
        match s.trim() {
            "Accommodation" => Some(PropertyType::Accommodation),
            "Eat & Drink" => Some(PropertyType::EatAndDrink),
            "Attraction" => Some(PropertyType::Attraction),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        limits::in_lat_bounds(self.lat) && limits::in_lng_bounds(self.lon)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default)]
    pub display_price: Option<String>,
    #[serde(default)]
    pub is_pending: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub name: String,
    #[serde(default)]
    pub year: Option<u32>,
}

/// A point of interest as delivered by the data layer. Never mutated here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub pricing: Option<Pricing>,
    #[serde(default)]
    pub awards: Option<Vec<Award>>,
}

impl Property {
    pub fn new(id: PropertyId, name: impl Into<String>) -> Property {
        Property {
            id,
            name: name.into(),
            property_type: None,
            location: None,
            rating: 0.0,
            reviews: 0,
            pricing: None,
            awards: None,
        }
    }

    pub fn with_type(mut self, t: PropertyType) -> Property {
        self.property_type = Some(t);
        self
    }

    pub fn at(mut self, lon: f64, lat: f64) -> Property {
        self.location = Some(Coordinates { lat, lon });
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Property {
        self.rating = rating;
        self
    }

    pub fn with_reviews(mut self, reviews: u32) -> Property {
        self.reviews = reviews;
        self
    }

    pub fn with_price(mut self, display: &str) -> Property {
        let pricing = self.pricing.get_or_insert_with(Pricing::default);
        pricing.display_price = Some(display.to_string());
        self
    }

    pub fn pending(mut self) -> Property {
        self.pricing.get_or_insert_with(Pricing::default).is_pending = true;
        self
    }

    /// Coordinates usable for projection; `None` for missing or malformed ones.
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.filter(|c| c.is_valid())
    }

    pub fn is_pending(&self) -> bool {
        self.pricing.as_ref().map_or(false, |p| p.is_pending)
    }

    pub fn display_price(&self) -> Option<&str> {
        self.pricing.as_ref().and_then(|p| p.display_price.as_deref())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> LngLat {
        LngLat { lng, lat }
    }
}

impl From<Coordinates> for LngLat {
    fn from(c: Coordinates) -> LngLat {
        LngLat { lng: c.lon, lat: c.lat }
    }
}

/// Viewport pixel position, origin top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const ORIGIN: ScreenPoint = ScreenPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub sw: LngLat,
    pub ne: LngLat,
}

impl Bounds {
    pub const ZERO: Bounds = Bounds {
        sw: LngLat { lng: 0.0, lat: 0.0 },
        ne: LngLat { lng: 0.0, lat: 0.0 },
    };

    pub fn is_zero(&self) -> bool {
        *self == Bounds::ZERO
    }

    /// Handles boxes crossing the antimeridian (sw.lng > ne.lng).
    pub fn contains(&self, p: LngLat) -> bool {
        if p.lat < self.sw.lat || p.lat > self.ne.lat {
            return false;
        }
        if self.sw.lng <= self.ne.lng {
            p.lng >= self.sw.lng && p.lng <= self.ne.lng
        } else {
            p.lng >= self.sw.lng || p.lng <= self.ne.lng
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl ViewState {
    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && self.zoom.is_finite()
            && self.bearing.is_finite()
            && self.pitch.is_finite()
    }
}

/// A property placed on screen for one viewport snapshot.
#[derive(Clone, Copy, Debug)]
pub struct ProjectedMarker<'a> {
    pub property: &'a Property,
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

impl ProjectedMarker<'_> {
    pub fn distance_sq(&self, other: &ProjectedMarker<'_>) -> f64 {
        crate::geometry::math::dist_sq(self.x, self.y, other.x, other.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Primary,
    Dot,
}

impl MarkerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::Primary => "primary",
            MarkerKind::Dot => "dot",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClusterDisplayItem {
    Primary {
        property: Property,
        key: String,
    },
    Dot {
        property: Property,
        key: String,
        #[serde(rename = "parentId")]
        parent_id: PropertyId,
    },
}

impl ClusterDisplayItem {
    pub fn key(&self) -> &str {
        match self {
            ClusterDisplayItem::Primary { key, .. } | ClusterDisplayItem::Dot { key, .. } => key,
        }
    }

    pub fn property(&self) -> &Property {
        match self {
            ClusterDisplayItem::Primary { property, .. }
            | ClusterDisplayItem::Dot { property, .. } => property,
        }
    }

    pub fn id(&self) -> PropertyId {
        self.property().id
    }

    pub fn kind(&self) -> MarkerKind {
        match self {
            ClusterDisplayItem::Primary { .. } => MarkerKind::Primary,
            ClusterDisplayItem::Dot { .. } => MarkerKind::Dot,
        }
    }

    pub fn parent_id(&self) -> Option<PropertyId> {
        match self {
            ClusterDisplayItem::Primary { .. } => None,
            ClusterDisplayItem::Dot { parent_id, .. } => Some(*parent_id),
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, ClusterDisplayItem::Primary { .. })
    }

    /// Anchor for the native marker. Items only exist for located properties.
    pub fn position(&self) -> Option<LngLat> {
        self.property().coordinates().map(LngLat::from)
    }
}

/// Visual state flags handed to element factories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub kind: MarkerKind,
    pub primary_type: bool,
    pub selected: bool,
    pub pending: bool,
}

impl MarkerStyle {
    pub fn for_item(
        item: &ClusterDisplayItem,
        primary: PropertyType,
        selected: Option<PropertyId>,
    ) -> MarkerStyle {
        let p = item.property();
        MarkerStyle {
            kind: item.kind(),
            primary_type: p.property_type == Some(primary),
            selected: selected == Some(p.id),
            pending: p.is_pending(),
        }
    }
}
