// Cluster winner selection

use std::cmp::Ordering;

use crate::model::{Property, PropertyType};

/// Parses a display price such as "$1,234" or "EUR 99.50 / night".
/// Anything without digits ranks below every real price.
pub fn parse_price(display: Option<&str>) -> f64 {
    let Some(s) = display else { return f64::NEG_INFINITY; };
    let mut digits = String::new();
    let mut seen_digit = false;
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            seen_digit = true;
        } else if ch == '.' && seen_digit && !digits.contains('.') {
            digits.push(ch);
        } else if ch == ',' && seen_digit {
            // thousands separator
        } else if seen_digit {
            break;
        }
    }
    match digits.trim_end_matches('.').parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => f64::NEG_INFINITY,
    }
}

#[inline]
fn rating_of(p: &Property) -> f64 { if p.rating.is_finite() { p.rating } else { f64::NEG_INFINITY } }

/// Total order used to pick the primary marker of a cluster.
/// `Ordering::Greater` means `a` beats `b`.
pub fn compare_rank(a: &Property, b: &Property, primary: PropertyType) -> Ordering {
    let a_primary = a.property_type == Some(primary);
    let b_primary = b.property_type == Some(primary);
    a_primary.cmp(&b_primary)
        .then_with(|| rating_of(a).total_cmp(&rating_of(b)))
        .then_with(|| parse_price(a.display_price()).total_cmp(&parse_price(b.display_price())))
        .then_with(|| a.reviews.cmp(&b.reviews))
        .then_with(|| b.id.cmp(&a.id))
}

/// Index (into `members`) of the best-ranked property.
pub fn pick_winner(members: &[&Property], primary: PropertyType) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, p) in members.iter().enumerate() {
        match best {
            Some(b) if compare_rank(p, members[b], primary) != Ordering::Greater => {}
            _ => best = Some(i),
        }
    }
    best
}
