//! Polygon primitives: area, centroid, containment, segment tests
//!
//! Polygons are vertex slices in planar meters. A ring may be passed open or
//! closed (first == last); every function here ignores a duplicated closing
//! vertex.

use crate::core::error::{PlannerError, Result};
use crate::core::types::{Vec2, EPSILON};
use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// Strip the closing vertex of a closed ring
pub fn open_ring(points: &[Vec2]) -> &[Vec2] {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 && first.distance(last) <= EPSILON => {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}

/// Iterate the edges of a ring as (start, end) pairs, closing it implicitly
pub fn edges(points: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let ring = open_ring(points);
    let n = ring.len();
    (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
}

fn require_polygon(ring: &[Vec2]) -> Result<()> {
    if ring.len() < 3 {
        return Err(PlannerError::Geometry(format!(
            "polygon needs at least 3 vertices, got {}",
            ring.len()
        )));
    }
    Ok(())
}

/// Signed shoelace area; positive for counter-clockwise rings
pub fn signed_area(points: &[Vec2]) -> f64 {
    let ring = open_ring(points);
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += ring[i].x * ring[j].y - ring[j].x * ring[i].y;
    }
    sum / 2.0
}

/// Planar area of a polygon
///
/// Self-intersecting input is tolerated: the shoelace value is returned as is.
pub fn area(points: &[Vec2]) -> Result<f64> {
    require_polygon(open_ring(points))?;
    Ok(signed_area(points).abs())
}

/// Area centroid of a polygon
///
/// Falls back to the vertex mean when the area is degenerate.
pub fn centroid(points: &[Vec2]) -> Result<Vec2> {
    let ring = open_ring(points);
    require_polygon(ring)?;

    let n = ring.len();
    let mut a = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let cross = ring[i].x * ring[j].y - ring[j].x * ring[i].y;
        a += cross;
        cx += (ring[i].x + ring[j].x) * cross;
        cy += (ring[i].y + ring[j].y) * cross;
    }

    if a.abs() <= EPSILON {
        let sum = ring.iter().fold(Vec2::default(), |acc, p| acc + *p);
        return Ok(sum.scale(1.0 / n as f64));
    }

    Ok(Vec2::new(cx / (3.0 * a), cy / (3.0 * a)))
}

/// Check if polygon vertices are in counter-clockwise order
pub fn is_counter_clockwise(points: &[Vec2]) -> bool {
    signed_area(points) > 0.0
}

/// Distance from `p` to the segment `a`-`b`
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(&ab);
    if len_sq <= f64::EPSILON {
        return p.distance(&a);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    p.distance(&(a + ab.scale(t)))
}

/// Signed distance of `c` from the line through `a` and `b`
///
/// Positive when `c` lies to the left of a->b.
fn side(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    let ab = b - a;
    let len = ab.length();
    if len <= f64::EPSILON {
        return 0.0;
    }
    ab.cross(&(c - a)) / len
}

/// True if two segments cross at a single interior point
///
/// Touching at an endpoint or running collinear is not a crossing.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = side(b1, b2, a1);
    let d2 = side(b1, b2, a2);
    let d3 = side(a1, a2, b1);
    let d4 = side(a1, a2, b2);

    ((d1 > EPSILON && d2 < -EPSILON) || (d1 < -EPSILON && d2 > EPSILON))
        && ((d3 > EPSILON && d4 < -EPSILON) || (d3 < -EPSILON && d4 > EPSILON))
}

/// Check if polygon edges cross each other (excluding adjacent edges)
pub fn is_self_intersecting(points: &[Vec2]) -> bool {
    let ring = open_ring(points);
    let n = ring.len();
    if n < 4 {
        return false;
    }

    for i in 0..n {
        let a1 = ring[i];
        let a2 = ring[(i + 1) % n];
        for j in (i + 2)..n {
            if j == (i + n - 1) % n {
                continue;
            }
            let b1 = ring[j];
            let b2 = ring[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// Ray-casting point-in-polygon; points on the boundary count as inside
pub fn contains(points: &[Vec2], p: Vec2) -> bool {
    let ring = open_ring(points);
    if ring.len() < 3 {
        return false;
    }

    if edges(ring).any(|(a, b)| point_segment_distance(p, a, b) <= EPSILON) {
        return true;
    }

    let mut inside = false;
    let n = ring.len();
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Polygon with holes in planar meters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shape {
    pub exterior: Vec<Vec2>,
    #[serde(default)]
    pub holes: Vec<Vec<Vec2>>,
}

impl Shape {
    pub fn new(exterior: Vec<Vec2>) -> Self {
        Self {
            exterior: open_ring(&exterior).to_vec(),
            holes: Vec::new(),
        }
    }

    /// Area of the exterior minus its holes
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| signed_area(h).abs()).sum();
        (signed_area(&self.exterior).abs() - holes).max(0.0)
    }

    /// Inside the exterior and not strictly inside any hole
    pub fn contains_point(&self, p: Vec2) -> bool {
        contains(&self.exterior, p)
            && !self
                .holes
                .iter()
                .any(|hole| contains(hole, p) && !on_ring(hole, p))
    }

    /// Every ring of the shape, exterior first
    pub fn rings(&self) -> impl Iterator<Item = &[Vec2]> + '_ {
        std::iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(|h| h.as_slice()))
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        bounds(&self.exterior)
    }

    pub fn to_geo(&self) -> Polygon<f64> {
        Polygon::new(
            ring_to_linestring(&self.exterior),
            self.holes.iter().map(|h| ring_to_linestring(h)).collect(),
        )
    }

    pub fn from_geo(polygon: &Polygon<f64>) -> Self {
        Self {
            exterior: linestring_to_ring(polygon.exterior()),
            holes: polygon.interiors().iter().map(linestring_to_ring).collect(),
        }
    }
}

fn on_ring(ring: &[Vec2], p: Vec2) -> bool {
    edges(ring).any(|(a, b)| point_segment_distance(p, a, b) <= EPSILON)
}

/// Axis-aligned bounds of a point set as (min, max)
pub fn bounds(points: &[Vec2]) -> (Vec2, Vec2) {
    let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

fn ring_to_linestring(ring: &[Vec2]) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = open_ring(ring)
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect();
    if let Some(first) = coords.first().cloned() {
        coords.push(first);
    }
    LineString::new(coords)
}

fn linestring_to_ring(line: &LineString<f64>) -> Vec<Vec2> {
    let points: Vec<Vec2> = line.coords().map(|c| Vec2::new(c.x, c.y)).collect();
    open_ring(&points).to_vec()
}
