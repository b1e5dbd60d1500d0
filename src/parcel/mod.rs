//! Land parcels and user zones
//!
//! A parcel is projected to planar meters once, when it is created, and is
//! never mutated afterwards.

use crate::core::error::{PlannerError, Result};
use crate::core::types::{GeoPoint, Vec2, EPSILON};
use crate::geometry::polygon::{self, Shape};
use crate::geometry::GeoProjection;
use serde::{Deserialize, Serialize};

/// Immutable land parcel for one planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandParcel {
    pub name: String,
    /// Closed ring in planar meters (first == last)
    boundary: Vec<Vec2>,
    area: f64,
    centroid: Vec2,
    latitude: f64,
    projection: GeoProjection,
    /// Non-fatal input problems, such as a self-intersecting boundary
    pub warnings: Vec<String>,
}

impl LandParcel {
    /// Build from geographic points, closing the ring if needed
    pub fn from_geographic(name: impl Into<String>, points: &[GeoPoint]) -> Result<Self> {
        let projection = GeoProjection::centered_on(points);
        let planar: Vec<Vec2> = points.iter().map(|p| projection.to_planar(*p)).collect();
        Self::build(name.into(), planar, projection)
    }

    /// Build from planar points; `latitude` drives the solar orientation
    pub fn from_planar(name: impl Into<String>, points: Vec<Vec2>, latitude: f64) -> Result<Self> {
        let projection = GeoProjection::new(GeoPoint::new(latitude, 0.0));
        let mut parcel = Self::build(name.into(), points, projection)?;
        parcel.latitude = latitude;
        Ok(parcel)
    }

    fn build(name: String, points: Vec<Vec2>, projection: GeoProjection) -> Result<Self> {
        let mut ring: Vec<Vec2> = Vec::with_capacity(points.len() + 1);
        for p in points {
            if ring.last().map_or(true, |last: &Vec2| last.distance(&p) > EPSILON) {
                ring.push(p);
            }
        }
        let ring = polygon::open_ring(&ring).to_vec();

        if ring.len() < 3 {
            return Err(PlannerError::InvalidParcel { points: ring.len() });
        }

        let area = polygon::area(&ring)?;
        if area <= EPSILON {
            return Err(PlannerError::Geometry(format!(
                "parcel '{}' has zero area",
                name
            )));
        }
        let centroid = polygon::centroid(&ring)?;

        let mut warnings = Vec::new();
        if polygon::is_self_intersecting(&ring) {
            tracing::warn!(parcel = %name, "Parcel boundary is self-intersecting");
            warnings.push("Parcel boundary crosses itself; area may be inaccurate".to_string());
        }

        let mut boundary = ring;
        boundary.push(boundary[0]);

        Ok(Self {
            name,
            boundary,
            area,
            centroid,
            latitude: projection.to_geo(centroid).lat,
            projection,
            warnings,
        })
    }

    /// Closed boundary ring in planar meters
    pub fn boundary(&self) -> &[Vec2] {
        &self.boundary
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn centroid(&self) -> Vec2 {
        self.centroid
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn projection(&self) -> &GeoProjection {
        &self.projection
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.boundary.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Inclusion,
    Exclusion,
}

/// User-drawn zone in the parcel's planar frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    pub points: Vec<Vec2>,
    #[serde(default)]
    pub label: Option<String>,
}

impl Zone {
    pub fn new(kind: ZoneKind, points: Vec<Vec2>) -> Self {
        Self {
            kind,
            points,
            label: None,
        }
    }

    pub fn from_geographic(kind: ZoneKind, points: &[GeoPoint], projection: &GeoProjection) -> Self {
        Self::new(kind, points.iter().map(|p| projection.to_planar(*p)).collect())
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// None for zones with fewer than 3 vertices
    pub fn shape(&self) -> Option<Shape> {
        let ring = polygon::open_ring(&self.points);
        (ring.len() >= 3).then(|| Shape::new(ring.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geographic_parcel_is_closed_and_projected() {
        let points = [
            GeoPoint::new(18.5000, 73.8000),
            GeoPoint::new(18.5000, 73.8010),
            GeoPoint::new(18.5010, 73.8010),
            GeoPoint::new(18.5010, 73.8000),
        ];
        let parcel = LandParcel::from_geographic("Field 7", &points).unwrap();
        let boundary = parcel.boundary();
        assert_eq!(boundary.first(), boundary.last());
        assert_eq!(boundary.len(), 5);
        // Roughly 105 m x 110 m
        assert!(parcel.area() > 11_000.0 && parcel.area() < 12_000.0);
        assert!((parcel.latitude() - 18.5005).abs() < 1e-6);
    }

    #[test]
    fn test_two_point_parcel_rejected() {
        let err = LandParcel::from_planar(
            "Strip",
            vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 0.0)],
            20.0,
        )
        .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidParcel { points: 2 }));
    }

    #[test]
    fn test_duplicate_vertices_collapsed() {
        let parcel = LandParcel::from_planar(
            "Dupes",
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(10.0, 10.0),
                Vec2::new(0.0, 10.0),
                Vec2::new(0.0, 0.0),
            ],
            20.0,
        )
        .unwrap();
        assert_eq!(parcel.boundary().len(), 5);
        assert!((parcel.area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_zone_has_no_shape() {
        let zone = Zone::new(ZoneKind::Exclusion, vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)]);
        assert!(zone.shape().is_none());
    }
}
