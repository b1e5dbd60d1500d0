//! Local equirectangular projection between geographic and planar coordinates
//!
//! Accurate to well under a meter across a few kilometers, which covers any
//! single parcel.

use crate::core::types::{GeoPoint, Vec2};
use serde::{Deserialize, Serialize};

/// Meters per degree of latitude
const METERS_PER_DEG_LAT: f64 = 110_574.0;

/// Meters per degree of longitude at the equator
const METERS_PER_DEG_LNG: f64 = 111_320.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoProjection {
    pub origin: GeoPoint,
}

impl GeoProjection {
    pub fn new(origin: GeoPoint) -> Self {
        Self { origin }
    }

    /// Projection centered on the mean of the given points
    pub fn centered_on(points: &[GeoPoint]) -> Self {
        let n = points.len().max(1) as f64;
        let (lat, lng) = points
            .iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
        Self::new(GeoPoint::new(lat / n, lng / n))
    }

    fn lng_scale(&self) -> f64 {
        METERS_PER_DEG_LNG * self.origin.lat.to_radians().cos()
    }

    pub fn to_planar(&self, point: GeoPoint) -> Vec2 {
        Vec2::new(
            (point.lng - self.origin.lng) * self.lng_scale(),
            (point.lat - self.origin.lat) * METERS_PER_DEG_LAT,
        )
    }

    pub fn to_geo(&self, point: Vec2) -> GeoPoint {
        let scale = self.lng_scale();
        let lng = if scale.abs() > f64::EPSILON {
            self.origin.lng + point.x / scale
        } else {
            self.origin.lng
        };
        GeoPoint::new(self.origin.lat + point.y / METERS_PER_DEG_LAT, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_round_trip_near_origin() {
        let proj = GeoProjection::new(GeoPoint::new(18.52, 73.85));
        let p = GeoPoint::new(18.521, 73.852);
        let back = proj.to_geo(proj.to_planar(p));
        assert!((back.lat - p.lat).abs() < 1e-9);
        assert!((back.lng - p.lng).abs() < 1e-9);
    }

    #[test]
    fn test_one_millidegree_of_latitude_is_about_110m() {
        let proj = GeoProjection::new(GeoPoint::new(0.0, 0.0));
        let planar = proj.to_planar(GeoPoint::new(0.001, 0.0));
        assert!((planar.y - 110.574).abs() < 1e-6);
    }
}
