//! Planning request as received from callers
//!
//! Everything geographic is converted into the parcel's planar frame with
//! the projection the parcel was built with.

use crate::core::config::ConfigOverrides;
use crate::core::error::Result;
use crate::core::types::GeoPoint;
use crate::geometry::GeoProjection;
use crate::parcel::{LandParcel, Zone, ZoneKind};
use crate::region::{RestrictedArea, TerrainAnalysis, TerrainKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInput {
    pub kind: ZoneKind,
    pub points: Vec<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictedAreaInput {
    pub kind: TerrainKind,
    pub area: f64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<GeoPoint>>,
}

/// Terrain analysis with geographic outlines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainInput {
    pub buildable_area: Option<f64>,
    pub restricted_areas: Vec<RestrictedAreaInput>,
    pub average_slope: Option<f64>,
    pub elevation_range: Option<[f64; 2]>,
    pub warnings: Vec<String>,
}

impl TerrainInput {
    pub fn to_analysis(&self, projection: &GeoProjection) -> TerrainAnalysis {
        TerrainAnalysis {
            buildable_area: self.buildable_area,
            restricted_areas: self
                .restricted_areas
                .iter()
                .map(|input| RestrictedArea {
                    kind: input.kind,
                    area: input.area,
                    reason: input.reason.clone(),
                    polygon: input.polygon.as_ref().map(|points| {
                        points.iter().map(|p| projection.to_planar(*p)).collect()
                    }),
                })
                .collect(),
            average_slope: self.average_slope,
            elevation_range: self.elevation_range,
            warnings: self.warnings.clone(),
        }
    }
}

/// One planning request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub name: String,
    pub boundary: Vec<GeoPoint>,
    #[serde(default)]
    pub zones: Vec<ZoneInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

impl PlanRequest {
    pub fn new(name: impl Into<String>, boundary: Vec<GeoPoint>) -> Self {
        Self {
            name: name.into(),
            boundary,
            zones: Vec::new(),
            terrain: None,
            overrides: None,
        }
    }

    pub fn with_zone(mut self, kind: ZoneKind, points: Vec<GeoPoint>) -> Self {
        self.zones.push(ZoneInput {
            kind,
            points,
            label: None,
        });
        self
    }

    pub fn with_terrain(mut self, terrain: TerrainInput) -> Self {
        self.terrain = Some(terrain);
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn parcel(&self) -> Result<LandParcel> {
        LandParcel::from_geographic(self.name.clone(), &self.boundary)
    }

    pub fn zones(&self, projection: &GeoProjection) -> Vec<Zone> {
        self.zones
            .iter()
            .map(|input| {
                let zone = Zone::from_geographic(input.kind, &input.points, projection);
                match &input.label {
                    Some(label) => zone.with_label(label.clone()),
                    None => zone,
                }
            })
            .collect()
    }

    pub fn terrain(&self, projection: &GeoProjection) -> Option<TerrainAnalysis> {
        self.terrain.as_ref().map(|t| t.to_analysis(projection))
    }
}
