//! Terrain/compliance input supplied by an external analysis service

use crate::core::config::PlannerConfig;
use crate::core::types::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Water,
    SteepSlope,
    Forest,
    Road,
}

impl TerrainKind {
    /// Whether construction must keep off this kind of terrain
    ///
    /// Roads are never built over. Everything else yields to an explicit
    /// override; water and slopes additionally follow their own flags.
    pub fn is_avoided(&self, config: &PlannerConfig) -> bool {
        match self {
            TerrainKind::Road => true,
            _ if config.allow_terrain_override => false,
            TerrainKind::Water => config.avoid_water,
            TerrainKind::SteepSlope => config.consider_slope,
            TerrainKind::Forest => true,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TerrainKind::Water => "water body",
            TerrainKind::SteepSlope => "steep slope",
            TerrainKind::Forest => "forest",
            TerrainKind::Road => "road",
        }
    }
}

/// A restricted area reported by terrain analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictedArea {
    pub kind: TerrainKind,
    /// Reported affected area in m²
    pub area: f64,
    pub reason: String,
    /// Outline in the parcel's planar frame, when the service provides one
    #[serde(default)]
    pub polygon: Option<Vec<Vec2>>,
}

/// Precomputed terrain analysis for a parcel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainAnalysis {
    /// Buildable area the service computed, in m²
    pub buildable_area: Option<f64>,
    pub restricted_areas: Vec<RestrictedArea>,
    /// Mean slope in percent
    pub average_slope: Option<f64>,
    /// Lowest and highest elevation in meters
    pub elevation_range: Option<[f64; 2]>,
    pub warnings: Vec<String>,
}

impl TerrainAnalysis {
    /// True when any reported restriction is active under `config`
    pub fn restrictions_active(&self, config: &PlannerConfig) -> bool {
        self.restricted_areas
            .iter()
            .any(|area| area.kind.is_avoided(config))
    }
}
