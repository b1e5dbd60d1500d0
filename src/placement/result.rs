//! Placement output handed to the pricing roll-up

use super::structure::PlacedStructure;
use crate::core::config::EngineKind;
use crate::core::types::GeoPoint;
use serde::{Deserialize, Serialize};

/// Why part of the parcel holds no structures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbuildableRegion {
    pub reason: String,
    /// Estimated affected area in m²
    pub affected_area: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_sample: Option<GeoPoint>,
}

/// Aggregate figures for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementMetadata {
    pub count: usize,
    pub total_inner_area: f64,
    pub total_outer_area: f64,
    pub parcel_area: f64,
    pub buildable_area: f64,
    /// Total outer area over parcel area, in percent
    pub utilization_percentage: f64,
    /// Distinct angles used, primary first
    pub angles: Vec<f64>,
    pub engine: EngineKind,
    pub iterations: u64,
    pub budget_exhausted: bool,
    pub computation_time_ms: u64,
}

/// Per-structure quantities for costing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureQuantity {
    pub structure_id: u32,
    pub outer_area: f64,
    pub inner_area: f64,
    pub perimeter: f64,
    pub module_count: u32,
}

/// Immutable result of one optimization call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResult {
    pub structures: Vec<PlacedStructure>,
    pub metadata: PlacementMetadata,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub unbuildable_regions: Vec<UnbuildableRegion>,
    pub constraint_violations: Vec<String>,
}

impl PlacementResult {
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn quantities(&self) -> Vec<StructureQuantity> {
        self.structures
            .iter()
            .map(|s| StructureQuantity {
                structure_id: s.id,
                outer_area: s.outer_area,
                inner_area: s.inner_area,
                perimeter: s.perimeter,
                module_count: s.module_count(),
            })
            .collect()
    }

    pub fn total_modules(&self) -> u32 {
        self.structures.iter().map(PlacedStructure::module_count).sum()
    }
}
