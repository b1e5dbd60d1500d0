//! Buildable-region resolution
//!
//! Order of operations:
//! 1. shrink the parcel by the safety buffer
//! 2. subtract exclusion zones
//! 3. subtract restricted terrain that is avoided under the configuration
//! 4. add back inclusion zones that lie inside the parcel, clipped to the
//!    buffered parcel (roads stay excluded)
//!
//! A region below `MIN_BUILDABLE_FRACTION` of the parcel blocks planning.

use super::terrain::{TerrainAnalysis, TerrainKind};
use crate::core::config::{PlannerConfig, MIN_BUILDABLE_FRACTION};
use crate::core::error::{PlannerError, Result};
use crate::core::types::Vec2;
use crate::geometry::polygon::{self, Shape};
use crate::geometry::{difference, intersection, offset_inward, total_area, union, union_all};
use crate::parcel::{LandParcel, Zone, ZoneKind};
use serde::{Deserialize, Serialize};

/// Area removed from the region, with the reason it was removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exclusion {
    pub reason: String,
    pub area: f64,
    pub location_sample: Option<Vec2>,
}

/// Region eligible for construction; read-only once resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildableRegion {
    pub shapes: Vec<Shape>,
    pub area: f64,
    pub parcel_area: f64,
    /// Buildable area over parcel area, in [0, 1]
    pub fraction: f64,
    pub exclusions: Vec<Exclusion>,
    pub warnings: Vec<String>,
}

impl BuildableRegion {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn zone_shapes(zones: &[Zone], kind: ZoneKind) -> Vec<Shape> {
    zones
        .iter()
        .filter(|zone| zone.kind == kind)
        .filter_map(Zone::shape)
        .collect()
}

/// Resolve the buildable region and enforce the terrain-blocking threshold
pub fn resolve_buildable_region(
    parcel: &LandParcel,
    zones: &[Zone],
    terrain: Option<&TerrainAnalysis>,
    config: &PlannerConfig,
) -> Result<BuildableRegion> {
    let parcel_shape = parcel.shape();
    let buffered = offset_inward(std::slice::from_ref(&parcel_shape), config.safety_buffer);
    let mut exclusions = Vec::new();
    let mut warnings = Vec::new();

    let mut region = buffered.clone();

    let excluded = union_all(&zone_shapes(zones, ZoneKind::Exclusion));
    if !excluded.is_empty() {
        let before = total_area(&region);
        region = difference(&region, &excluded);
        let removed = before - total_area(&region);
        if removed > 0.0 {
            exclusions.push(Exclusion {
                reason: "User exclusion zones".to_string(),
                area: removed,
                location_sample: excluded
                    .first()
                    .and_then(|shape| polygon::centroid(&shape.exterior).ok()),
            });
        }
    }

    let mut roads = Vec::new();
    let mut unlocated_area = 0.0;
    if let Some(terrain) = terrain {
        for restricted in &terrain.restricted_areas {
            if !restricted.kind.is_avoided(config) {
                tracing::debug!(kind = ?restricted.kind, "Restriction overridden by configuration");
                continue;
            }

            let outline = restricted
                .polygon
                .as_ref()
                .filter(|points| polygon::open_ring(points).len() >= 3)
                .map(|points| Shape::new(points.clone()));

            match outline {
                Some(shape) => {
                    let overlap = total_area(&intersection(&region, std::slice::from_ref(&shape)));
                    region = difference(&region, std::slice::from_ref(&shape));
                    exclusions.push(Exclusion {
                        reason: restricted.reason.clone(),
                        area: overlap,
                        location_sample: polygon::centroid(&shape.exterior).ok(),
                    });
                    if restricted.kind == TerrainKind::Road {
                        roads.push(shape);
                    }
                }
                None => {
                    unlocated_area += restricted.area;
                    warnings.push(format!(
                        "Restricted {} ({}) has no outline; placement cannot route around it",
                        restricted.kind.label(),
                        restricted.reason
                    ));
                    exclusions.push(Exclusion {
                        reason: restricted.reason.clone(),
                        area: restricted.area,
                        location_sample: None,
                    });
                }
            }
        }
        warnings.extend(terrain.warnings.iter().cloned());
    }

    for zone in zones.iter().filter(|zone| zone.kind == ZoneKind::Inclusion) {
        let Some(shape) = zone.shape() else {
            continue;
        };
        let inside_parcel = shape
            .exterior
            .iter()
            .all(|p| parcel_shape.contains_point(*p));
        if !inside_parcel {
            warnings.push(format!(
                "Inclusion zone {} extends outside the parcel and was ignored",
                zone.label.as_deref().unwrap_or("(unnamed)")
            ));
            continue;
        }
        let clipped = intersection(&buffered, std::slice::from_ref(&shape));
        region = union(&region, &clipped);
    }
    if !roads.is_empty() {
        region = difference(&region, &union_all(&roads));
    }

    let area = total_area(&region);
    let parcel_area = parcel.area();
    let mut fraction = ((area - unlocated_area).max(0.0) / parcel_area).clamp(0.0, 1.0);

    if let Some(reported) = terrain
        .filter(|t| t.restrictions_active(config))
        .and_then(|t| t.buildable_area)
    {
        fraction = fraction.min((reported / parcel_area).clamp(0.0, 1.0));
    }

    tracing::info!(
        parcel = %parcel.name,
        buildable_area = area,
        fraction,
        pieces = region.len(),
        "Resolved buildable region"
    );

    if fraction < MIN_BUILDABLE_FRACTION {
        tracing::warn!(parcel = %parcel.name, fraction, "Terrain blocks construction");
        return Err(PlannerError::TerrainBlocked {
            fraction,
            minimum: MIN_BUILDABLE_FRACTION,
        });
    }

    Ok(BuildableRegion {
        shapes: region,
        area,
        parcel_area,
        fraction,
        exclusions,
        warnings,
    })
}
