//! Post-processing: totals, diagnostics and layout verification

use super::result::{PlacementMetadata, PlacementResult, UnbuildableRegion};
use super::scheduler::Layout;
use super::structure::PlacedStructure;
use crate::core::config::{EngineKind, PlannerConfig};
use crate::core::types::EPSILON;
use crate::geometry::shapes_contain_rect;
use crate::orientation::angle_deviation;
use crate::parcel::LandParcel;
use crate::region::BuildableRegion;

/// Utilization below which a warning is emitted, in percent
pub const LOW_UTILIZATION_PCT: f64 = 30.0;

/// Utilization below which leftover area is attributed to shape and spacing
pub const SHAPE_LOSS_UTILIZATION_PCT: f64 = 70.0;

/// Share of the parcel attributed to the boundary safety buffer
pub const SAFETY_BUFFER_SHARE: f64 = 0.05;

/// Inputs besides the layout that the result needs
pub struct ReportContext<'a> {
    pub parcel: &'a LandParcel,
    pub region: &'a BuildableRegion,
    pub config: &'a PlannerConfig,
    pub engine: EngineKind,
    pub computation_time_ms: u64,
}

/// Check a finished layout against the placement rules
///
/// Returns one message per broken rule; an empty list means the layout is
/// sound.
pub fn verify_layout(
    structures: &[PlacedStructure],
    region: &BuildableRegion,
    config: &PlannerConfig,
) -> Vec<String> {
    let mut violations = Vec::new();
    let clearance = config.clearance();

    for (i, a) in structures.iter().enumerate() {
        let footprint = a.footprint();
        if !shapes_contain_rect(&region.shapes, &footprint) {
            violations.push(format!("Structure {} extends outside the buildable region", a.id));
        }
        let sides_ok = [a.length, a.width].iter().all(|side| {
            *side >= config.min_side_length - EPSILON && *side <= config.max_side_length + EPSILON
        });
        if !sides_ok || a.outer_area > config.max_structure_area + EPSILON {
            violations.push(format!(
                "Structure {} is {} x {} m, outside sizing limits",
                a.id, a.length, a.width
            ));
        }
        for b in &structures[i + 1..] {
            let separation = footprint.minimum_separation(&b.footprint());
            if separation < clearance - EPSILON {
                violations.push(format!(
                    "Structures {} and {} are {:.2} m apart, below the {:.2} m clearance",
                    a.id, b.id, separation, clearance
                ));
            }
        }
    }
    violations
}

/// Decorate a layout into the immutable result
pub fn build_result(layout: Layout, ctx: &ReportContext<'_>) -> PlacementResult {
    let projection = ctx.parcel.projection();
    let structures: Vec<PlacedStructure> = layout
        .placements
        .iter()
        .enumerate()
        .map(|(i, p)| {
            PlacedStructure::new(
                i as u32 + 1,
                &p.candidate,
                &p.footprint,
                p.pass,
                ctx.config,
                projection,
            )
        })
        .collect();

    let total_outer_area: f64 = structures.iter().map(|s| s.outer_area).sum();
    let total_inner_area: f64 = structures.iter().map(|s| s.inner_area).sum();
    let parcel_area = ctx.parcel.area();
    let utilization_percentage = if parcel_area > 0.0 {
        total_outer_area / parcel_area * 100.0
    } else {
        0.0
    };

    let mut angles: Vec<f64> = Vec::new();
    for s in &structures {
        if !angles.iter().any(|a| angle_deviation(*a, s.rotation_deg) < 1e-6) {
            angles.push(s.rotation_deg);
        }
    }

    let mut warnings = ctx.region.warnings.clone();
    let mut errors = Vec::new();
    if layout.budget_exhausted {
        warnings.push(format!(
            "Iteration budget of {} exhausted; layout may be incomplete",
            ctx.config.max_iterations
        ));
    }
    if structures.is_empty() {
        errors.push(format!(
            "No structures could be placed: the buildable area of {:.0} m² cannot hold the minimum structure",
            ctx.region.area
        ));
    } else if utilization_percentage < LOW_UTILIZATION_PCT {
        warnings.push(format!(
            "Low land utilization ({utilization_percentage:.1}%). Consider adjusting constraints or parcel selection"
        ));
    }

    let mut unbuildable_regions = vec![UnbuildableRegion {
        reason: "Boundary safety buffer".to_string(),
        affected_area: parcel_area * SAFETY_BUFFER_SHARE,
        location_sample: None,
    }];
    let mut explained = parcel_area * SAFETY_BUFFER_SHARE;
    for exclusion in &ctx.region.exclusions {
        explained += exclusion.area;
        unbuildable_regions.push(UnbuildableRegion {
            reason: exclusion.reason.clone(),
            affected_area: exclusion.area,
            location_sample: exclusion.location_sample.map(|p| projection.to_geo(p)),
        });
    }
    if utilization_percentage < SHAPE_LOSS_UTILIZATION_PCT {
        let remaining = (parcel_area - total_outer_area - explained).max(0.0);
        unbuildable_regions.push(UnbuildableRegion {
            reason: "Irregular shape and spacing constraints".to_string(),
            affected_area: remaining,
            location_sample: None,
        });
    }

    let constraint_violations = verify_layout(&structures, ctx.region, ctx.config);
    if !constraint_violations.is_empty() {
        tracing::warn!(count = constraint_violations.len(), "Layout breaks placement rules");
    }

    PlacementResult {
        metadata: PlacementMetadata {
            count: structures.len(),
            total_inner_area,
            total_outer_area,
            parcel_area,
            buildable_area: ctx.region.area,
            utilization_percentage,
            angles,
            engine: ctx.engine,
            iterations: layout.iterations,
            budget_exhausted: layout.budget_exhausted,
            computation_time_ms: ctx.computation_time_ms,
        },
        structures,
        warnings,
        errors,
        unbuildable_regions,
        constraint_violations,
    }
}
