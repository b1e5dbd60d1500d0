//! Property tests for layout invariants
//!
//! Every generated parcel is planned end to end and the result is checked
//! for:
//! - no overlap between footprints expanded by gutter + gap
//! - containment of every footprint in the buildable region
//! - module-multiple sizing within the configured limits
//! - a single angle under the uniform strategy
//! - identical structures across repeated runs
//! - infill never disturbing the large-first structures

use polyhouse_planner::core::config::{OrientationStrategy, PlannerConfig};
use polyhouse_planner::core::error::PlannerError;
use polyhouse_planner::core::types::Vec2;
use polyhouse_planner::geometry::{shapes_contain_rect, OrientedRect};
use polyhouse_planner::orientation::{angle_deviation, EastWestGutterPolicy};
use polyhouse_planner::parcel::{LandParcel, Zone, ZoneKind};
use polyhouse_planner::placement::{CancelToken, NoProgress, PlacementPass, PlacementResult};
use polyhouse_planner::planning::{optimize, PlanningInput};
use polyhouse_planner::region::{resolve_buildable_region, BuildableRegion};
use proptest::prelude::*;

// ============================================================================
// Generators and helpers
// ============================================================================

/// Quadrilateral parcel with jittered corners, counter-clockwise
fn quad_parcel(width: f64, height: f64, jitter: [f64; 4]) -> LandParcel {
    LandParcel::from_planar(
        "Generated",
        vec![
            Vec2::new(jitter[0] * width, 0.0),
            Vec2::new(width, jitter[1] * height),
            Vec2::new(width - jitter[2] * width, height),
            Vec2::new(0.0, height - jitter[3] * height),
        ],
        18.5,
    )
    .unwrap()
}

fn square_zone(x: f64, y: f64, size: f64) -> Zone {
    Zone::new(
        ZoneKind::Exclusion,
        vec![
            Vec2::new(x, y),
            Vec2::new(x + size, y),
            Vec2::new(x + size, y + size),
            Vec2::new(x, y + size),
        ],
    )
}

/// None only when the parcel is terrain-blocked; any other failure is a bug
fn plan(parcel: &LandParcel, zones: &[Zone], config: &PlannerConfig) -> Option<PlacementResult> {
    let input = PlanningInput {
        parcel,
        zones,
        terrain: None,
        config,
    };
    match optimize(
        &input,
        &EastWestGutterPolicy::default(),
        &CancelToken::new(),
        &NoProgress,
    ) {
        Ok(result) => Some(result),
        Err(PlannerError::TerrainBlocked { .. }) => None,
        Err(other) => panic!("unexpected planning failure: {other}"),
    }
}

fn region(parcel: &LandParcel, zones: &[Zone], config: &PlannerConfig) -> BuildableRegion {
    resolve_buildable_region(parcel, zones, None, config).unwrap()
}

fn is_multiple(value: f64, unit: f64) -> bool {
    let ratio = value / unit;
    (ratio - ratio.round()).abs() < 1e-9
}

fn strategy() -> impl Strategy<Value = OrientationStrategy> {
    prop_oneof![
        Just(OrientationStrategy::Uniform),
        Just(OrientationStrategy::Varied),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_layout_respects_placement_rules(
        width in 40.0f64..140.0,
        height in 40.0f64..140.0,
        jitter in prop::array::uniform4(0.0f64..0.2),
        gap in 1.0f64..4.0,
        orientation in strategy(),
        hole in prop::option::of((0.2f64..0.6, 0.2f64..0.6, 5.0f64..20.0)),
    ) {
        let parcel = quad_parcel(width, height, jitter);
        let zones: Vec<Zone> = hole
            .map(|(fx, fy, size)| square_zone(fx * width, fy * height, size))
            .into_iter()
            .collect();
        let hole_rect = hole.map(|(fx, fy, size)| {
            OrientedRect::from_corner(Vec2::new(fx * width, fy * height), size, size, 0.0)
        });
        let config = PlannerConfig {
            structure_gap: gap,
            orientation_strategy: orientation,
            ..Default::default()
        };

        // Small or heavily excluded parcels may be terrain-blocked
        let Some(result) = plan(&parcel, &zones, &config) else {
            return Ok(());
        };
        let region = region(&parcel, &zones, &config);
        let clearance = config.clearance();

        prop_assert!(result.constraint_violations.is_empty(), "{:?}", result.constraint_violations);

        for (i, a) in result.structures.iter().enumerate() {
            prop_assert!(shapes_contain_rect(&region.shapes, &a.footprint()));
            if let Some(hole_rect) = &hole_rect {
                prop_assert!(
                    !a.footprint().intersects(hole_rect),
                    "structure {} crosses the exclusion zone", a.id
                );
            }

            prop_assert!(is_multiple(a.length, config.module_width));
            prop_assert!(is_multiple(a.width, config.module_height));
            prop_assert!(a.outer_area <= config.max_structure_area + 1e-6);
            let floor = if a.pass == PlacementPass::Infill { 2 } else { config.min_modules_per_structure };
            prop_assert!(a.module_count() >= floor);

            for b in &result.structures[i + 1..] {
                prop_assert!(
                    !a.footprint().expanded(clearance / 2.0).intersects(&b.footprint().expanded(clearance / 2.0)),
                    "structures {} and {} overlap", a.id, b.id
                );
            }
        }

        if orientation == OrientationStrategy::Uniform {
            if let Some(first) = result.structures.first() {
                for s in &result.structures {
                    prop_assert!(angle_deviation(s.rotation_deg, first.rotation_deg) < 1e-6);
                }
            }
        }
    }

    #[test]
    fn prop_runs_are_deterministic(
        width in 40.0f64..120.0,
        height in 40.0f64..120.0,
        jitter in prop::array::uniform4(0.0f64..0.2),
    ) {
        let parcel = quad_parcel(width, height, jitter);
        let config = PlannerConfig::default();
        let first = plan(&parcel, &[], &config);
        let second = plan(&parcel, &[], &config);
        prop_assert_eq!(
            first.map(|r| r.structures),
            second.map(|r| r.structures)
        );
    }

    #[test]
    fn prop_infill_is_strictly_additive(
        width in 40.0f64..120.0,
        height in 40.0f64..120.0,
        jitter in prop::array::uniform4(0.0f64..0.2),
    ) {
        let parcel = quad_parcel(width, height, jitter);
        let with = plan(&parcel, &[], &PlannerConfig::default());
        let without = plan(&parcel, &[], &PlannerConfig { allow_infill: false, ..Default::default() });

        if let (Some(with), Some(without)) = (with, without) {
            let large: Vec<_> = with
                .structures
                .iter()
                .filter(|s| s.pass != PlacementPass::Infill)
                .collect();
            prop_assert_eq!(large.len(), without.structures.len());
            for (a, b) in large.iter().zip(&without.structures) {
                prop_assert_eq!(a.center, b.center);
                prop_assert_eq!(a.length, b.length);
                prop_assert_eq!(a.width, b.width);
            }
        }
    }
}
