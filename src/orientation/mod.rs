//! Orientation selection: which rotation angle(s) the structures use
//!
//! Angles are degrees counter-clockwise from east for a structure's length
//! axis, normalized to [0, 180) since a rectangle turned half a revolution
//! is the same footprint.

pub mod solar;

pub use solar::{EastWestGutterPolicy, Hemisphere, SolarPolicy, SolarTarget};

use crate::core::config::{OrientationStrategy, PlannerConfig};
use crate::core::types::Vec2;
use crate::geometry::polygon::{bounds, edges, Shape};
use crate::geometry::total_area;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Step between trial angles in the optimized sweep
pub const SWEEP_STEP_DEG: f64 = 5.0;

/// Upper bound on trial angles in the optimized sweep
pub const MAX_SWEEP_TRIALS: usize = 37;

/// Number of longest region edges considered as alignment candidates
const DOMINANT_EDGES: usize = 4;

const SCORE_EPSILON: f64 = 1e-9;

/// Angles chosen for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationPlan {
    pub primary_deg: f64,
    /// At most one entry, only for the varied strategy
    pub secondary_deg: Vec<f64>,
    pub solar_target: SolarTarget,
    pub strategy: OrientationStrategy,
}

impl OrientationPlan {
    pub fn angles(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::once(self.primary_deg).chain(self.secondary_deg.iter().copied())
    }
}

/// Scores how much of the region a trial placement covers at an angle
///
/// Used by the optimized strategy; implemented by the placement engines.
pub trait CoverageProbe: Sync {
    fn coverage(&self, angle_deg: f64) -> f64;
}

pub fn normalize_angle(deg: f64) -> f64 {
    let a = deg.rem_euclid(180.0);
    if a >= 180.0 - 1e-9 {
        0.0
    } else {
        a
    }
}

/// Smallest difference between two axis angles, in [0, 90]
pub fn angle_deviation(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(180.0);
    d.min(180.0 - d)
}

/// Region area over the area of its bounding box in the rotated frame
pub fn fill_ratio(shapes: &[Shape], angle_deg: f64) -> f64 {
    let u = Vec2::from_angle(angle_deg);
    let v = u.perp();
    let rotated: Vec<Vec2> = shapes
        .iter()
        .flat_map(|shape| shape.exterior.iter())
        .map(|p| Vec2::new(p.dot(&u), p.dot(&v)))
        .collect();
    if rotated.is_empty() {
        return 0.0;
    }
    let (min, max) = bounds(&rotated);
    let box_area = (max.x - min.x) * (max.y - min.y);
    if box_area <= 0.0 {
        return 0.0;
    }
    total_area(shapes) / box_area
}

/// Directions of the longest region edges, each with its perpendicular
fn dominant_angles(shapes: &[Shape]) -> Vec<f64> {
    let mut edge_list: Vec<(f64, f64)> = shapes
        .iter()
        .flat_map(|shape| edges(&shape.exterior))
        .map(|(a, b)| {
            let d = b - a;
            (d.length(), normalize_angle(d.y.atan2(d.x).to_degrees()))
        })
        .collect();
    edge_list.sort_by_key(|(len, angle)| (std::cmp::Reverse(OrderedFloat(*len)), OrderedFloat(*angle)));

    let mut angles: Vec<f64> = Vec::new();
    for (_, angle) in edge_list.into_iter().take(DOMINANT_EDGES) {
        for a in [angle, normalize_angle(angle + 90.0)] {
            if !angles.iter().any(|b| angle_deviation(a, *b) < 1e-6) {
                angles.push(a);
            }
        }
    }
    angles
}

/// Pick the best scoring angle; ties go to the one nearest the target
fn best_by_score(scored: &[(f64, f64)], target: f64) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for &(angle, score) in scored {
        best = match best {
            None => Some((angle, score)),
            Some((best_angle, best_score)) => {
                let better = score > best_score + SCORE_EPSILON
                    || ((score - best_score).abs() <= SCORE_EPSILON
                        && angle_deviation(angle, target) < angle_deviation(best_angle, target) - 1e-9);
                if better {
                    Some((angle, score))
                } else {
                    Some((best_angle, best_score))
                }
            }
        };
    }
    best.map(|(angle, _)| angle)
}

/// Chooses structure angles for one run
pub struct OrientationSelector<'a> {
    policy: &'a dyn SolarPolicy,
}

impl<'a> OrientationSelector<'a> {
    pub fn new(policy: &'a dyn SolarPolicy) -> Self {
        Self { policy }
    }

    pub fn select(
        &self,
        shapes: &[Shape],
        latitude: f64,
        config: &PlannerConfig,
        probe: Option<&dyn CoverageProbe>,
    ) -> OrientationPlan {
        let solar_target = self.policy.target(latitude);
        let target = normalize_angle(solar_target.angle_deg);
        let tolerance = config.effective_deviation();

        let (primary_deg, secondary_deg) = match (config.orientation_strategy, probe) {
            (OrientationStrategy::Optimized, Some(probe)) => {
                (self.sweep(target, tolerance, probe), Vec::new())
            }
            (OrientationStrategy::Optimized, None) => {
                tracing::warn!("No coverage probe for optimized orientation; using uniform selection");
                (self.uniform(shapes, target, tolerance), Vec::new())
            }
            (OrientationStrategy::Uniform, _) => (self.uniform(shapes, target, tolerance), Vec::new()),
            (OrientationStrategy::Varied, _) => {
                let primary = self.uniform(shapes, target, tolerance);
                let alternatives: Vec<(f64, f64)> = dominant_angles(shapes)
                    .into_iter()
                    .filter(|a| angle_deviation(*a, primary) > 1.0)
                    .map(|a| (a, fill_ratio(shapes, a)))
                    .collect();
                let secondary = best_by_score(&alternatives, primary).into_iter().collect();
                (primary, secondary)
            }
        };

        tracing::debug!(
            target,
            primary = primary_deg,
            secondary = ?secondary_deg,
            "Selected orientation"
        );

        OrientationPlan {
            primary_deg,
            secondary_deg,
            solar_target,
            strategy: config.orientation_strategy,
        }
    }

    /// Target angle, or the best filling parcel-edge angle within tolerance
    fn uniform(&self, shapes: &[Shape], target: f64, tolerance: f64) -> f64 {
        let mut scored = vec![(target, fill_ratio(shapes, target))];
        for angle in dominant_angles(shapes) {
            if angle_deviation(angle, target) <= tolerance + 1e-9 {
                scored.push((angle, fill_ratio(shapes, angle)));
            }
        }
        best_by_score(&scored, target).unwrap_or(target)
    }

    /// Bounded discrete sweep around the target, scored by trial placement
    fn sweep(&self, target: f64, tolerance: f64, probe: &dyn CoverageProbe) -> f64 {
        let steps = ((tolerance / SWEEP_STEP_DEG).floor() as usize).min((MAX_SWEEP_TRIALS - 1) / 2);
        let mut trials = vec![target];
        for k in 1..=steps {
            let offset = k as f64 * SWEEP_STEP_DEG;
            trials.push(normalize_angle(target - offset));
            trials.push(normalize_angle(target + offset));
        }

        let scored: Vec<(f64, f64)> = trials
            .par_iter()
            .map(|&angle| (angle, probe.coverage(angle)))
            .collect();

        best_by_score(&scored, target).unwrap_or(target)
    }
}
