//! Placement engines
//!
//! Engines share the feasibility rules in [`super::scheduler`] and differ in
//! how they walk the candidate catalog. The engine is chosen per run from
//! [`PlannerConfig::engine`].

use super::candidates::generate_candidates;
use super::control::{CancelToken, NoProgress, ProgressSink};
use super::scheduler::{Layout, LayoutState, PassProgress, PriorityScheduler, ScanGrid};
use super::structure::PlacementPass;
use crate::core::config::{EngineKind, PlannerConfig};
use crate::core::error::{PlannerError, Result};
use crate::geometry::polygon::Shape;
use crate::geometry::OrientedRect;
use crate::orientation::{CoverageProbe, OrientationPlan};

/// Region, configuration and angles for one engine run
#[derive(Debug, Clone, Copy)]
pub struct PlacementInput<'a> {
    pub shapes: &'a [Shape],
    pub config: &'a PlannerConfig,
    pub primary_deg: f64,
    pub secondary_deg: &'a [f64],
}

impl<'a> PlacementInput<'a> {
    pub fn new(shapes: &'a [Shape], config: &'a PlannerConfig, plan: &'a OrientationPlan) -> Self {
        Self {
            shapes,
            config,
            primary_deg: plan.primary_deg,
            secondary_deg: &plan.secondary_deg,
        }
    }

    pub fn single_angle(shapes: &'a [Shape], config: &'a PlannerConfig, angle_deg: f64) -> Self {
        Self {
            shapes,
            config,
            primary_deg: angle_deg,
            secondary_deg: &[],
        }
    }
}

pub trait PlacementEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Lay out structures; `Err(Cancelled)` discards any partial layout
    fn place(
        &self,
        input: &PlacementInput<'_>,
        cancel: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<Layout>;
}

pub fn engine_for(kind: EngineKind) -> Box<dyn PlacementEngine> {
    match kind {
        EngineKind::Priority => Box::new(PriorityGreedyEngine),
        EngineKind::UniformGrid => Box::new(UniformGridEngine),
    }
}

/// Largest-first greedy with secondary-angle and infill passes
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityGreedyEngine;

impl PlacementEngine for PriorityGreedyEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Priority
    }

    fn place(
        &self,
        input: &PlacementInput<'_>,
        cancel: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<Layout> {
        PriorityScheduler::new(input.shapes, input.config, cancel).run(
            input.primary_deg,
            input.secondary_deg,
            progress,
        )
    }
}

/// Rows of one size at the primary angle
///
/// Takes the largest candidate that fits at least once and tiles the
/// region with it, expanded footprints edge to edge. Secondary angles and
/// infill are not used.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformGridEngine;

impl PlacementEngine for UniformGridEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::UniformGrid
    }

    fn place(
        &self,
        input: &PlacementInput<'_>,
        cancel: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<Layout> {
        let config = input.config;
        let mut state = LayoutState::new(input.shapes, config);
        let Some(grid) = ScanGrid::new(input.shapes, input.primary_deg) else {
            progress.report(100);
            return Ok(state.into_layout());
        };

        let catalog = generate_candidates(config);
        let mut tracker = PassProgress::new(progress, catalog.len());
        let margin = 2.0 * config.clearance();

        'candidates: for candidate in &catalog {
            if cancel.is_cancelled() {
                return Err(PlannerError::Cancelled);
            }
            let (length, width) = (candidate.length + margin, candidate.width + margin);
            let (nu, nv) = grid.slots(length, width, length, width);
            for j in 0..nv {
                for i in 0..nu {
                    let expanded = grid.rect_at(i as f64 * length, j as f64 * width, length, width);
                    let footprint = OrientedRect::new(
                        expanded.center,
                        candidate.length,
                        candidate.width,
                        grid.angle_deg,
                    );
                    if state.accepts(&footprint) {
                        state.commit(*candidate, footprint, PlacementPass::Grid);
                    }
                    if state.budget_exhausted() {
                        break 'candidates;
                    }
                }
            }
            tracker.tick();
            if state.placed() > 0 {
                tracing::debug!(
                    length = candidate.length,
                    width = candidate.width,
                    placed = state.placed(),
                    "Uniform grid size chosen"
                );
                break;
            }
        }

        tracker.finish();
        Ok(state.into_layout())
    }
}

/// Scores trial angles by running an engine without infill
pub struct EngineProbe<'a> {
    engine: &'a dyn PlacementEngine,
    shapes: &'a [Shape],
    config: PlannerConfig,
    cancel: &'a CancelToken,
}

impl<'a> EngineProbe<'a> {
    pub fn new(
        engine: &'a dyn PlacementEngine,
        shapes: &'a [Shape],
        config: &PlannerConfig,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            engine,
            shapes,
            config: PlannerConfig {
                allow_infill: false,
                ..config.clone()
            },
            cancel,
        }
    }
}

impl CoverageProbe for EngineProbe<'_> {
    fn coverage(&self, angle_deg: f64) -> f64 {
        let input = PlacementInput::single_angle(self.shapes, &self.config, angle_deg);
        match self.engine.place(&input, self.cancel, &NoProgress) {
            Ok(layout) => layout.outer_area(),
            // A cancelled trial scores nothing; the main run reports the cancellation
            Err(_) => 0.0,
        }
    }
}
