//! Priority placement scheduler
//!
//! Candidates are tried largest first. Each candidate scans a grid aligned
//! with the pass angle, row by row from the minimum corner of the region's
//! rotated bounding box, and the first feasible slot is committed. The same
//! size is retried until it no longer fits; only then does the next smaller
//! size get a turn.
//!
//! Feasibility of a slot:
//! - the footprint expanded by gutter + gap lies inside the buildable region
//! - the expanded footprint does not overlap any committed expanded footprint
//! - footprint corners keep the minimum corner clearance from the boundary
//!
//! Committed footprints are obstacles, so a slot rejected once stays
//! rejected for the rest of the run. Retries resume after the last
//! committed slot instead of rescanning.

use super::candidates::{generate_candidates, infill_candidates, Candidate};
use super::control::{CancelToken, ProgressSink};
use super::structure::PlacementPass;
use crate::core::config::PlannerConfig;
use crate::core::error::{PlannerError, Result};
use crate::core::types::{Vec2, EPSILON};
use crate::geometry::polygon::Shape;
use crate::geometry::{distance_to_boundary, shapes_contain_rect, OrientedRect};

/// A committed footprint before it is decorated for output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub candidate: Candidate,
    pub footprint: OrientedRect,
    pub pass: PlacementPass,
}

/// Raw engine output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub placements: Vec<Placement>,
    /// Feasibility checks performed
    pub iterations: u64,
    pub budget_exhausted: bool,
}

impl Layout {
    pub fn outer_area(&self) -> f64 {
        self.placements.iter().map(|p| p.candidate.area()).sum()
    }
}

/// Scan positions aligned with one angle
pub(crate) struct ScanGrid {
    pub(crate) angle_deg: f64,
    origin: Vec2,
    u: Vec2,
    v: Vec2,
    span_u: f64,
    span_v: f64,
}

impl ScanGrid {
    /// Grid over the rotated bounding box of `shapes`; None for an empty set
    pub(crate) fn new(shapes: &[Shape], angle_deg: f64) -> Option<Self> {
        let u = Vec2::from_angle(angle_deg);
        let v = u.perp();
        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in shapes.iter().flat_map(|shape| shape.exterior.iter()) {
            let (pu, pv) = (p.dot(&u), p.dot(&v));
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }
        if !min_u.is_finite() || !min_v.is_finite() {
            return None;
        }
        Some(Self {
            angle_deg,
            origin: u.scale(min_u) + v.scale(min_v),
            u,
            v,
            span_u: max_u - min_u,
            span_v: max_v - min_v,
        })
    }

    /// Slots along and across the angle for a rectangle of the given size
    pub(crate) fn slots(&self, length: f64, width: f64, step_u: f64, step_v: f64) -> (usize, usize) {
        let count = |span: f64, size: f64, step: f64| {
            if size > span + EPSILON {
                0
            } else {
                ((span - size) / step + EPSILON).floor() as usize + 1
            }
        };
        (
            count(self.span_u, length, step_u),
            count(self.span_v, width, step_v),
        )
    }

    /// Rectangle whose lowest corner sits `along` and `across` from the origin
    pub(crate) fn rect_at(&self, along: f64, across: f64, length: f64, width: f64) -> OrientedRect {
        let corner = self.origin + self.u.scale(along) + self.v.scale(across);
        OrientedRect::from_corner(corner, length, width, self.angle_deg)
    }
}

/// Committed footprints plus the feasibility test against them
pub(crate) struct LayoutState<'a> {
    shapes: &'a [Shape],
    config: &'a PlannerConfig,
    layout: Layout,
    expanded: Vec<OrientedRect>,
}

impl<'a> LayoutState<'a> {
    pub(crate) fn new(shapes: &'a [Shape], config: &'a PlannerConfig) -> Self {
        Self {
            shapes,
            config,
            layout: Layout::default(),
            expanded: Vec::new(),
        }
    }

    pub(crate) fn budget_exhausted(&self) -> bool {
        self.layout.budget_exhausted
    }

    pub(crate) fn placed(&self) -> usize {
        self.layout.placements.len()
    }

    /// Test one slot; every call counts against the iteration budget
    pub(crate) fn accepts(&mut self, footprint: &OrientedRect) -> bool {
        if self.layout.iterations >= self.config.max_iterations {
            if !self.layout.budget_exhausted {
                tracing::warn!(
                    iterations = self.layout.iterations,
                    placed = self.placed(),
                    "Iteration budget exhausted"
                );
                self.layout.budget_exhausted = true;
            }
            return false;
        }
        self.layout.iterations += 1;

        let expanded = footprint.expanded(self.config.clearance());
        if self.expanded.iter().any(|other| other.intersects(&expanded)) {
            return false;
        }
        if !shapes_contain_rect(self.shapes, &expanded) {
            return false;
        }

        let clearance = self.config.min_corner_clearance;
        clearance <= 0.0
            || footprint
                .corners()
                .iter()
                .all(|c| distance_to_boundary(self.shapes, *c) >= clearance - EPSILON)
    }

    pub(crate) fn commit(&mut self, candidate: Candidate, footprint: OrientedRect, pass: PlacementPass) {
        tracing::trace!(
            length = candidate.length,
            width = candidate.width,
            x = footprint.center.x,
            y = footprint.center.y,
            ?pass,
            "Committed structure"
        );
        self.expanded.push(footprint.expanded(self.config.clearance()));
        self.layout.placements.push(Placement {
            candidate,
            footprint,
            pass,
        });
    }

    pub(crate) fn into_layout(self) -> Layout {
        self.layout
    }
}

/// Candidate-level progress across all passes of a run
pub(crate) struct PassProgress<'p> {
    sink: &'p dyn ProgressSink,
    done: usize,
    total: usize,
}

impl<'p> PassProgress<'p> {
    pub(crate) fn new(sink: &'p dyn ProgressSink, total: usize) -> Self {
        sink.report(0);
        Self {
            sink,
            done: 0,
            total: total.max(1),
        }
    }

    pub(crate) fn tick(&mut self) {
        self.done += 1;
        let percent = (self.done * 100 / self.total).min(99);
        self.sink.report(percent as u8);
    }

    pub(crate) fn finish(&self) {
        self.sink.report(100);
    }
}

/// Large-first greedy scheduler over one buildable region
pub struct PriorityScheduler<'a> {
    shapes: &'a [Shape],
    config: &'a PlannerConfig,
    cancel: &'a CancelToken,
    state: LayoutState<'a>,
}

impl<'a> PriorityScheduler<'a> {
    pub fn new(shapes: &'a [Shape], config: &'a PlannerConfig, cancel: &'a CancelToken) -> Self {
        Self {
            shapes,
            config,
            cancel,
            state: LayoutState::new(shapes, config),
        }
    }

    /// Run every pass: primary, then each secondary angle, then infill
    pub fn run(
        mut self,
        primary_deg: f64,
        secondary_deg: &[f64],
        progress: &dyn ProgressSink,
    ) -> Result<Layout> {
        let catalog = generate_candidates(self.config);
        let infill = if self.config.allow_infill {
            infill_candidates(self.config)
        } else {
            Vec::new()
        };

        let mut passes: Vec<(f64, &[Candidate], PlacementPass)> =
            vec![(primary_deg, catalog.as_slice(), PlacementPass::Primary)];
        passes.extend(
            secondary_deg
                .iter()
                .map(|&angle| (angle, catalog.as_slice(), PlacementPass::Secondary)),
        );
        if !infill.is_empty() {
            passes.extend(
                std::iter::once(primary_deg)
                    .chain(secondary_deg.iter().copied())
                    .map(|angle| (angle, infill.as_slice(), PlacementPass::Infill)),
            );
        }

        let total = passes.iter().map(|(_, candidates, _)| candidates.len()).sum();
        let mut tracker = PassProgress::new(progress, total);

        for (angle, candidates, pass) in passes {
            let before = self.state.placed();
            self.run_pass(angle, candidates, pass, &mut tracker)?;
            tracing::debug!(
                angle,
                ?pass,
                placed = self.state.placed() - before,
                "Pass complete"
            );
            if self.state.budget_exhausted() {
                break;
            }
        }

        tracker.finish();
        Ok(self.state.into_layout())
    }

    /// Try each candidate in order at one angle
    pub(crate) fn run_pass(
        &mut self,
        angle_deg: f64,
        candidates: &[Candidate],
        pass: PlacementPass,
        tracker: &mut PassProgress<'_>,
    ) -> Result<()> {
        let Some(grid) = ScanGrid::new(self.shapes, angle_deg) else {
            return Ok(());
        };

        for candidate in candidates {
            let mut resume = 0;
            loop {
                if self.cancel.is_cancelled() {
                    return Err(PlannerError::Cancelled);
                }
                match self.find_slot(&grid, candidate, resume) {
                    Some((slot, footprint)) => {
                        self.state.commit(*candidate, footprint, pass);
                        resume = slot + 1;
                    }
                    None => break,
                }
            }
            if self.state.budget_exhausted() {
                return Ok(());
            }
            tracker.tick();
        }
        Ok(())
    }

    /// First feasible slot at or after `start`
    fn find_slot(
        &mut self,
        grid: &ScanGrid,
        candidate: &Candidate,
        start: usize,
    ) -> Option<(usize, OrientedRect)> {
        let margin = 2.0 * self.config.clearance();
        let (length, width) = (candidate.length + margin, candidate.width + margin);
        let (step_u, step_v) = (self.config.module_width, self.config.module_height);
        let (nu, nv) = grid.slots(length, width, step_u, step_v);

        for slot in start..nu * nv {
            let (i, j) = (slot % nu, slot / nu);
            let expanded = grid.rect_at(i as f64 * step_u, j as f64 * step_v, length, width);
            let footprint = OrientedRect::new(
                expanded.center,
                candidate.length,
                candidate.width,
                grid.angle_deg,
            );
            if self.state.accepts(&footprint) {
                return Some((slot, footprint));
            }
            if self.state.budget_exhausted() {
                return None;
            }
        }
        None
    }
}
