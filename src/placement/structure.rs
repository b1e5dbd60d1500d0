//! Placed structures and their module grids

use super::candidates::Candidate;
use crate::core::config::PlannerConfig;
use crate::core::types::{GeoPoint, Vec2};
use crate::geometry::{GeoProjection, OrientedRect};
use serde::{Deserialize, Serialize};

/// Which scheduler pass committed a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPass {
    Primary,
    Secondary,
    Infill,
    Grid,
}

/// One module cell inside a structure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub row: u32,
    pub col: u32,
    /// Module center relative to the structure center, in the structure's
    /// own frame (x along length)
    pub offset: Vec2,
}

/// A committed structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedStructure {
    /// 1-based, in placement order
    pub id: u32,
    pub center: Vec2,
    pub center_geo: GeoPoint,
    pub rotation_deg: f64,
    pub length: f64,
    pub width: f64,
    pub modules_x: u32,
    pub modules_y: u32,
    pub outer_area: f64,
    /// Footprint shrunk by the gutter on every side
    pub inner_area: f64,
    pub perimeter: f64,
    pub modules: Vec<Module>,
    pub pass: PlacementPass,
}

impl PlacedStructure {
    pub fn new(
        id: u32,
        candidate: &Candidate,
        footprint: &OrientedRect,
        pass: PlacementPass,
        config: &PlannerConfig,
        projection: &GeoProjection,
    ) -> Self {
        let gutter = 2.0 * config.gutter_width;
        let inner_area =
            (candidate.length - gutter).max(0.0) * (candidate.width - gutter).max(0.0);

        let mut modules = Vec::with_capacity(candidate.module_count() as usize);
        for row in 0..candidate.modules_y {
            for col in 0..candidate.modules_x {
                modules.push(Module {
                    row,
                    col,
                    offset: Vec2::new(
                        -candidate.length / 2.0 + (col as f64 + 0.5) * config.module_width,
                        -candidate.width / 2.0 + (row as f64 + 0.5) * config.module_height,
                    ),
                });
            }
        }

        Self {
            id,
            center: footprint.center,
            center_geo: projection.to_geo(footprint.center),
            rotation_deg: footprint.angle_deg,
            length: candidate.length,
            width: candidate.width,
            modules_x: candidate.modules_x,
            modules_y: candidate.modules_y,
            outer_area: candidate.area(),
            inner_area,
            perimeter: footprint.perimeter(),
            modules,
            pass,
        }
    }

    pub fn footprint(&self) -> OrientedRect {
        OrientedRect::new(self.center, self.length, self.width, self.rotation_deg)
    }

    pub fn module_count(&self) -> u32 {
        self.modules_x * self.modules_y
    }

    /// Module center in the planar frame
    pub fn module_position(&self, module: &Module) -> Vec2 {
        let (u, v) = self.footprint().axes();
        self.center + u.scale(module.offset.x) + v.scale(module.offset.y)
    }
}
