//! Planner configuration and its layering
//!
//! Every tunable distance, size limit and flag lives in [`PlannerConfig`].
//! A run never reads configuration from anywhere else: `resolve_config`
//! merges the three layers once and validates the result before
//! optimization starts.

use crate::core::error::{PlannerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Minimum buildable fraction of a parcel before planning is refused
pub const MIN_BUILDABLE_FRACTION: f64 = 0.10;

/// Smallest module count that still forms a valid structure (infill floor)
pub const INFILL_MIN_MODULES: u32 = 2;

/// Window used when the solar deviation tolerance is left at 0 ("auto")
pub const AUTO_DEVIATION_DEG: f64 = 15.0;

/// How structures are oriented across the parcel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationStrategy {
    /// One angle for every structure
    #[default]
    Uniform,
    /// Primary angle plus at most one secondary angle for leftover areas
    Varied,
    /// Bounded sweep of trial angles, best coverage wins
    Optimized,
}

/// Which placement engine lays out the structures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Largest-first greedy scheduler with infill
    #[default]
    Priority,
    /// Rows of the single largest size that fits
    UniformGrid,
}

/// Fully resolved planner configuration
///
/// Lengths are meters, areas square meters, angles degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    // === MODULE GRID ===
    /// Module extent along a structure's length axis
    ///
    /// Design constant. Never derived from the parcel and not overridable
    /// per request.
    pub module_width: f64,

    /// Module extent along a structure's width axis
    pub module_height: f64,

    // === SPACING ===
    /// Drainage margin inside the outer footprint
    ///
    /// Inner usable area is the footprint shrunk by this on every side.
    /// Also part of the clearance each structure keeps around itself.
    pub gutter_width: f64,

    /// Access corridor each structure keeps around itself
    ///
    /// Footprints are expanded by gutter + gap on all sides; expanded
    /// footprints may touch but never overlap, and must stay inside the
    /// buildable region.
    pub structure_gap: f64,

    /// Setback from the parcel boundary, applied as an inward offset
    pub safety_buffer: f64,

    /// Minimum distance from any structure corner to the region boundary
    pub min_corner_clearance: f64,

    // === SIZING ===
    /// Shortest allowed side of a structure
    pub min_side_length: f64,

    /// Longest allowed side of a structure
    pub max_side_length: f64,

    /// Minimum modules per structure outside the infill pass
    ///
    /// At 8 x 4 m modules the default of 10 means 320 m² minimum.
    pub min_modules_per_structure: u32,

    /// Upper bound on a single structure's outer area
    pub max_structure_area: f64,

    // === ORIENTATION ===
    /// Align structures with the sun. Always forced back to true.
    pub solar_orientation: bool,

    /// Allowed deviation from the solar target angle (0 = auto)
    pub solar_deviation_deg: f64,

    pub orientation_strategy: OrientationStrategy,

    // === TERRAIN ===
    pub consider_slope: bool,
    pub avoid_water: bool,

    /// Build over restricted terrain (roads excepted)
    pub allow_terrain_override: bool,

    // === PLACEMENT ===
    /// Run the infill pass with smaller structures after the large-first pass
    pub allow_infill: bool,

    pub engine: EngineKind,

    /// Safety bound on feasibility checks per run
    ///
    /// Exhausting it ends the run early with a warning; it is not an error.
    pub max_iterations: u64,

    /// Wall-clock budget in milliseconds after which the run is aborted
    pub time_budget_ms: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            module_width: 8.0,
            module_height: 4.0,

            gutter_width: 1.0,
            structure_gap: 2.0,
            safety_buffer: 1.0,
            min_corner_clearance: 0.0,

            min_side_length: 16.0,
            max_side_length: 120.0,
            min_modules_per_structure: 10,
            max_structure_area: 10_000.0,

            solar_orientation: true,
            solar_deviation_deg: 0.0,
            orientation_strategy: OrientationStrategy::Uniform,

            consider_slope: true,
            avoid_water: true,
            allow_terrain_override: false,

            allow_infill: true,
            engine: EngineKind::Priority,
            max_iterations: 5_000_000,
            time_budget_ms: None,
        }
    }
}

impl PlannerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Clearance kept around every footprint
    pub fn clearance(&self) -> f64 {
        self.gutter_width + self.structure_gap
    }

    /// Area of one module
    pub fn module_area(&self) -> f64 {
        self.module_width * self.module_height
    }

    /// Deviation window actually searched by the orientation selector
    pub fn effective_deviation(&self) -> f64 {
        if self.solar_deviation_deg <= 0.0 {
            AUTO_DEVIATION_DEG
        } else {
            self.solar_deviation_deg
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("module_width", self.module_width),
            ("module_height", self.module_height),
            ("min_side_length", self.min_side_length),
            ("max_side_length", self.max_side_length),
            ("max_structure_area", self.max_structure_area),
        ];
        for (name, value) in sizes {
            if !value.is_finite() {
                return Err(PlannerError::InvalidConfig(format!(
                    "{} ({}) must be finite",
                    name, value
                )));
            }
        }

        if self.module_width <= 0.0 || self.module_height <= 0.0 {
            return Err(PlannerError::InvalidConfig(
                "module dimensions must be positive".into(),
            ));
        }

        if self.min_side_length <= 0.0 {
            return Err(PlannerError::InvalidConfig(format!(
                "min_side_length ({}) must be positive",
                self.min_side_length
            )));
        }

        if self.min_side_length > self.max_side_length {
            return Err(PlannerError::InvalidConfig(format!(
                "min_side_length ({}) must be <= max_side_length ({})",
                self.min_side_length, self.max_side_length
            )));
        }

        let distances = [
            ("gutter_width", self.gutter_width),
            ("structure_gap", self.structure_gap),
            ("safety_buffer", self.safety_buffer),
            ("min_corner_clearance", self.min_corner_clearance),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(PlannerError::InvalidConfig(format!(
                    "{} ({}) must be a non-negative distance",
                    name, value
                )));
            }
        }

        // The gutter sits inside the footprint, so the smallest side must
        // still leave usable area.
        if self.gutter_width * 2.0 >= self.min_side_length {
            return Err(PlannerError::InvalidConfig(format!(
                "gutter_width ({}) leaves no usable area at min_side_length ({})",
                self.gutter_width, self.min_side_length
            )));
        }

        if self.min_modules_per_structure < INFILL_MIN_MODULES {
            return Err(PlannerError::InvalidConfig(format!(
                "min_modules_per_structure ({}) must be >= {}",
                self.min_modules_per_structure, INFILL_MIN_MODULES
            )));
        }

        if self.max_structure_area < self.module_area() * INFILL_MIN_MODULES as f64 {
            return Err(PlannerError::InvalidConfig(format!(
                "max_structure_area ({}) is smaller than the smallest structure",
                self.max_structure_area
            )));
        }

        if !(0.0..=90.0).contains(&self.solar_deviation_deg) {
            return Err(PlannerError::InvalidConfig(format!(
                "solar_deviation_deg ({}) must be within [0, 90]",
                self.solar_deviation_deg
            )));
        }

        if self.max_iterations == 0 {
            return Err(PlannerError::InvalidConfig(
                "max_iterations must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Optional configuration fields, used for stored user defaults and
/// per-request overrides alike
///
/// Module dimensions are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub gutter_width: Option<f64>,
    pub structure_gap: Option<f64>,
    pub safety_buffer: Option<f64>,
    pub min_corner_clearance: Option<f64>,
    pub min_side_length: Option<f64>,
    pub max_side_length: Option<f64>,
    pub min_modules_per_structure: Option<u32>,
    pub max_structure_area: Option<f64>,
    pub solar_orientation: Option<bool>,
    pub solar_deviation_deg: Option<f64>,
    pub orientation_strategy: Option<OrientationStrategy>,
    pub consider_slope: Option<bool>,
    pub avoid_water: Option<bool>,
    pub allow_terrain_override: Option<bool>,
    pub allow_infill: Option<bool>,
    pub engine: Option<EngineKind>,
    pub max_iterations: Option<u64>,
    pub time_budget_ms: Option<u64>,
}

macro_rules! merge_fields {
    ($dst:expr, $src:expr, $($field:ident),+ $(,)?) => {
        $( if let Some(value) = $src.$field { $dst.$field = Some(value); } )+
    };
}

macro_rules! apply_fields {
    ($dst:expr, $src:expr, $($field:ident),+ $(,)?) => {
        $( if let Some(value) = $src.$field { $dst.$field = value; } )+
    };
}

impl ConfigOverrides {
    /// Layer `other` on top of `self`; fields set in `other` win
    pub fn merge(&mut self, other: &ConfigOverrides) {
        merge_fields!(
            self,
            other,
            gutter_width,
            structure_gap,
            safety_buffer,
            min_corner_clearance,
            min_side_length,
            max_side_length,
            min_modules_per_structure,
            max_structure_area,
            solar_orientation,
            solar_deviation_deg,
            orientation_strategy,
            consider_slope,
            avoid_water,
            allow_terrain_override,
            allow_infill,
            engine,
            max_iterations,
            time_budget_ms,
        );
    }

    fn apply_to(&self, config: &mut PlannerConfig) {
        apply_fields!(
            config,
            self,
            gutter_width,
            structure_gap,
            safety_buffer,
            min_corner_clearance,
            min_side_length,
            max_side_length,
            min_modules_per_structure,
            max_structure_area,
            solar_orientation,
            solar_deviation_deg,
            orientation_strategy,
            consider_slope,
            avoid_water,
            allow_terrain_override,
            allow_infill,
            engine,
            max_iterations,
        );
        if self.time_budget_ms.is_some() {
            config.time_budget_ms = self.time_budget_ms;
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load stored defaults from a `.toml` or `.json` file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Self::from_toml_str(&content),
        }
    }
}

/// Configuration ready for a run, plus notes about forced adjustments
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: PlannerConfig,
    pub notices: Vec<String>,
}

/// Resolve the effective configuration
///
/// Precedence: request override > stored user default > system default.
/// Solar orientation is forced on whatever the layers say. The merged
/// configuration is validated; invalid ranges are rejected, never corrected.
pub fn resolve_config(
    system: &PlannerConfig,
    stored: Option<&ConfigOverrides>,
    request: Option<&ConfigOverrides>,
) -> Result<ResolvedConfig> {
    let mut layered = ConfigOverrides::default();
    if let Some(stored) = stored {
        layered.merge(stored);
    }
    if let Some(request) = request {
        layered.merge(request);
    }

    let mut config = system.clone();
    layered.apply_to(&mut config);

    let mut notices = Vec::new();
    if !config.solar_orientation {
        tracing::warn!("Solar orientation disable request overridden");
        notices.push("Solar orientation cannot be disabled; it has been re-enabled".to_string());
        config.solar_orientation = true;
    }

    config.validate()?;
    Ok(ResolvedConfig { config, notices })
}
