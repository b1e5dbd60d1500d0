//! Typed recalculation commands
//!
//! Whatever interprets user intent upstream produces one of these; the
//! planner only ever sees the configuration delta it converts to.

use crate::core::config::{ConfigOverrides, OrientationStrategy, PlannerConfig, INFILL_MIN_MODULES};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Recalculate {
    /// Trade spacing and minimum size for coverage
    Maximize,
    /// Go back to a single angle for every structure
    UniformOrientation,
    /// Build over restricted terrain (roads stay excluded)
    IgnoreRestrictions,
    /// Change the minimum module count per structure
    AdjustMinModules(u32),
}

impl Recalculate {
    /// Configuration delta relative to the configuration of the last run
    pub fn to_overrides(&self, current: &PlannerConfig) -> ConfigOverrides {
        match *self {
            Recalculate::Maximize => ConfigOverrides {
                structure_gap: Some(current.structure_gap / 2.0),
                min_side_length: Some(relaxed_min_side(current)),
                min_modules_per_structure: Some(
                    (current.min_modules_per_structure / 2).max(INFILL_MIN_MODULES),
                ),
                allow_infill: Some(true),
                orientation_strategy: Some(OrientationStrategy::Optimized),
                ..Default::default()
            },
            Recalculate::UniformOrientation => ConfigOverrides {
                orientation_strategy: Some(OrientationStrategy::Uniform),
                ..Default::default()
            },
            Recalculate::IgnoreRestrictions => ConfigOverrides {
                allow_terrain_override: Some(true),
                avoid_water: Some(false),
                consider_slope: Some(false),
                ..Default::default()
            },
            Recalculate::AdjustMinModules(n) => ConfigOverrides {
                min_modules_per_structure: Some(n),
                ..Default::default()
            },
        }
    }
}

/// Smallest side a single module allows, unless the gutter would eat it
fn relaxed_min_side(current: &PlannerConfig) -> f64 {
    let module_side = current.module_width.min(current.module_height);
    if module_side > current.gutter_width * 2.0 {
        module_side.min(current.min_side_length)
    } else {
        current.min_side_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::resolve_config;
    use crate::placement::{generate_candidates, infill_candidates};

    #[test]
    fn test_maximize_relaxes_spacing_and_size() {
        let current = PlannerConfig::default();
        let delta = Recalculate::Maximize.to_overrides(&current);
        let resolved = resolve_config(&current, None, Some(&delta)).unwrap().config;
        assert_eq!(resolved.structure_gap, 1.0);
        assert_eq!(resolved.min_modules_per_structure, 5);
        assert_eq!(resolved.min_side_length, 4.0);
        assert_eq!(resolved.orientation_strategy, OrientationStrategy::Optimized);
        // Module grid is never part of a delta
        assert_eq!(resolved.module_width, current.module_width);
    }

    #[test]
    fn test_maximize_opens_sizes_below_default_min_side() {
        let current = PlannerConfig::default();
        let delta = Recalculate::Maximize.to_overrides(&current);
        let resolved = resolve_config(&current, None, Some(&delta)).unwrap().config;

        let narrow = |config: &PlannerConfig| {
            generate_candidates(config)
                .into_iter()
                .chain(infill_candidates(config))
                .filter(|c| c.width.min(c.length) < current.min_side_length)
                .count()
        };
        assert_eq!(narrow(&current), 0);
        assert!(narrow(&resolved) > 0);
    }

    #[test]
    fn test_maximize_keeps_min_side_when_gutter_fills_a_module() {
        let current = PlannerConfig {
            gutter_width: 2.0,
            ..Default::default()
        };
        let delta = Recalculate::Maximize.to_overrides(&current);
        assert_eq!(delta.min_side_length, Some(current.min_side_length));
        assert!(resolve_config(&current, None, Some(&delta)).is_ok());
    }

    #[test]
    fn test_adjust_min_modules_is_validated() {
        let delta = Recalculate::AdjustMinModules(1).to_overrides(&PlannerConfig::default());
        assert!(resolve_config(&PlannerConfig::default(), None, Some(&delta)).is_err());
    }

    #[test]
    fn test_command_json_shape() {
        let json = serde_json::to_string(&Recalculate::AdjustMinModules(6)).unwrap();
        assert_eq!(json, r#"{"command":"adjust_min_modules","value":6}"#);
        let parsed: Recalculate = serde_json::from_str(r#"{"command":"maximize"}"#).unwrap();
        assert_eq!(parsed, Recalculate::Maximize);
    }
}
