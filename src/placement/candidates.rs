//! Block-grid candidate generation
//!
//! Candidates depend only on the configuration, never on the parcel, so a
//! catalog is computed once per run and reused for every angle.

use crate::core::config::{PlannerConfig, INFILL_MIN_MODULES};
use crate::core::types::EPSILON;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Unplaced rectangle made of whole modules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Modules along the length axis
    pub modules_x: u32,
    /// Modules along the width axis
    pub modules_y: u32,
    pub length: f64,
    pub width: f64,
}

impl Candidate {
    pub fn module_count(&self) -> u32 {
        self.modules_x * self.modules_y
    }

    /// Outer footprint area, gutter included
    pub fn area(&self) -> f64 {
        self.length * self.width
    }

    /// Long side over short side; 1.0 is square
    pub fn aspect_ratio(&self) -> f64 {
        self.length.max(self.width) / self.length.min(self.width)
    }
}

fn side_range(module: f64, config: &PlannerConfig) -> std::ops::RangeInclusive<u32> {
    let lo = ((config.min_side_length - EPSILON) / module).ceil().max(1.0) as u32;
    let hi = ((config.max_side_length + EPSILON) / module).floor().max(0.0) as u32;
    lo..=hi
}

/// Enumerate every module grid between `min_modules` and `max_modules`
/// (exclusive) that satisfies the side and area limits, largest first
fn enumerate(config: &PlannerConfig, min_modules: u32, max_modules: Option<u32>) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let widths = side_range(config.module_height, config);
    for modules_x in side_range(config.module_width, config) {
        let length = modules_x as f64 * config.module_width;
        // Area only grows along both axes, so the first oversized width ends
        // the row and an oversized narrowest width ends the enumeration.
        if length * *widths.start() as f64 * config.module_height
            > config.max_structure_area + EPSILON
        {
            break;
        }
        for modules_y in widths.clone() {
            let width = modules_y as f64 * config.module_height;
            if length * width > config.max_structure_area + EPSILON {
                break;
            }
            let Some(count) = modules_x.checked_mul(modules_y) else {
                break;
            };
            if count < min_modules || max_modules.is_some_and(|max| count >= max) {
                continue;
            }
            candidates.push(Candidate {
                modules_x,
                modules_y,
                length,
                width,
            });
        }
    }

    // Largest area first; among equal areas the squarer shape (less perimeter)
    // and then the longer length axis.
    candidates.sort_by_key(|c| {
        (
            Reverse(OrderedFloat(c.area())),
            OrderedFloat(c.aspect_ratio()),
            Reverse(OrderedFloat(c.length)),
        )
    });
    candidates
}

/// Catalog for the large-first pass
pub fn generate_candidates(config: &PlannerConfig) -> Vec<Candidate> {
    enumerate(config, config.min_modules_per_structure, None)
}

/// Sizes only the infill pass may use: below the regular module floor,
/// down to the smallest valid structure
pub fn infill_candidates(config: &PlannerConfig) -> Vec<Candidate> {
    // Side-length limits still apply, so at the default 16 m minimum side
    // the smallest infill size is 16 x 16 (8 modules), not 2 modules.
    // Lowering `min_side_length` opens the sizes down to the 2-module floor.
    enumerate(
        config,
        INFILL_MIN_MODULES,
        Some(config.min_modules_per_structure),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_respects_limits() {
        let config = PlannerConfig::default();
        let catalog = generate_candidates(&config);
        assert!(!catalog.is_empty());
        for c in &catalog {
            assert!(c.length >= config.min_side_length - EPSILON);
            assert!(c.length <= config.max_side_length + EPSILON);
            assert!(c.width >= config.min_side_length - EPSILON);
            assert!(c.width <= config.max_side_length + EPSILON);
            assert!(c.module_count() >= config.min_modules_per_structure);
            assert!(c.area() <= config.max_structure_area + EPSILON);
        }
    }

    #[test]
    fn test_catalog_sorted_largest_first() {
        let catalog = generate_candidates(&PlannerConfig::default());
        for pair in catalog.windows(2) {
            assert!(pair[0].area() >= pair[1].area());
        }
        // 96 x 104 and 104 x 96 both give 9984 m²
        assert_eq!(catalog[0].area(), 9984.0);
    }

    #[test]
    fn test_equal_area_prefers_square() {
        let config = PlannerConfig {
            max_structure_area: 1024.0,
            ..Default::default()
        };
        let catalog = generate_candidates(&config);
        let top: Vec<_> = catalog.iter().take_while(|c| c.area() == 1024.0).collect();
        assert!(top.len() > 1);
        assert_eq!((top[0].length, top[0].width), (32.0, 32.0));
    }

    #[test]
    fn test_smallest_regular_candidate_is_320_square_meters() {
        let catalog = generate_candidates(&PlannerConfig::default());
        let smallest = catalog.last().unwrap();
        assert_eq!(smallest.module_count(), 10);
        assert_eq!(smallest.area(), 320.0);
    }

    #[test]
    fn test_huge_sides_enumerate_without_overflow() {
        let config = PlannerConfig {
            min_side_length: 500_000.0,
            max_side_length: 500_000.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(generate_candidates(&config).is_empty());
        assert!(infill_candidates(&config).is_empty());
    }

    #[test]
    fn test_module_counts_beyond_u32_are_skipped() {
        // 62,500 x 125,000 modules would overflow a u32 count
        let config = PlannerConfig {
            min_side_length: 500_000.0,
            max_side_length: 500_000.0,
            max_structure_area: 3.0e11,
            ..Default::default()
        };
        assert!(generate_candidates(&config).is_empty());
    }

    #[test]
    fn test_infill_respects_min_side_length() {
        let defaults = infill_candidates(&PlannerConfig::default());
        assert!(defaults
            .iter()
            .all(|c| (c.length, c.width) == (16.0, 16.0)));

        let relaxed = infill_candidates(&PlannerConfig {
            min_side_length: 4.0,
            ..Default::default()
        });
        assert!(relaxed
            .iter()
            .any(|c| c.module_count() == INFILL_MIN_MODULES));
    }

    #[test]
    fn test_infill_catalog_sits_below_regular_floor() {
        let config = PlannerConfig::default();
        let infill = infill_candidates(&config);
        assert!(!infill.is_empty());
        assert!(infill
            .iter()
            .all(|c| c.module_count() < config.min_modules_per_structure
                && c.module_count() >= INFILL_MIN_MODULES));
    }
}
