//! Solar target policies
//!
//! The rule mapping latitude to a preferred structure angle depends on the
//! climate the structures are designed for, so it is a trait rather than a
//! fixed formula.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hemisphere {
    Northern,
    Southern,
}

impl Hemisphere {
    pub fn from_latitude(latitude: f64) -> Self {
        if latitude < 0.0 {
            Hemisphere::Southern
        } else {
            Hemisphere::Northern
        }
    }
}

/// Preferred angle of the structures' length axis (gutter run)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarTarget {
    /// Degrees counter-clockwise from east, in [0, 180)
    pub angle_deg: f64,
    pub hemisphere: Hemisphere,
}

pub trait SolarPolicy: Send + Sync {
    fn target(&self, latitude: f64) -> SolarTarget;
}

/// Gutters run east-west up to `mid_latitude_limit`, north-south beyond
///
/// The gable ends of an east-west run face north and south.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EastWestGutterPolicy {
    pub mid_latitude_limit: f64,
}

impl Default for EastWestGutterPolicy {
    fn default() -> Self {
        Self {
            mid_latitude_limit: 40.0,
        }
    }
}

impl SolarPolicy for EastWestGutterPolicy {
    fn target(&self, latitude: f64) -> SolarTarget {
        let angle_deg = if latitude.abs() <= self.mid_latitude_limit {
            0.0
        } else {
            90.0
        };
        SolarTarget {
            angle_deg,
            hemisphere: Hemisphere::from_latitude(latitude),
        }
    }
}
