//! Buildable-region resolution from parcel, zones and terrain input

pub mod resolver;
pub mod terrain;

pub use resolver::{resolve_buildable_region, BuildableRegion, Exclusion};
pub use terrain::{RestrictedArea, TerrainAnalysis, TerrainKind};
