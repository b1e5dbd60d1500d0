pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigOverrides, EngineKind, OrientationStrategy, PlannerConfig, ResolvedConfig};
pub use error::{PlannerError, Result};
pub use types::{GeoPoint, JobId, PlanId, Vec2, EPSILON};
