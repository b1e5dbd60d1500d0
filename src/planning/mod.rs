//! Planning service: requests, recalculation commands, plan store and jobs

pub mod command;
pub mod job;
pub mod request;
pub mod service;
pub mod store;

pub use command::Recalculate;
pub use job::{JobStatus, PlanningJobs, DEFAULT_JOB_TIMEOUT};
pub use request::{PlanRequest, RestrictedAreaInput, TerrainInput, ZoneInput};
pub use service::{optimize, PlanOutcome, Planner, PlanningInput};
pub use store::{InMemoryPlanStore, PlanStore};
