//! Structure placement: candidate sizes, engines and the result record

pub mod candidates;
pub mod control;
pub mod engine;
pub mod report;
pub mod result;
pub mod scheduler;
pub mod structure;

pub use candidates::{generate_candidates, infill_candidates, Candidate};
pub use control::{CancelToken, NoProgress, ProgressSink};
pub use engine::{
    engine_for, EngineProbe, PlacementEngine, PlacementInput, PriorityGreedyEngine,
    UniformGridEngine,
};
pub use report::{build_result, verify_layout, ReportContext};
pub use result::{PlacementMetadata, PlacementResult, StructureQuantity, UnbuildableRegion};
pub use scheduler::{Layout, Placement, PriorityScheduler};
pub use structure::{Module, PlacedStructure, PlacementPass};
