use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Invalid parcel: {points} distinct boundary points (at least 3 required)")]
    InvalidParcel { points: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "Terrain blocks construction: only {:.1}% of the parcel is buildable (minimum {:.0}%)",
        fraction * 100.0,
        minimum * 100.0
    )]
    TerrainBlocked { fraction: f64, minimum: f64 },

    #[error("Planning run was cancelled before completion")]
    Cancelled,

    #[error("Planning exceeded its time budget of {budget_ms} ms")]
    TimeBudgetExceeded { budget_ms: u64 },

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl PlannerError {
    /// True for failures caused by the caller's input rather than the run itself
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PlannerError::InvalidParcel { .. } | PlannerError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
