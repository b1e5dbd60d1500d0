//! Planning pipeline and the service that runs it for requests
//!
//! `optimize` is the pure core: validated inputs in, a result out, no I/O
//! and no shared state. `Planner` adds configuration resolution, the
//! content-addressed store and recalculation commands around it.

use super::command::Recalculate;
use super::request::PlanRequest;
use super::store::PlanStore;
use crate::core::config::{resolve_config, ConfigOverrides, PlannerConfig};
use crate::core::error::{PlannerError, Result};
use crate::core::types::PlanId;
use crate::orientation::{EastWestGutterPolicy, OrientationSelector, SolarPolicy};
use crate::parcel::{LandParcel, Zone};
use crate::placement::{
    build_result, engine_for, CancelToken, EngineProbe, NoProgress, PlacementInput,
    PlacementResult, ProgressSink, ReportContext,
};
use crate::region::{resolve_buildable_region, TerrainAnalysis};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Validated inputs for one optimization
#[derive(Debug, Clone, Copy)]
pub struct PlanningInput<'a> {
    pub parcel: &'a LandParcel,
    pub zones: &'a [Zone],
    pub terrain: Option<&'a TerrainAnalysis>,
    pub config: &'a PlannerConfig,
}

/// Run the full pipeline: region, orientation, placement, post-processing
///
/// `config` must already be resolved and validated.
pub fn optimize(
    input: &PlanningInput<'_>,
    policy: &dyn SolarPolicy,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
) -> Result<PlacementResult> {
    let started = Instant::now();
    let config = input.config;
    let outer = cancel;
    let cancel = match config.time_budget_ms {
        Some(ms) => outer.with_deadline_after(Duration::from_millis(ms)),
        None => outer.clone(),
    };
    // A stop the caller did not ask for can only come from the run's own budget
    let stopped = |err: PlannerError| match (err, config.time_budget_ms) {
        (PlannerError::Cancelled, Some(budget_ms)) if !outer.is_cancelled() => {
            PlannerError::TimeBudgetExceeded { budget_ms }
        }
        (err, _) => err,
    };
    if cancel.is_cancelled() {
        return Err(stopped(PlannerError::Cancelled));
    }

    let region = resolve_buildable_region(input.parcel, input.zones, input.terrain, config)?;

    let engine = engine_for(config.engine);
    let probe = EngineProbe::new(engine.as_ref(), &region.shapes, config, &cancel);
    let orientation = OrientationSelector::new(policy).select(
        &region.shapes,
        input.parcel.latitude(),
        config,
        Some(&probe),
    );

    let layout = engine.place(
        &PlacementInput::new(&region.shapes, config, &orientation),
        &cancel,
        progress,
    )
    .map_err(stopped)?;

    let computation_time_ms = started.elapsed().as_millis() as u64;
    let mut result = build_result(
        layout,
        &ReportContext {
            parcel: input.parcel,
            region: &region,
            config,
            engine: engine.kind(),
            computation_time_ms,
        },
    );
    result.warnings.extend(input.parcel.warnings.iter().cloned());

    tracing::info!(
        parcel = %input.parcel.name,
        structures = result.metadata.count,
        utilization = result.metadata.utilization_percentage,
        elapsed_ms = computation_time_ms,
        "Placement complete"
    );
    Ok(result)
}

/// Result of a planning call
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub id: PlanId,
    pub result: Arc<PlacementResult>,
    pub config: PlannerConfig,
    /// True when the result came from the store
    pub cached: bool,
}

#[derive(Serialize)]
struct RunKey<'a> {
    request: &'a PlanRequest,
    config: &'a PlannerConfig,
}

/// Plans requests against a system configuration and a plan store
pub struct Planner {
    system: PlannerConfig,
    policy: Arc<dyn SolarPolicy>,
    store: Arc<dyn PlanStore>,
}

impl Planner {
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        Self {
            system: PlannerConfig::default(),
            policy: Arc::new(EastWestGutterPolicy::default()),
            store,
        }
    }

    pub fn with_system_config(mut self, config: PlannerConfig) -> Self {
        self.system = config;
        self
    }

    pub fn with_solar_policy(mut self, policy: Arc<dyn SolarPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn system_config(&self) -> &PlannerConfig {
        &self.system
    }

    pub fn store(&self) -> &Arc<dyn PlanStore> {
        &self.store
    }

    /// Previously computed plan, while the store still holds it
    pub fn stored_plan(&self, id: &PlanId) -> Result<Arc<PlacementResult>> {
        self.store
            .get(id)
            .ok_or_else(|| PlannerError::PlanNotFound(id.to_string()))
    }

    pub fn plan(&self, request: &PlanRequest, stored: Option<&ConfigOverrides>) -> Result<PlanOutcome> {
        self.plan_with(request, stored, &CancelToken::new(), &NoProgress)
    }

    /// Plan a request, reusing a stored result for identical inputs
    pub fn plan_with(
        &self,
        request: &PlanRequest,
        stored: Option<&ConfigOverrides>,
        cancel: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<PlanOutcome> {
        let resolved = resolve_config(&self.system, stored, request.overrides.as_ref())?;
        let config = resolved.config;

        let id = PlanId::from_content(&serde_json::to_vec(&RunKey {
            request,
            config: &config,
        })?);
        if let Some(result) = self.store.get(&id) {
            tracing::debug!(%id, "Serving stored plan");
            progress.report(100);
            return Ok(PlanOutcome {
                id,
                result,
                config,
                cached: true,
            });
        }

        tracing::info!(%id, parcel = %request.name, "Planning request");
        let parcel = request.parcel()?;
        let zones = request.zones(parcel.projection());
        let terrain = request.terrain(parcel.projection());

        let mut result = optimize(
            &PlanningInput {
                parcel: &parcel,
                zones: &zones,
                terrain: terrain.as_ref(),
                config: &config,
            },
            self.policy.as_ref(),
            cancel,
            progress,
        )?;
        result.warnings.extend(resolved.notices);

        let result = Arc::new(result);
        self.store.put(id, Arc::clone(&result));
        Ok(PlanOutcome {
            id,
            result,
            config,
            cached: false,
        })
    }

    /// Re-plan after a recalculation command
    ///
    /// The command's delta is layered over the request's own overrides, so
    /// it wins over both the request and the stored defaults.
    pub fn recalculate(
        &self,
        request: &PlanRequest,
        stored: Option<&ConfigOverrides>,
        command: Recalculate,
    ) -> Result<PlanOutcome> {
        let current = resolve_config(&self.system, stored, request.overrides.as_ref())?.config;
        let mut overrides = request.overrides.clone().unwrap_or_default();
        overrides.merge(&command.to_overrides(&current));
        tracing::info!(?command, parcel = %request.name, "Recalculating");

        let request = PlanRequest {
            overrides: Some(overrides),
            ..request.clone()
        };
        self.plan(&request, stored)
    }
}
