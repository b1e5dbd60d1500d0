//! Background job tests: completion, cancellation, deadlines and retention

use polyhouse_planner::core::config::{ConfigOverrides, OrientationStrategy};
use polyhouse_planner::core::types::{GeoPoint, JobId};
use polyhouse_planner::planning::{InMemoryPlanStore, JobStatus, PlanRequest, Planner, PlanningJobs};
use std::sync::Arc;
use std::time::Duration;

fn field(size_deg: f64) -> PlanRequest {
    PlanRequest::new(
        "Job field",
        vec![
            GeoPoint::new(18.52, 73.85),
            GeoPoint::new(18.52, 73.85 + size_deg),
            GeoPoint::new(18.52 + size_deg, 73.85 + size_deg),
            GeoPoint::new(18.52 + size_deg, 73.85),
        ],
    )
}

fn jobs() -> PlanningJobs {
    PlanningJobs::new(Arc::new(Planner::new(Arc::new(InMemoryPlanStore::default()))))
}

#[tokio::test]
async fn test_job_completes_and_result_is_stored() {
    let jobs = jobs();
    let id = jobs.submit(field(0.0008), None);

    let status = jobs.wait(id).await.unwrap();
    assert!(matches!(status, JobStatus::Completed { .. }));
    let result = jobs.result(id).unwrap();
    assert!(result.metadata.count > 0);
}

#[tokio::test]
async fn test_failed_validation_reports_message() {
    let jobs = jobs();
    let request = field(0.0008).with_overrides(ConfigOverrides {
        min_side_length: Some(200.0),
        ..Default::default()
    });
    let id = jobs.submit(request, None);

    match jobs.wait(id).await.unwrap() {
        JobStatus::Failed { message } => assert!(message.contains("min_side_length")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(jobs.result(id).is_none());
}

#[tokio::test]
async fn test_cancelled_job_discards_result() {
    let jobs = jobs();
    // Large enough that the optimized sweep is still running when cancelled
    let request = field(0.003).with_overrides(ConfigOverrides {
        orientation_strategy: Some(OrientationStrategy::Optimized),
        ..Default::default()
    });
    let id = jobs.submit(request, None);
    assert!(jobs.cancel(id));

    assert_eq!(jobs.wait(id).await.unwrap(), JobStatus::Cancelled);
    assert!(jobs.result(id).is_none());
    assert!(!jobs.cancel(id));
}

#[tokio::test]
async fn test_expired_deadline_fails_job() {
    let jobs = jobs().with_timeout(Duration::ZERO);
    let id = jobs.submit(field(0.0008), None);

    match jobs.wait(id).await.unwrap() {
        JobStatus::Failed { message } => assert!(message.contains("timed out")),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_job_has_no_status() {
    let jobs = jobs();
    assert!(jobs.status(JobId::new()).is_none());
    assert!(!jobs.cancel(JobId::new()));
}

#[tokio::test]
async fn test_finished_jobs_are_dropped_after_retention() {
    let jobs = jobs().with_retention(Duration::ZERO);
    let first = jobs.submit(field(0.0008), None);
    assert!(matches!(jobs.wait(first).await.unwrap(), JobStatus::Completed { .. }));
    assert_eq!(jobs.len(), 1);

    // The next submission sweeps the finished job away
    let second = jobs.submit(field(0.0008), None);
    assert!(jobs.status(first).is_none());
    assert!(jobs.status(second).is_some());
    jobs.wait(second).await.unwrap();
    assert_eq!(jobs.len(), 1);
}

#[tokio::test]
async fn test_remove_only_drops_finished_jobs() {
    let jobs = jobs();
    let id = jobs.submit(field(0.0008), None);
    jobs.wait(id).await.unwrap();

    assert!(jobs.remove(id));
    assert!(jobs.status(id).is_none());
    assert!(!jobs.remove(id));
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn test_spent_time_budget_is_reported_as_such() {
    let jobs = jobs();
    let request = field(0.0008).with_overrides(ConfigOverrides {
        time_budget_ms: Some(0),
        ..Default::default()
    });
    let id = jobs.submit(request, None);

    match jobs.wait(id).await.unwrap() {
        JobStatus::Failed { message } => {
            assert!(message.contains("time budget of 0 ms"), "{message}");
            assert!(!message.contains("timed out after"));
        }
        other => panic!("expected budget failure, got {other:?}"),
    }
}
