//! Content-addressed store for finished plans

use crate::core::types::PlanId;
use crate::placement::PlacementResult;
use ahash::AHashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Default lifetime of a stored plan
pub const DEFAULT_PLAN_TTL: Duration = Duration::from_secs(60 * 60);

/// Default number of plans kept in memory
pub const DEFAULT_PLAN_CAPACITY: usize = 256;

/// Backing store for plan results, injected into the planner
pub trait PlanStore: Send + Sync {
    fn get(&self, id: &PlanId) -> Option<Arc<PlacementResult>>;
    fn put(&self, id: PlanId, result: Arc<PlacementResult>);
}

struct Entry {
    result: Arc<PlacementResult>,
    inserted: Instant,
}

/// In-process store with expiry and a size cap
///
/// Entries expire `ttl` after insertion. When full, the oldest entry is
/// evicted to make room.
pub struct InMemoryPlanStore {
    entries: Mutex<AHashMap<PlanId, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for InMemoryPlanStore {
    fn default() -> Self {
        Self::new(DEFAULT_PLAN_TTL, DEFAULT_PLAN_CAPACITY)
    }
}

impl InMemoryPlanStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(AHashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, AHashMap<PlanId, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.inserted) >= self.ttl
    }
}

impl PlanStore for InMemoryPlanStore {
    fn get(&self, id: &PlanId) -> Option<Arc<PlacementResult>> {
        let mut entries = self.lock();
        let now = Instant::now();
        let expired = self.is_expired(entries.get(id)?, now);
        if expired {
            entries.remove(id);
            tracing::debug!(%id, "Plan expired");
            return None;
        }
        entries.get(id).map(|entry| Arc::clone(&entry.result))
    }

    fn put(&self, id: PlanId, result: Arc<PlacementResult>) {
        let mut entries = self.lock();
        let now = Instant::now();
        entries.retain(|_, entry| now.duration_since(entry.inserted) < self.ttl);

        if !entries.contains_key(&id) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted)
                .map(|(key, _)| *key);
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                tracing::debug!(id = %oldest, "Evicted plan");
            }
        }

        entries.insert(
            id,
            Entry {
                result,
                inserted: now,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineKind;
    use crate::placement::PlacementMetadata;

    fn empty_result() -> Arc<PlacementResult> {
        Arc::new(PlacementResult {
            structures: Vec::new(),
            metadata: PlacementMetadata {
                count: 0,
                total_inner_area: 0.0,
                total_outer_area: 0.0,
                parcel_area: 0.0,
                buildable_area: 0.0,
                utilization_percentage: 0.0,
                angles: Vec::new(),
                engine: EngineKind::Priority,
                iterations: 0,
                budget_exhausted: false,
                computation_time_ms: 0,
            },
            warnings: Vec::new(),
            errors: Vec::new(),
            unbuildable_regions: Vec::new(),
            constraint_violations: Vec::new(),
        })
    }

    #[test]
    fn test_put_then_get() {
        let store = InMemoryPlanStore::default();
        let id = PlanId::from_content(b"a");
        store.put(id, empty_result());
        assert!(store.get(&id).is_some());
        assert!(store.get(&PlanId::from_content(b"b")).is_none());
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let store = InMemoryPlanStore::new(Duration::ZERO, 8);
        let id = PlanId::from_content(b"a");
        store.put(id, empty_result());
        assert!(store.get(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = InMemoryPlanStore::new(DEFAULT_PLAN_TTL, 2);
        let ids: Vec<PlanId> = [b"a", b"b", b"c"]
            .iter()
            .map(|bytes| PlanId::from_content(*bytes))
            .collect();
        for id in &ids {
            store.put(*id, empty_result());
            std::thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(store.len(), 2);
        assert!(store.get(&ids[0]).is_none());
        assert!(store.get(&ids[2]).is_some());
    }
}
