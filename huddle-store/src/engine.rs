//! Generic, collection-agnostic CRUD engine with capacity-aware eviction.
//!
//! One [`EntityStore`] owns one namespaced collection: it loads the whole
//! blob, mutates the materialized records, and writes the whole blob back.
//! There are no suspension points inside an operation, so a single store
//! instance never interleaves with itself; coordination across instances
//! sharing a substrate does not exist (see [`crate::substrate`]).

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use huddle_core::{StoreError, StoreResult};
use tracing::{debug, warn};

use crate::entity::Entity;
use crate::id::IdGenerator;
use crate::query::{self, SortSpec};
use crate::quota::{QuotaGuard, DEFAULT_HIGH_WATER, DEFAULT_LOW_WATER};
use crate::substrate::{Substrate, SubstrateError};

/// Per-collection configuration: logical capacity and watermark fractions.
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    pub capacity: usize,
    pub high_water: f64,
    pub low_water: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: 500,
            high_water: DEFAULT_HIGH_WATER,
            low_water: DEFAULT_LOW_WATER,
        }
    }
}

impl StoreConfig {
    /// Default watermarks with an explicit capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}

/// Generic engine providing create/get/filter/update/delete over one
/// named collection.
pub struct EntityStore<E: Entity> {
    substrate: Arc<dyn Substrate>,
    quota: QuotaGuard,
    ids: IdGenerator,
    _entity: PhantomData<E>,
}

impl<E: Entity> EntityStore<E> {
    /// Bind the engine to its substrate. Fails only on an invalid
    /// capacity/watermark configuration.
    pub fn new(substrate: Arc<dyn Substrate>, config: StoreConfig) -> StoreResult<Self> {
        let quota = QuotaGuard::with_watermarks(config.capacity, config.high_water, config.low_water)?;
        Ok(Self {
            substrate,
            quota,
            ids: IdGenerator::new(),
            _entity: PhantomData,
        })
    }

    /// Namespace key this collection persists under.
    pub fn namespace(&self) -> &'static str {
        E::kind().namespace()
    }

    /// Capacity guard for this collection.
    pub fn quota(&self) -> &QuotaGuard {
        &self.quota
    }

    /// Validate the draft, stamp id and timestamps, append and persist.
    ///
    /// If the append pushes the collection past its high-water mark, the
    /// oldest records are evicted down to the low-water mark before the
    /// write settles. If the substrate itself rejects the write for space,
    /// one more eviction pass runs and the write is retried exactly once;
    /// a second rejection is [`StoreError::StorageExhausted`].
    pub fn create(&self, draft: E::Draft) -> StoreResult<E> {
        let mut records = self.load();
        let record = E::build(self.ids.next(), Utc::now(), draft)?;
        records.push(record.clone());

        if self.quota.needs_eviction(records.len()) {
            let dropped = evict_oldest(&mut records, self.quota.low_mark());
            debug!(
                namespace = self.namespace(),
                dropped, "evicted oldest records past high-water mark"
            );
        }

        if let Err(err) = self.persist(&records) {
            if !matches!(err, SubstrateError::QuotaExceeded { .. }) {
                return Err(self.exhausted());
            }
            let dropped = evict_oldest(&mut records, self.quota.low_mark());
            debug!(
                namespace = self.namespace(),
                dropped, "eviction pass after substrate rejected write"
            );
            self.persist(&records).map_err(|_| self.exhausted())?;
        }

        Ok(record)
    }

    /// Fetch one record by id.
    pub fn get(&self, id: &str) -> StoreResult<E> {
        self.load()
            .into_iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| self.not_found(id))
    }

    /// Scan the collection: retain records the filter accepts, stable-sort
    /// by the requested field, truncate to `limit`. An empty (default)
    /// filter matches everything; without a sort, insertion order holds.
    pub fn filter(
        &self,
        filter: &E::Filter,
        sort: Option<SortSpec<E::SortField>>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<E>> {
        Ok(query::apply(self.load(), filter, sort, limit))
    }

    /// Every record in the collection, in insertion order.
    pub fn list(&self) -> StoreResult<Vec<E>> {
        self.filter(&E::Filter::default(), None, None)
    }

    /// Number of records currently in the collection.
    pub fn count(&self) -> StoreResult<usize> {
        Ok(self.load().len())
    }

    /// Shallow-merge `patch` onto the record, refresh `updated_at` and
    /// persist. `id` and `created_at` are not patchable by construction.
    pub fn update(&self, id: &str, patch: E::Patch) -> StoreResult<E> {
        let mut records = self.load();
        let record = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| self.not_found(id))?;

        record.apply(patch);
        record.touch(Utc::now());
        let updated = record.clone();

        self.persist(&records).map_err(|_| self.exhausted())?;
        Ok(updated)
    }

    /// Remove the record and persist the reduced collection. Immediate and
    /// permanent; there is no tombstoning.
    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let mut records = self.load();
        let before = records.len();
        records.retain(|record| record.id() != id);
        if records.len() == before {
            return Err(self.not_found(id));
        }
        self.persist(&records).map_err(|_| self.exhausted())?;
        Ok(())
    }

    /// Materialize the collection, failing open: a missing blob, an
    /// unreadable substrate or an unparsable blob all yield an empty
    /// collection. Corruption is logged, never surfaced to the caller.
    fn load(&self) -> Vec<E> {
        let blob = match self.substrate.load(self.namespace()) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(
                    namespace = self.namespace(),
                    %err,
                    "substrate read failed; treating collection as empty"
                );
                return Vec::new();
            }
        };

        match self.decode(&blob) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    namespace = self.namespace(),
                    %err,
                    "discarding unparsable collection blob"
                );
                Vec::new()
            }
        }
    }

    fn decode(&self, blob: &str) -> StoreResult<Vec<E>> {
        serde_json::from_str(blob).map_err(|_| StoreError::CorruptState {
            namespace: self.namespace().to_string(),
        })
    }

    fn persist(&self, records: &[E]) -> Result<(), SubstrateError> {
        let blob = serde_json::to_string(records).map_err(|err| SubstrateError::Unavailable {
            reason: format!("encode failed: {err}"),
        })?;
        self.substrate.store(self.namespace(), &blob)
    }

    fn not_found(&self, id: &str) -> StoreError {
        StoreError::NotFound {
            kind: E::kind(),
            id: id.to_string(),
        }
    }

    fn exhausted(&self) -> StoreError {
        StoreError::StorageExhausted {
            namespace: self.namespace().to_string(),
        }
    }
}

/// Drop the oldest records until the collection holds `low_mark` or fewer.
///
/// Oldest means smallest `created_at`; the sort is stable, so records
/// created in the same instant are evicted in insertion order. Returns the
/// number of records dropped.
fn evict_oldest<E: Entity>(records: &mut Vec<E>, low_mark: usize) -> usize {
    if records.len() <= low_mark {
        return 0;
    }
    records.sort_by_key(|record| record.created_at());
    let dropped = records.len() - low_mark;
    records.drain(..dropped);
    dropped
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facades::tickets::{TicketDraft, TicketFilter};
    use huddle_core::{Ticket, TicketPriority};
    use std::sync::Arc;

    use crate::substrate::MemorySubstrate;

    fn draft(title: &str) -> TicketDraft {
        TicketDraft {
            organization_id: "org-1".to_string(),
            title: title.to_string(),
            description: None,
            priority: TicketPriority::Medium,
            reporter: "ana".to_string(),
            assignees: vec![],
            tags: vec![],
            department_id: None,
        }
    }

    fn store_with_capacity(capacity: usize) -> (Arc<MemorySubstrate>, EntityStore<Ticket>) {
        let substrate = Arc::new(MemorySubstrate::new());
        let store = EntityStore::new(
            substrate.clone() as Arc<dyn crate::substrate::Substrate>,
            StoreConfig::with_capacity(capacity),
        )
        .unwrap();
        (substrate, store)
    }

    #[test]
    fn test_create_get_round_trip() {
        let (_, store) = store_with_capacity(100);
        let created = store.create(draft("Broken login")).unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.get(&created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let (_, store) = store_with_capacity(100);
        let err = store.get("no-such-id").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_update_missing_leaves_collection_unchanged() {
        let (_, store) = store_with_capacity(100);
        store.create(draft("only")).unwrap();

        let err = store.update("no-such-id", Default::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_missing_leaves_collection_unchanged() {
        let (_, store) = store_with_capacity(100);
        store.create(draft("only")).unwrap();

        let err = store.delete("no-such-id").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_is_permanent() {
        let (_, store) = store_with_capacity(100);
        let created = store.create(draft("gone soon")).unwrap();
        store.delete(&created.id).unwrap();

        assert_eq!(store.count().unwrap(), 0);
        assert!(store.get(&created.id).is_err());
        // A second delete of the same id is NotFound, not a silent no-op.
        assert!(store.delete(&created.id).is_err());
    }

    #[test]
    fn test_filter_empty_criteria_returns_everything() {
        let (_, store) = store_with_capacity(100);
        for i in 0..5 {
            store.create(draft(&format!("t{i}"))).unwrap();
        }
        let all = store.filter(&TicketFilter::default(), None, None).unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_filter_limit_truncates_after_sort() {
        let (_, store) = store_with_capacity(100);
        for title in ["c", "a", "b"] {
            store.create(draft(title)).unwrap();
        }
        let page = store
            .filter(
                &TicketFilter::default(),
                Some(SortSpec::ascending(
                    crate::facades::tickets::TicketSortField::Title,
                )),
                Some(2),
            )
            .unwrap();
        let titles: Vec<&str> = page.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn test_eviction_scenario_801_inserts() {
        // Capacity 1000, high-water 800, low-water 700. The 801st insert
        // crosses the high mark; eviction keeps the 700 newest, and the
        // 801st fits after cleanup.
        let (_, store) = store_with_capacity(1000);
        let mut ids = Vec::new();
        for i in 0..801 {
            ids.push(store.create(draft(&format!("t{i}"))).unwrap().id);
        }

        let survivors = store.list().unwrap();
        assert_eq!(survivors.len(), 700);

        let survivor_ids: Vec<&str> = survivors.iter().map(|t| t.id.as_str()).collect();
        let expected: Vec<&str> = ids[101..].iter().map(String::as_str).collect();
        assert_eq!(survivor_ids, expected);
    }

    #[test]
    fn test_no_eviction_at_exactly_high_mark() {
        let (_, store) = store_with_capacity(10);
        for i in 0..8 {
            store.create(draft(&format!("t{i}"))).unwrap();
        }
        assert_eq!(store.count().unwrap(), 8);
    }

    #[test]
    fn test_corrupt_blob_fails_open() {
        let (substrate, store) = store_with_capacity(100);
        store.create(draft("before corruption")).unwrap();
        substrate.store(store.namespace(), "{not json!").unwrap();

        // Reads see an empty collection rather than an error.
        assert_eq!(store.list().unwrap().len(), 0);

        // The next create persists a fresh single-record collection.
        let created = store.create(draft("after corruption")).unwrap();
        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, created.id);
    }

    #[test]
    fn test_substrate_quota_triggers_retry_then_exhausted() {
        // Budget fits one small collection but not two records' worth.
        let substrate = Arc::new(MemorySubstrate::with_limit(520));
        let store: EntityStore<Ticket> = EntityStore::new(
            substrate.clone() as Arc<dyn crate::substrate::Substrate>,
            StoreConfig::with_capacity(1000),
        )
        .unwrap();

        store.create(draft("first")).unwrap();
        // The second write exceeds the byte budget; the eviction pass at
        // low-water (700) drops nothing, so the retry fails too.
        let err = store.create(draft("second")).unwrap_err();
        assert!(matches!(err, StoreError::StorageExhausted { .. }));
    }

    #[test]
    fn test_substrate_quota_retry_succeeds_after_eviction() {
        // Low-water mark of 1 means the retry pass can make room by
        // dropping the older record.
        let substrate = Arc::new(MemorySubstrate::with_limit(500));
        let store: EntityStore<Ticket> = EntityStore::new(
            substrate.clone() as Arc<dyn crate::substrate::Substrate>,
            StoreConfig {
                capacity: 2,
                high_water: 1.0,
                low_water: 0.5,
            },
        )
        .unwrap();

        let first = store.create(draft("first")).unwrap();
        let second = store.create(draft("second")).unwrap();

        let survivors = store.list().unwrap();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].id, second.id);
        assert!(store.get(&first.id).is_err());
    }

    #[test]
    fn test_invalid_watermark_config_rejected() {
        let substrate = Arc::new(MemorySubstrate::new());
        let result: StoreResult<EntityStore<Ticket>> = EntityStore::new(
            substrate as Arc<dyn crate::substrate::Substrate>,
            StoreConfig {
                capacity: 100,
                high_water: 0.5,
                low_water: 0.9,
            },
        );
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_validation_failure_writes_nothing() {
        let (_, store) = store_with_capacity(100);
        let mut bad = draft("untitled");
        bad.organization_id = String::new();
        assert!(matches!(
            store.create(bad),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.count().unwrap(), 0);
    }
}
