//! Shared filtering and sorting over materialized collections.
//!
//! The substrate has no indexing, so every query is a full scan of the
//! loaded collection: retain the records the typed filter accepts, then
//! stable-sort and truncate. Stability is a contract, not an accident -
//! records with equal sort keys keep their relative insertion order, and
//! eviction relies on the same guarantee for `created_at` ties.

use chrono::{DateTime, Utc};

use crate::entity::Entity;

/// Sort direction. Default insertion order applies when no sort is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A sort request: which typed field, and which direction.
#[derive(Debug, Clone, Copy)]
pub struct SortSpec<F> {
    pub field: F,
    pub direction: Direction,
}

impl<F> SortSpec<F> {
    pub fn ascending(field: F) -> Self {
        Self {
            field,
            direction: Direction::Ascending,
        }
    }

    pub fn descending(field: F) -> Self {
        Self {
            field,
            direction: Direction::Descending,
        }
    }
}

/// Comparable projection of one record field.
///
/// Within a single sort every record yields the same variant, so the
/// cross-variant ordering implied by the derive is never exercised.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Bool(bool),
    Int(i64),
    Time(DateTime<Utc>),
    Text(String),
}

/// Filter, stable-sort and truncate a materialized collection.
pub fn apply<E: Entity>(
    mut records: Vec<E>,
    filter: &E::Filter,
    sort: Option<SortSpec<E::SortField>>,
    limit: Option<usize>,
) -> Vec<E> {
    records.retain(|record| record.matches(filter));

    if let Some(spec) = sort {
        // sort_by is stable; reversing Ordering::Equal keeps it Equal, so
        // descending sorts preserve insertion order on ties as well.
        records.sort_by(|a, b| {
            let ordering = a.sort_value(spec.field).cmp(&b.sort_value(spec.field));
            match spec.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }

    if let Some(limit) = limit {
        records.truncate(limit);
    }

    records
}

// ============================================================================
// TESTS
// ============================================================================
