//! The contract between the generic engine and a concrete entity kind.

use huddle_core::{EntityKind, RecordId, Timestamp, ValidationError};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::query::SortValue;

/// A record type the engine can persist.
///
/// Each implementation binds the entity struct to its creation payload
/// (`Draft`), its shallow-merge update payload (`Patch`), its typed filter
/// and its typed sort fields. Expressing filters and sort keys as concrete
/// types (rather than stringly-keyed maps) means a query against a field
/// the entity does not have fails to compile instead of silently matching
/// nothing.
///
/// # Implementation Requirements
///
/// - `kind()` must be distinct per implementation; it names the substrate
///   namespace and tags errors.
/// - `build` owns required-field validation and must stamp both timestamps
///   with the `at` it is given.
/// - `apply` must not touch `id` or `created_at`; the engine refreshes
///   `updated_at` itself after a successful merge.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Caller-supplied fields for `create`.
    type Draft;
    /// Shallow-merge payload for `update`; unset fields are untouched.
    type Patch;
    /// Typed filter; the default value matches every record.
    type Filter: Default;
    /// Typed sort fields accepted by `filter`.
    type SortField: Copy;

    /// Entity kind discriminator for this record type.
    fn kind() -> EntityKind;

    /// Unique id within the collection, immutable after creation.
    fn id(&self) -> &str;

    /// Creation timestamp, set once by `build`.
    fn created_at(&self) -> Timestamp;

    /// Refresh `updated_at` after a successful mutation.
    fn touch(&mut self, at: Timestamp);

    /// Construct a record from a draft, validating required fields.
    fn build(id: RecordId, at: Timestamp, draft: Self::Draft) -> Result<Self, ValidationError>;

    /// Merge a patch onto this record, field by field.
    fn apply(&mut self, patch: Self::Patch);

    /// Whether this record satisfies every populated filter field.
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Comparable value of the given sort field for this record.
    fn sort_value(&self, field: Self::SortField) -> SortValue;
}
