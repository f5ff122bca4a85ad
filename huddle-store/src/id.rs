//! Record id generation.
//!
//! Ids are UUIDv7 strings: a millisecond clock reading plus a random
//! suffix. That makes them practically unique without coordination and
//! lexicographically sortable by creation time. Collisions are not
//! detected anywhere downstream; the generation scheme makes them
//! improbable enough for a client-side cache.

use huddle_core::RecordId;
use uuid::Uuid;

/// Generator for timestamp-ordered record ids.
#[derive(Debug, Default)]
pub struct IdGenerator;

impl IdGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Produce the next record id.
    ///
    /// Ids generated by one process are monotonic within a millisecond
    /// (the v7 counter breaks ties), so creation order and id order agree.
    pub fn next(&self) -> RecordId {
        Uuid::now_v7().to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
