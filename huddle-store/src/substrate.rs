//! Bounded key-value substrate shared by every collection.
//!
//! The substrate is the host persistence area: a flat map from namespace
//! keys to serialized collection blobs with a hard total-size limit. It is
//! deliberately dumb - no indexing, no partial writes, no versioning.
//!
//! # Multi-writer caveat
//!
//! The substrate is a shared, unscoped resource. Independent store
//! instances writing the same namespace rewrite the whole blob, so the
//! later writer wins in its entirety, including changes to records the
//! earlier writer never touched. This layer does not mitigate that;
//! callers needing multi-writer correctness must use the server path.

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Errors raised by a substrate backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubstrateError {
    #[error("Substrate quota exceeded: write of {attempted} bytes over {limit} byte budget")]
    QuotaExceeded { attempted: usize, limit: usize },

    #[error("Substrate unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Namespaced blob storage with a hard total-byte budget.
///
/// Implementations must account key and value bytes against the budget and
/// reject a `store` that would exceed it with
/// [`SubstrateError::QuotaExceeded`]. Reads and removes never enforce the
/// budget.
pub trait Substrate: Send + Sync {
    /// Read the blob persisted under `namespace`, if any.
    fn load(&self, namespace: &str) -> Result<Option<String>, SubstrateError>;

    /// Persist `blob` under `namespace`, replacing any previous value.
    fn store(&self, namespace: &str, blob: &str) -> Result<(), SubstrateError>;

    /// Drop the blob persisted under `namespace`. Removing an absent
    /// namespace is a no-op.
    fn remove(&self, namespace: &str) -> Result<(), SubstrateError>;
}

/// In-process substrate: a locked hash map with byte accounting.
///
/// Stands in for a browser-local storage area in tests and offline
/// deployments. The default construction is effectively unbounded;
/// [`MemorySubstrate::with_limit`] enforces a byte budget.
#[derive(Debug)]
pub struct MemorySubstrate {
    entries: RwLock<HashMap<String, String>>,
    limit: usize,
}

impl MemorySubstrate {
    /// Create an unbounded substrate.
    pub fn new() -> Self {
        Self::with_limit(usize::MAX)
    }

    /// Create a substrate with a hard total-byte budget across all
    /// namespaces (keys count against the budget too).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            limit,
        }
    }

    /// Total bytes currently accounted against the budget.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .map(|entries| Self::accounted(&entries))
            .unwrap_or(0)
    }

    fn accounted(entries: &HashMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Default for MemorySubstrate {
    fn default() -> Self {
        Self::new()
    }
}

impl Substrate for MemorySubstrate {
    fn load(&self, namespace: &str) -> Result<Option<String>, SubstrateError> {
        let entries = self.entries.read().map_err(|_| SubstrateError::Unavailable {
            reason: "lock poisoned".to_string(),
        })?;
        Ok(entries.get(namespace).cloned())
    }

    fn store(&self, namespace: &str, blob: &str) -> Result<(), SubstrateError> {
        let mut entries = self.entries.write().map_err(|_| SubstrateError::Unavailable {
            reason: "lock poisoned".to_string(),
        })?;

        let current = Self::accounted(&entries);
        let replaced = entries
            .get(namespace)
            .map(|v| namespace.len() + v.len())
            .unwrap_or(0);
        let attempted = current - replaced + namespace.len() + blob.len();
        if attempted > self.limit {
            return Err(SubstrateError::QuotaExceeded {
                attempted,
                limit: self.limit,
            });
        }

        entries.insert(namespace.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<(), SubstrateError> {
        let mut entries = self.entries.write().map_err(|_| SubstrateError::Unavailable {
            reason: "lock poisoned".to_string(),
        })?;
        entries.remove(namespace);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
