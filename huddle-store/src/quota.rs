//! Capacity tracking and eviction arithmetic.
//!
//! A collection is never allowed to settle above its capacity. Once the
//! record count crosses the high-water mark, the engine drops the oldest
//! records (by `created_at`, ties resolved by insertion order) until the
//! count is at or below the low-water mark. Eviction is a silent side
//! effect of `create`, and evicted records are unrecoverable - the
//! documented trade-off of a client-side cache.

use huddle_core::ValidationError;

/// Fraction of capacity at which eviction triggers.
pub const DEFAULT_HIGH_WATER: f64 = 0.8;

/// Fraction of capacity eviction reduces occupancy to.
pub const DEFAULT_LOW_WATER: f64 = 0.7;

/// Tracks one collection's size against its configured capacity.
#[derive(Debug, Clone, Copy)]
pub struct QuotaGuard {
    capacity: usize,
    high_water: f64,
    low_water: f64,
}

impl QuotaGuard {
    /// Guard with the default 0.8 / 0.7 watermarks.
    pub fn new(capacity: usize) -> Result<Self, ValidationError> {
        Self::with_watermarks(capacity, DEFAULT_HIGH_WATER, DEFAULT_LOW_WATER)
    }

    /// Guard with explicit watermark fractions.
    ///
    /// Requires `capacity >= 1` and `0 < low_water <= high_water <= 1`.
    pub fn with_watermarks(
        capacity: usize,
        high_water: f64,
        low_water: f64,
    ) -> Result<Self, ValidationError> {
        if capacity == 0 {
            return Err(ValidationError::InvalidValue {
                field: "capacity".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&high_water) || high_water == 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "high_water".to_string(),
                reason: format!("{high_water} is outside (0, 1]"),
            });
        }
        if !(0.0..=1.0).contains(&low_water) || low_water == 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "low_water".to_string(),
                reason: format!("{low_water} is outside (0, 1]"),
            });
        }
        if low_water > high_water {
            return Err(ValidationError::InvalidValue {
                field: "low_water".to_string(),
                reason: format!("{low_water} exceeds high_water {high_water}"),
            });
        }
        Ok(Self {
            capacity,
            high_water,
            low_water,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record count above which eviction triggers.
    pub fn high_mark(&self) -> usize {
        (self.capacity as f64 * self.high_water).floor() as usize
    }

    /// Record count eviction reduces the collection to.
    pub fn low_mark(&self) -> usize {
        (self.capacity as f64 * self.low_water).floor() as usize
    }

    /// Whether a collection of `len` records must evict before settling.
    pub fn needs_eviction(&self, len: usize) -> bool {
        len > self.high_mark()
    }

    /// How many records an eviction pass would drop from `len`.
    pub fn eviction_count(&self, len: usize) -> usize {
        len.saturating_sub(self.low_mark())
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Marks never exceed capacity and low never exceeds high.
        #[test]
        fn prop_marks_ordered(
            capacity in 1usize..100_000,
            high in 0.01f64..=1.0,
            low_ratio in 0.01f64..=1.0,
        ) {
            let low = (high * low_ratio).max(f64::MIN_POSITIVE);
            let guard = QuotaGuard::with_watermarks(capacity, high, low).unwrap();
            prop_assert!(guard.low_mark() <= guard.high_mark());
            prop_assert!(guard.high_mark() <= capacity);
        }

        /// After dropping `eviction_count` records, the guard is satisfied.
        #[test]
        fn prop_eviction_count_settles_collection(
            capacity in 1usize..10_000,
            len in 0usize..20_000,
        ) {
            let guard = QuotaGuard::new(capacity).unwrap();
            let remaining = len - guard.eviction_count(len);
            prop_assert!(remaining <= guard.low_mark() || len <= guard.low_mark());
            prop_assert!(!guard.needs_eviction(remaining.min(len)));
        }
    }
}
