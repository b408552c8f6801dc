//! Harness-wide constants.
//!
//! Fixed naming prefixes, timing defaults, and engine limits shared by the
//! generator, the builders, and the mock engine. Nothing here is mutable;
//! anything a run may want to vary lives in [`crate::config::RunConfig`].

// =============================================================================
// Engine limits
// =============================================================================

/// Maximum declared byte bound for a `BINARY(n)` column.
pub const MAX_BINARY_BYTES: u32 = 16_384;

/// Maximum declared character bound for an `NCHAR(n)` column.
pub const MAX_NCHAR_CHARS: u32 = 4_096;

/// Milliseconds per TTL unit (EbbDB TTL is expressed in seconds).
pub const TTL_UNIT_MS: i64 = 1_000;

// =============================================================================
// Naming
// =============================================================================

/// Name of the primary timestamp column in every schema.
pub const PRIMARY_COL: &str = "ts";

/// Prefix for super tables.
pub const SUPER_PREFIX: &str = "stb";

/// Prefix for child tables.
pub const CHILD_PREFIX: &str = "ct";

/// Prefix for normal tables.
pub const NORMAL_PREFIX: &str = "nt";

/// Prefix for scenario databases; each scenario appends a run id and an
/// index so no two scenarios ever share a namespace.
pub const DATABASE_PREFIX: &str = "ttl_db";

// =============================================================================
// Timing defaults
// =============================================================================

/// Default spacing between consecutive row timestamps (10 s).
pub const DEFAULT_TIME_STEP_MS: i64 = 10_000;

/// Timeline stretch applied to normal tables, as a ratio. Normal-table
/// rows step back by `step * 12 / 10` per index while child-table rows
/// step back by `step`, producing overlapping but distinct timelines
/// within one run.
pub const NORMAL_STRETCH_NUM: i64 = 12;

/// Denominator of the normal-table stretch ratio.
pub const NORMAL_STRETCH_DEN: i64 = 10;

/// Default slack added past the TTL deadline before the first
/// verification poll (the background sweep is asynchronous).
pub const DEFAULT_GRACE_MS: u64 = 2_000;

// =============================================================================
// Generator defaults
// =============================================================================

/// Default seed when a run does not pin its own.
pub const DEFAULT_SEED: u64 = 42;

/// Seed mixing constant for decorrelating per-type value streams
/// (64-bit golden ratio).
pub const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stretch_ratio_exceeds_unity() {
        assert!(NORMAL_STRETCH_NUM > NORMAL_STRETCH_DEN);
    }

    #[test]
    fn test_prefixes_are_distinct() {
        assert_ne!(SUPER_PREFIX, CHILD_PREFIX);
        assert_ne!(CHILD_PREFIX, NORMAL_PREFIX);
    }
}
