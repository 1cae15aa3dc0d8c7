//! System-wide default constants that are not engine tuning.

// ============================================================================
// History sink
// ============================================================================

/// Bounded capacity of the fire-and-forget history channel (records).
///
/// Records are dropped, not awaited, once the channel is full.
pub const HISTORY_CHANNEL_CAPACITY: usize = 256;

// ============================================================================
// HTTP
// ============================================================================

/// Maximum accepted request body (bytes). A full 8-vessel batch with
/// history is well under 64 KiB.
pub const API_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Per-request timeout for the HTTP layer (seconds).
pub const API_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Largest vessel batch accepted by the anomaly endpoint.
pub const MAX_VESSEL_BATCH: usize = 5_000;

// ============================================================================
// AIS telemetry
// ============================================================================

/// Latest accepted AIS timestamp (Unix seconds, 2100-01-01T00:00:00Z).
/// Timestamps must lie in `0..=MAX_AIS_TIMESTAMP_SECS`.
pub const MAX_AIS_TIMESTAMP_SECS: i64 = 4_102_444_800;

// ============================================================================
// Sample data
// ============================================================================

/// Seed used for `/sample_data` when none is given.
pub const SAMPLE_DATA_SEED: u64 = 42;

/// Hours of synthetic feature rows generated per zone.
pub const SAMPLE_DATA_HOURS: u32 = 24;
