//! Configuration of the driver and its derivers.

use core::time::Duration;

/// The default number of L1 blocks the finalizer keeps finality data for.
///
/// Covers more than two L1 epochs of 32 slots, plus the block the lookback starts from.
pub const DEFAULT_FINALITY_LOOKBACK: usize = 4 * 32 + 1;

/// The default number of L1 blocks the derivation origin must advance before the finalizer
/// retries finalization on an unchanged L1 finality signal.
pub const DEFAULT_FINALITY_DELAY: u64 = 64;

/// The default bound on the number of queued events.
pub const DEFAULT_MAX_QUEUED_EVENTS: usize = 10_000;

/// Configuration of the [Driver] and the derivers it hosts.
///
/// [Driver]: crate::Driver
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriverConfig {
    /// The number of L1 blocks the finalizer keeps finality data for.
    pub finality_lookback: usize,
    /// See [DEFAULT_FINALITY_DELAY].
    pub finality_delay: u64,
    /// Deadline for processing a new payload.
    pub payload_process_timeout: Duration,
    /// Deadline for a forkchoice update.
    pub forkchoice_timeout: Duration,
    /// Deadline for an L1 block lookup made by the finalizer.
    pub l1_fetch_timeout: Duration,
    /// The bound on the number of queued events.
    pub max_queued_events: usize,
    /// The interval between two driver steps when idle.
    pub step_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            finality_lookback: DEFAULT_FINALITY_LOOKBACK,
            finality_delay: DEFAULT_FINALITY_DELAY,
            payload_process_timeout: Duration::from_secs(10),
            forkchoice_timeout: Duration::from_secs(10),
            l1_fetch_timeout: Duration::from_secs(10),
            max_queued_events: DEFAULT_MAX_QUEUED_EVENTS,
            step_interval: Duration::from_secs(2),
        }
    }
}

/// Options handed to [FindL2Heads] when the engine is reset.
///
/// [FindL2Heads]: crate::FindL2Heads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SyncConfig {
    /// Skip the sanity check of the L1 origins of the unsafe chain when searching for heads.
    pub skip_sync_start_check: bool,
    /// Whether the execution engine can sync past the finalized head on its own.
    pub supports_post_finalization_el_sync: bool,
}
