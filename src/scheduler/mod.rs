//! Scheduler module: weekly batching and per-item timing.
//!
//! This module provides:
//! - **Batch selection**: partitions the content pool into week-sized batches under
//!   persona/channel/pair caps and a same-channel near-duplicate guard.
//! - **Pacing**: week-level spacing and daily load parameters derived from a batch.
//! - **Temporal scheduling**: assigns a day and minute to every item of a batch.
//!
//! # Architecture
//!
//! Both stages walk a relaxation ladder:
//! 1. Batch selection tries strict caps, then raises persona/channel caps by one
//! 2. Placement tries hashed day/window candidates, then a fallback day that
//!    always accepts the item
//!
//! All per-week counters live in short-lived session objects (`BatchTally`,
//! [`WeekSession`]) that are discarded once the week is finished.

mod batch;
mod pacing;
mod session;
mod similarity;
mod temporal;

pub use batch::{
    BatchConfig, DEFAULT_SIMILARITY_THRESHOLD, PassKind, PassLimits, RELAXED_WEIGHTS, STRICT_WEIGHTS, ScoreWeights,
    SelectionPass, WeeklyBatchSelector,
};
pub use pacing::{TimeWindow, base_day_order, day_targets, derive_pacing, lateness, time_windows, week_seed};
pub use session::{Placement, WeekSession};
pub use similarity::{cosine_similarity, is_near_duplicate};
pub use temporal::{
    DEFAULT_FALLBACK_MAX_STEPS, DEFAULT_FALLBACK_STEP_MINUTES, SchedulingConfig, TemporalScheduler,
    truncate_to_minute, week_bounds,
};
