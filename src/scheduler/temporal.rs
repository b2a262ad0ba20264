//! Day and time assignment for week batches.
//!
//! Each week is scheduled independently from its own batch: pacing parameters
//! come from the batch composition, and a fresh [`WeekSession`] carries the
//! per-week counters. Weeks run back to back from the campaign start.

use chrono::{Duration, NaiveDateTime, Timelike};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::{Intent, PlacementKind, ScheduledItem, ScheduledWeek, WeekBatch};
use crate::scheduler::pacing::derive_pacing;
use crate::scheduler::session::WeekSession;

/// Default minutes a fallback candidate moves forward per retry.
pub const DEFAULT_FALLBACK_STEP_MINUTES: i64 = 45;
/// Default fallback retries before the candidate is accepted as is.
pub const DEFAULT_FALLBACK_MAX_STEPS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    pub fallback_step_minutes: i64,
    pub fallback_max_steps: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            fallback_step_minutes: DEFAULT_FALLBACK_STEP_MINUTES,
            fallback_max_steps: DEFAULT_FALLBACK_MAX_STEPS,
        }
    }
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(at: NaiveDateTime) -> NaiveDateTime {
    at.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(at)
}

/// Start and end of 1-based week `week` for a campaign starting at `start`.
pub fn week_bounds(start: NaiveDateTime, week: u32) -> (NaiveDateTime, NaiveDateTime) {
    let week_start = start + Duration::days(7 * (i64::from(week) - 1));
    (week_start, week_start + Duration::days(6))
}

#[derive(Debug, Clone, Default)]
pub struct TemporalScheduler {
    config: SchedulingConfig,
}

impl TemporalScheduler {
    pub fn new(config: SchedulingConfig) -> Self {
        Self { config }
    }

    /// Assign a publish time to every item of one week.
    ///
    /// Help-seeking items are placed first; the returned items are sorted by
    /// `scheduled_at`.
    pub fn schedule_week(&self, batch: &WeekBatch, week_start: NaiveDateTime) -> ScheduledWeek {
        let week_end = week_start + Duration::days(6);
        let pacing = derive_pacing(&batch.items);
        let mut session = WeekSession::new(week_start, batch.items.len(), pacing, self.config);

        let mut order: Vec<_> = batch.items.iter().collect();
        order.sort_by_key(|item| Intent::infer(&item.title, item.body.as_deref()).priority());

        let mut items: Vec<ScheduledItem> = order
            .into_iter()
            .map(|item| {
                let placement = session.place(item);
                ScheduledItem {
                    item: item.clone(),
                    scheduled_at: placement.at,
                    week_start,
                    week_end,
                    placement: placement.kind,
                }
            })
            .collect();
        items.sort_by_key(|s| s.scheduled_at);

        let fallback_placements = items.iter().filter(|s| s.placement.is_fallback()).count();
        let forced_placements = items
            .iter()
            .filter(|s| s.placement == PlacementKind::Forced)
            .count();
        if fallback_placements > 0 {
            warn!(
                "week {}: {} fallback placements ({} with spacing violations)",
                batch.week, fallback_placements, forced_placements
            );
        }
        info!(
            "week {}: scheduled {} items, day targets {:?}, day load {:?}, persona gap {}h, channel gap {}h",
            batch.week,
            items.len(),
            session.targets(),
            session.day_load(),
            pacing.min_gap_persona_hours,
            pacing.min_gap_channel_hours
        );

        ScheduledWeek {
            week: batch.week,
            week_start,
            week_end,
            counts: batch.counts,
            pacing,
            day_targets: session.targets(),
            items,
            relaxed_picks: batch.relaxed_picks,
            fallback_placements,
            forced_placements,
        }
    }

    /// Schedule every batch, week N starting 7·(N−1) days after `start`.
    pub fn schedule(&self, batches: &[WeekBatch], start: NaiveDateTime) -> Vec<ScheduledWeek> {
        let start = truncate_to_minute(start);
        batches
            .iter()
            .map(|batch| {
                let (week_start, _) = week_bounds(start, batch.week);
                self.schedule_week(batch, week_start)
            })
            .collect()
    }
}
