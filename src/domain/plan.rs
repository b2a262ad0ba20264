//! Week batches and scheduled items

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::item::ContentItem;

/// Aggregate composition of one week's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekCounts {
    pub num_items: usize,
    pub unique_personas: usize,
    pub unique_channels: usize,
    /// Distinct cluster ids among items that carry one
    pub unique_clusters: usize,
}

impl WeekCounts {
    pub fn of<'a>(items: impl IntoIterator<Item = &'a ContentItem>) -> Self {
        let mut num_items = 0;
        let mut personas = HashSet::new();
        let mut channels = HashSet::new();
        let mut clusters = HashSet::new();
        for item in items {
            num_items += 1;
            personas.insert(item.persona.as_str());
            channels.insert(item.channel.as_str());
            if let Some(cluster) = item.cluster_id.as_deref() {
                clusters.insert(cluster);
            }
        }
        Self {
            num_items,
            unique_personas: personas.len(),
            unique_channels: channels.len(),
            unique_clusters: clusters.len(),
        }
    }
}

/// Items selected for one week, in selection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekBatch {
    /// 1-based week index
    pub week: u32,
    pub items: Vec<ContentItem>,
    pub counts: WeekCounts,
    /// Items accepted only after caps were relaxed
    pub relaxed_picks: usize,
}

/// How an item's time slot was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementKind {
    /// A preferred day/window satisfied every spacing rule
    Window,
    /// Fallback day, spacing satisfied after stepping forward
    Fallback,
    /// Fallback retries exhausted; spacing rules may be violated
    Forced,
}

impl PlacementKind {
    pub fn is_fallback(self) -> bool {
        !matches!(self, PlacementKind::Window)
    }
}

/// An item with its assigned publish time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledItem {
    #[serde(flatten)]
    pub item: ContentItem,
    pub scheduled_at: NaiveDateTime,
    pub week_start: NaiveDateTime,
    pub week_end: NaiveDateTime,
    pub placement: PlacementKind,
}

/// Pacing parameters derived from a week's composition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacingParams {
    pub unique_personas: usize,
    pub unique_channels: usize,
    pub diversity: f64,
    pub min_gap_persona_hours: i64,
    pub min_gap_channel_hours: i64,
    pub max_per_day: usize,
    pub work_ratio: f64,
    pub tech_ratio: f64,
    /// Share of question/workflow/recommendation items
    pub help_ratio: f64,
}

/// A fully timed week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledWeek {
    pub week: u32,
    pub week_start: NaiveDateTime,
    pub week_end: NaiveDateTime,
    pub counts: WeekCounts,
    pub pacing: PacingParams,
    pub day_targets: [usize; 7],
    /// Sorted ascending by `scheduled_at`
    pub items: Vec<ScheduledItem>,
    pub relaxed_picks: usize,
    pub fallback_placements: usize,
    pub forced_placements: usize,
}
