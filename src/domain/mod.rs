//! Domain types for Cadence
//!
//! This module contains the data model shared by every planning stage:
//! - ContentItem / Roster / CampaignInput: what the engine consumes
//! - WeekBatch: items selected for one week
//! - ScheduledItem / ScheduledWeek: items with concrete publish times
//! - PostRow / Comment / Thread: the flattened post table and comment plan
//! - Intent / Vibe: keyword heuristics that bias pacing

pub mod comment;
pub mod intent;
pub mod item;
pub mod plan;

pub use comment::{Comment, PostRow, Thread, ThreadCounts, ThreadView};
pub use intent::{Intent, Vibe};
pub use item::{CampaignInput, ContentItem, Roster};
pub use plan::{PacingParams, PlacementKind, ScheduledItem, ScheduledWeek, WeekBatch, WeekCounts};
