//! Campaign planning pipeline.
//!
//! Runs the four stages in order over one fixed content pool:
//! 1. capacity: feasible posts per week for the roster
//! 2. batching: week-sized batches under caps and the near-duplicate guard
//! 3. timing: a publish minute for every item
//! 4. comments: a post table and three comments per post
//!
//! The run is pure: identical input and start instant give an identical plan,
//! down to the fingerprint.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::capacity::{CapacityConfig, CapacityResult, plan_capacity};
use crate::comments::CommentThreadPlanner;
use crate::domain::{CampaignInput, Comment, PostRow, ScheduledWeek, Thread, ThreadCounts, ThreadView};
use crate::error::{CadenceError, Result};
use crate::scheduler::{BatchConfig, SchedulingConfig, TemporalScheduler, WeeklyBatchSelector, truncate_to_minute};
use crate::seed::fingerprint;

/// All engine tunables.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub capacity: CapacityConfig,
    pub batching: BatchConfig,
    pub scheduling: SchedulingConfig,
}

/// Counts a reviewer needs to judge how much the plan bent its own rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReport {
    pub total_items: usize,
    pub scheduled_items: usize,
    pub weeks: usize,
    pub comments: usize,
    /// Items batched only after persona/channel caps were relaxed
    pub relaxed_picks: usize,
    /// Items placed on a fallback day
    pub fallback_placements: usize,
    /// Fallback placements that still violate spacing
    pub forced_placements: usize,
}

impl PlanReport {
    /// True when every item was batched under strict caps and placed in a
    /// preferred window.
    pub fn is_fully_compliant(&self) -> bool {
        self.relaxed_picks == 0 && self.fallback_placements == 0
    }
}

/// Output of one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignPlan {
    /// Hex fingerprint of the input and start instant
    pub fingerprint: String,
    pub start: NaiveDateTime,
    pub capacity: CapacityResult,
    pub weeks: Vec<ScheduledWeek>,
    pub posts: Vec<PostRow>,
    pub comments: Vec<Comment>,
    pub report: PlanReport,
}

impl CampaignPlan {
    /// Posts with their comments nested, comments ordered by (timestamp, id).
    pub fn threads(&self) -> ThreadView {
        let mut by_post: BTreeMap<&str, Vec<Comment>> = BTreeMap::new();
        for comment in &self.comments {
            by_post.entry(comment.post_id.as_str()).or_default().push(comment.clone());
        }

        let posts: Vec<Thread> = self
            .posts
            .iter()
            .map(|post| {
                let mut comments = by_post.remove(post.post_id.as_str()).unwrap_or_default();
                comments.sort_by(|a, b| {
                    a.timestamp
                        .cmp(&b.timestamp)
                        .then_with(|| a.comment_id.cmp(&b.comment_id))
                });
                Thread {
                    post: post.clone(),
                    comments,
                }
            })
            .collect();

        ThreadView {
            counts: ThreadCounts {
                posts: posts.len(),
                comments: self.comments.len(),
            },
            posts,
            fingerprint: self.fingerprint.clone(),
        }
    }
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    input: &'a CampaignInput,
    start: NaiveDateTime,
}

/// Entry point for a full planning run.
#[derive(Debug, Clone, Default)]
pub struct CampaignPlanner {
    config: EngineConfig,
}

impl CampaignPlanner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Capacity stage only.
    pub fn capacity(&self, input: &CampaignInput) -> Result<CapacityResult> {
        plan_capacity(
            input.roster.unique_personas().len(),
            input.roster.unique_channels().len(),
            input.roster.target_posts_per_week,
            &self.config.capacity,
        )
    }

    /// Check every precondition that would otherwise fail mid-run.
    pub fn validate(&self, input: &CampaignInput) -> Result<()> {
        let personas = input.roster.unique_personas();
        if personas.len() < 2 {
            return Err(CadenceError::Configuration(format!(
                "at least 2 personas are required, roster has {}",
                personas.len()
            )));
        }
        if input.items.is_empty() {
            return Err(CadenceError::Data("content pool is empty".to_string()));
        }

        let dims = input.items[0].embedding.len();
        if dims == 0 {
            return Err(CadenceError::Data("item 0 has an empty embedding".to_string()));
        }
        if let Some((idx, item)) = input
            .items
            .iter()
            .enumerate()
            .find(|(_, item)| item.embedding.len() != dims)
        {
            return Err(CadenceError::Data(format!(
                "item {} ('{}') has embedding length {}, expected {}",
                idx,
                item.title,
                item.embedding.len(),
                dims
            )));
        }

        let known_personas: HashSet<&str> = personas.into_iter().collect();
        let known_channels: HashSet<&str> = input.roster.unique_channels().into_iter().collect();
        for item in &input.items {
            if !known_personas.contains(item.persona.as_str()) {
                warn!("item '{}' is authored by unknown persona '{}'", item.title, item.persona);
            }
            if !known_channels.contains(item.channel.as_str()) {
                warn!("item '{}' targets unknown channel '{}'", item.title, item.channel);
            }
        }
        Ok(())
    }

    /// Run every stage and assemble the plan.
    pub fn plan(&self, input: &CampaignInput, start: NaiveDateTime) -> Result<CampaignPlan> {
        let start = truncate_to_minute(start);

        let capacity = self.capacity(input)?;
        self.validate(input)?;
        info!(
            "capacity: {} posts/week (raw {}, safe {}, limited by {:?}, capped: {})",
            capacity.feasible_posts_per_week,
            capacity.capacities.raw_max,
            capacity.capacities.safe_max,
            capacity.capacities.limiting_factors,
            capacity.target_was_capped
        );

        let selector = WeeklyBatchSelector::new(self.config.capacity, self.config.batching);
        let batches = selector.select(&input.items, capacity.feasible_posts_per_week)?;

        let weeks = TemporalScheduler::new(self.config.scheduling).schedule(&batches, start);

        let thread_plan = CommentThreadPlanner::new().plan(&weeks, &input.roster)?;

        let report = PlanReport {
            total_items: input.items.len(),
            scheduled_items: weeks.iter().map(|w| w.items.len()).sum(),
            weeks: weeks.len(),
            comments: thread_plan.comments.len(),
            relaxed_picks: weeks.iter().map(|w| w.relaxed_picks).sum(),
            fallback_placements: weeks.iter().map(|w| w.fallback_placements).sum(),
            forced_placements: weeks.iter().map(|w| w.forced_placements).sum(),
        };
        if !report.is_fully_compliant() {
            warn!(
                "plan bent constraints: {} relaxed picks, {} fallback placements ({} forced)",
                report.relaxed_picks, report.fallback_placements, report.forced_placements
            );
        }

        let fingerprint = fingerprint(&serde_json::to_vec(&FingerprintInput { input, start })?);
        info!(
            "plan {}: {} items over {} weeks, {} comments",
            fingerprint, report.scheduled_items, report.weeks, report.comments
        );

        Ok(CampaignPlan {
            fingerprint,
            start,
            capacity,
            weeks,
            posts: thread_plan.posts,
            comments: thread_plan.comments,
            report,
        })
    }
}
