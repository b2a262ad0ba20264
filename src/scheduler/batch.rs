//! Weekly batch selection.
//!
//! Partitions the content pool into successive weeks. Each week walks a
//! relaxation ladder of passes; every pass is a set of per-week caps plus a
//! scoring function, and greedily takes the best eligible candidate until the
//! week is full or nothing else fits.
//!
//! Hard limits in every pass:
//! - persona, channel, and persona/channel pair caps
//! - no two items on the same channel with cosine similarity at or above the
//!   near-duplicate threshold

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityConfig;
use crate::domain::{ContentItem, WeekBatch, WeekCounts};
use crate::error::{CadenceError, Result};
use crate::scheduler::similarity::is_near_duplicate;

/// Default same-channel near-duplicate threshold.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.82;

/// Tunables for batch selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Same-channel cosine similarity at which a candidate is rejected
    pub similarity_threshold: f64,
    /// Added to the persona and channel caps in the relaxed pass
    pub relax_step: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            relax_step: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassKind {
    Strict,
    Relaxed,
}

/// Per-week caps enforced by one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassLimits {
    pub per_persona: u32,
    pub per_channel: u32,
    pub per_pair: u32,
}

/// Score terms: a bonus when the week has not used the persona/channel/cluster
/// yet, a penalty when it has.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub channel_new: f64,
    pub channel_reused: f64,
    pub persona_new: f64,
    pub persona_reused: f64,
    pub cluster_new: f64,
    pub cluster_reused: f64,
    /// Multiplied by 1/position; zero disables the arc-position bonus
    pub position_bonus: f64,
}

pub const STRICT_WEIGHTS: ScoreWeights = ScoreWeights {
    channel_new: 2.0,
    channel_reused: -0.2,
    persona_new: 1.5,
    persona_reused: -0.1,
    cluster_new: 1.0,
    cluster_reused: -0.3,
    position_bonus: 0.15,
};

pub const RELAXED_WEIGHTS: ScoreWeights = ScoreWeights {
    channel_new: 1.0,
    channel_reused: -0.1,
    persona_new: 0.8,
    persona_reused: -0.05,
    cluster_new: 0.6,
    cluster_reused: -0.2,
    position_bonus: 0.0,
};

/// One rung of the relaxation ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPass {
    pub kind: PassKind,
    pub limits: PassLimits,
    pub weights: ScoreWeights,
}

/// Per-week selection state. Built fresh for every week and dropped after.
struct BatchTally<'a> {
    items: &'a [ContentItem],
    chosen: Vec<usize>,
    persona_count: HashMap<&'a str, u32>,
    channel_count: HashMap<&'a str, u32>,
    pair_count: HashMap<(&'a str, &'a str), u32>,
    cluster_count: HashMap<&'a str, u32>,
    relaxed_picks: usize,
}

impl<'a> BatchTally<'a> {
    fn new(items: &'a [ContentItem]) -> Self {
        Self {
            items,
            chosen: Vec::new(),
            persona_count: HashMap::new(),
            channel_count: HashMap::new(),
            pair_count: HashMap::new(),
            cluster_count: HashMap::new(),
            relaxed_picks: 0,
        }
    }

    fn len(&self) -> usize {
        self.chosen.len()
    }

    fn persona_uses(&self, persona: &str) -> u32 {
        self.persona_count.get(persona).copied().unwrap_or(0)
    }

    fn channel_uses(&self, channel: &str) -> u32 {
        self.channel_count.get(channel).copied().unwrap_or(0)
    }

    fn pair_uses(&self, persona: &'a str, channel: &'a str) -> u32 {
        self.pair_count.get(&(persona, channel)).copied().unwrap_or(0)
    }

    fn cluster_uses(&self, cluster: &str) -> u32 {
        self.cluster_count.get(cluster).copied().unwrap_or(0)
    }

    fn admits(&self, idx: usize, limits: &PassLimits, threshold: f64) -> bool {
        let items = self.items;
        let item = &items[idx];
        if self.persona_uses(&item.persona) >= limits.per_persona {
            return false;
        }
        if self.channel_uses(&item.channel) >= limits.per_channel {
            return false;
        }
        if self.pair_uses(&item.persona, &item.channel) >= limits.per_pair {
            return false;
        }
        !self.chosen.iter().any(|&j| {
            let other = &items[j];
            other.channel == item.channel && is_near_duplicate(&item.embedding, &other.embedding, threshold)
        })
    }

    fn score(&self, idx: usize, weights: &ScoreWeights) -> f64 {
        let item = &self.items[idx];
        let mut score = 0.0;

        score += if self.channel_uses(&item.channel) == 0 {
            weights.channel_new
        } else {
            weights.channel_reused
        };
        score += if self.persona_uses(&item.persona) == 0 {
            weights.persona_new
        } else {
            weights.persona_reused
        };
        if let Some(cluster) = item.cluster_id.as_deref() {
            score += if self.cluster_uses(cluster) == 0 {
                weights.cluster_new
            } else {
                weights.cluster_reused
            };
        }
        if weights.position_bonus != 0.0
            && let Some(position) = item.position
        {
            score += weights.position_bonus * (1.0 / f64::from(position.max(1)));
        }

        score
    }

    /// Position in `remaining` of the best eligible candidate; ties go to the
    /// earliest in pool order.
    fn best_candidate(&self, remaining: &[usize], pass: &SelectionPass, threshold: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (pos, &idx) in remaining.iter().enumerate() {
            if !self.admits(idx, &pass.limits, threshold) {
                continue;
            }
            let score = self.score(idx, &pass.weights);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((pos, score));
            }
        }
        best.map(|(pos, _)| pos)
    }

    fn accept(&mut self, idx: usize, kind: PassKind) {
        let items = self.items;
        let item = &items[idx];
        *self.persona_count.entry(item.persona.as_str()).or_insert(0) += 1;
        *self.channel_count.entry(item.channel.as_str()).or_insert(0) += 1;
        *self
            .pair_count
            .entry((item.persona.as_str(), item.channel.as_str()))
            .or_insert(0) += 1;
        if let Some(cluster) = item.cluster_id.as_deref() {
            *self.cluster_count.entry(cluster).or_insert(0) += 1;
        }
        if kind == PassKind::Relaxed {
            self.relaxed_picks += 1;
        }
        self.chosen.push(idx);
    }

    fn into_batch(self, week: u32) -> WeekBatch {
        let items: Vec<ContentItem> = self.chosen.iter().map(|&i| self.items[i].clone()).collect();
        let counts = WeekCounts::of(&items);
        WeekBatch {
            week,
            items,
            counts,
            relaxed_picks: self.relaxed_picks,
        }
    }
}

/// Splits a content pool into week-sized batches.
#[derive(Debug, Clone, Default)]
pub struct WeeklyBatchSelector {
    capacity: CapacityConfig,
    config: BatchConfig,
}

impl WeeklyBatchSelector {
    pub fn new(capacity: CapacityConfig, config: BatchConfig) -> Self {
        Self { capacity, config }
    }

    /// Strict caps first, then persona/channel caps raised by `relax_step`.
    pub fn ladder(&self) -> [SelectionPass; 2] {
        let strict = PassLimits {
            per_persona: self.capacity.per_persona,
            per_channel: self.capacity.per_channel,
            per_pair: self.capacity.per_pair,
        };
        let relaxed = PassLimits {
            per_persona: strict.per_persona + self.config.relax_step,
            per_channel: strict.per_channel + self.config.relax_step,
            per_pair: strict.per_pair,
        };
        [
            SelectionPass {
                kind: PassKind::Strict,
                limits: strict,
                weights: STRICT_WEIGHTS,
            },
            SelectionPass {
                kind: PassKind::Relaxed,
                limits: relaxed,
                weights: RELAXED_WEIGHTS,
            },
        ]
    }

    /// Partition `items` into weeks of at most `per_week` items.
    ///
    /// Every item lands in exactly one week. Halts with
    /// [`CadenceError::DegenerateScheduling`] if a week cannot take anything
    /// while items remain.
    pub fn select(&self, items: &[ContentItem], per_week: usize) -> Result<Vec<WeekBatch>> {
        let ladder = self.ladder();
        let threshold = self.config.similarity_threshold;
        let mut remaining: Vec<usize> = (0..items.len()).collect();
        let mut weeks = Vec::new();
        let mut week: u32 = 1;

        while !remaining.is_empty() {
            let mut tally = BatchTally::new(items);

            for pass in &ladder {
                while !remaining.is_empty() && tally.len() < per_week {
                    let Some(pos) = tally.best_candidate(&remaining, pass, threshold) else {
                        break;
                    };
                    let idx = remaining.remove(pos);
                    debug!(
                        "week {}: {:?} pick '{}' ({} / {})",
                        week, pass.kind, items[idx].title, items[idx].persona, items[idx].channel
                    );
                    tally.accept(idx, pass.kind);
                }
            }

            if tally.len() == 0 {
                return Err(CadenceError::DegenerateScheduling {
                    week,
                    placed: items.len() - remaining.len(),
                    remaining: remaining.len(),
                });
            }

            if tally.relaxed_picks > 0 {
                warn!("week {}: {} items accepted under relaxed caps", week, tally.relaxed_picks);
            }

            let batch = tally.into_batch(week);
            info!(
                "week {}: {} items, {} personas, {} channels, {} left in pool",
                week,
                batch.counts.num_items,
                batch.counts.unique_personas,
                batch.counts.unique_channels,
                remaining.len()
            );
            weeks.push(batch);
            week += 1;
        }

        Ok(weeks)
    }
}
