//! Week-level pacing parameters.
//!
//! Everything here is derived from a week batch's composition alone:
//! - minimum spacing between posts by the same persona / on the same channel
//! - how many posts a single day may carry
//! - how many posts each day of the week should aim for
//! - which clock windows a post is tried in

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::domain::{ContentItem, Intent, PacingParams, Vibe};
use crate::seed::stable_pick;

/// Earliest and latest hour a clock window may touch.
const EARLIEST_HOUR: i64 = 8;
const LATEST_HOUR: i64 = 24;

/// Round half to even.
fn round_even(x: f64) -> i64 {
    x.round_ties_even() as i64
}

/// Derive pacing parameters from a week's items.
pub fn derive_pacing(items: &[ContentItem]) -> PacingParams {
    let personas: HashSet<&str> = items
        .iter()
        .map(|i| i.persona.as_str())
        .filter(|p| !p.is_empty())
        .collect();
    let channels: HashSet<&str> = items
        .iter()
        .map(|i| i.channel.as_str())
        .filter(|c| !c.is_empty())
        .collect();

    let unique_personas = personas.len().max(1);
    let unique_channels = channels.len().max(1);
    let n = items.len().max(1) as f64;
    let p = unique_personas as f64;
    let s = unique_channels as f64;

    let diversity = (p * s).sqrt();
    let min_gap_persona_hours = round_even(4.0 + 8.0 / diversity.max(1.0));
    let min_gap_channel_hours = round_even(3.0 + 6.0 / (s / 2.0).max(1.0));

    let channel_load = (p.min(5.0) * 0.7 + s.min(10.0) * 0.3).max(1.0);
    let max_per_day = round_even((1.0 + channel_load / 3.0).min(5.0)).max(1) as usize;

    let vibes: Vec<Vibe> = items.iter().map(|i| Vibe::of_channel(&i.channel)).collect();
    let work = vibes.iter().filter(|v| **v == Vibe::Work).count() as f64;
    let tech = vibes.iter().filter(|v| **v == Vibe::Tech).count() as f64;
    let help = items
        .iter()
        .filter(|i| Intent::infer(&i.title, i.body.as_deref()).is_help_seeking())
        .count() as f64;

    PacingParams {
        unique_personas,
        unique_channels,
        diversity,
        min_gap_persona_hours,
        min_gap_channel_hours,
        max_per_day,
        work_ratio: work / n,
        tech_ratio: tech / n,
        help_ratio: help / n,
    }
}

/// Seed string shared by every hashed decision in one week.
pub fn week_seed(week_start: NaiveDate, n: usize, pacing: &PacingParams) -> String {
    format!(
        "{}|n={}|p={}|s={}",
        week_start, n, pacing.unique_personas, pacing.unique_channels
    )
}

/// Spread `n` posts over 7 days, at most `max_per_day` each.
///
/// Item i starts at day ⌊7i/n⌋ shifted by a hashed jitter of -1, 0 or +1,
/// then walks forward by a hashed stride until it finds a day with room.
pub fn day_targets(n: usize, seed: &str, max_per_day: usize) -> [usize; 7] {
    let mut targets = [0usize; 7];
    if n == 0 {
        return targets;
    }

    for i in 0..n {
        let base = ((i * 7) / n) as i64;
        let jitter = stable_pick(&format!("{}|jitter|{}", seed, i), 3) as i64 - 1;
        let mut day = (base + jitter).rem_euclid(7) as usize;
        let stride = 1 + stable_pick(&format!("{}|stride|{}", seed, i), 3) as usize;

        for _ in 0..7 {
            if targets[day] < max_per_day {
                targets[day] += 1;
                break;
            }
            day = (day + stride) % 7;
        }
    }
    targets
}

/// Hashed permutation of the seven day indices; candidate days are tried in
/// this order when scores tie.
pub fn base_day_order(seed: &str) -> [usize; 7] {
    let mut order = [0, 1, 2, 3, 4, 5, 6];
    order.sort_by_key(|&d| (stable_pick(&format!("{}|order|{}", seed, d), 1000), d));
    order
}

/// A clock window `[start_hour, end_hour)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_hour: i64,
    pub end_hour: i64,
}

impl TimeWindow {
    fn new(start_hour: i64, end_hour: i64) -> Self {
        Self { start_hour, end_hour }
    }

    pub fn minutes(&self) -> i64 {
        ((self.end_hour - self.start_hour) * 60).max(1)
    }
}

/// How late in the day a post should land, in [0.05, 0.95].
pub fn lateness(is_weekend: bool, vibe: Vibe, intent: Intent, pacing: &PacingParams) -> f64 {
    let mut late = 0.45;
    match vibe {
        Vibe::Tech => late += 0.15 * (0.6 + pacing.tech_ratio),
        Vibe::Work => late -= 0.18 * (0.6 + pacing.work_ratio),
        Vibe::General => {}
    }
    match intent {
        Intent::Workflow | Intent::Compare => late += 0.08,
        Intent::Question | Intent::Recommendation => late -= 0.05 * (0.7 + pacing.help_ratio),
        _ => {}
    }
    if is_weekend {
        late -= 0.10;
    }
    late.clamp(0.05, 0.95)
}

/// Candidate clock windows for one post on one day.
///
/// Two windows around a lateness-driven center; busy weeks (three or more
/// posts a day) get an extra early window tried first.
pub fn time_windows(is_weekend: bool, vibe: Vibe, intent: Intent, pacing: &PacingParams) -> Vec<TimeWindow> {
    let late = lateness(is_weekend, vibe, intent, pacing);

    let mut center = 12 + round_even(late * 10.0);
    if is_weekend {
        center -= 2;
    }
    let width = round_even(2.0 + 3.0 / pacing.diversity.max(1.0));

    let mut windows = vec![
        TimeWindow::new(EARLIEST_HOUR.max(center - width), 23.min(center)),
        TimeWindow::new(9.max(center), LATEST_HOUR.min(center + width + 1)),
    ];
    if pacing.max_per_day >= 3 {
        let early_center = 9.max(center - (width + 3));
        windows.insert(
            0,
            TimeWindow::new(EARLIEST_HOUR.max(early_center - 1), 14.min(early_center + 2)),
        );
    }

    windows.retain(|w| w.end_hour - w.start_hour >= 1);
    windows
}
