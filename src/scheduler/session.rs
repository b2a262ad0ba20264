//! Per-week placement state.
//!
//! A `WeekSession` owns every mutable counter the temporal scheduler needs for
//! one week: day loads, per-persona timestamps, and per-day channel timestamps.
//! It is created for a single week batch and dropped when that week is done.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;

use crate::domain::{ContentItem, Intent, PacingParams, PlacementKind, Vibe};
use crate::scheduler::pacing::{TimeWindow, base_day_order, day_targets, time_windows, week_seed};
use crate::scheduler::temporal::SchedulingConfig;
use crate::seed::stable_pick;

/// A chosen slot for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub day: usize,
    pub at: NaiveDateTime,
    pub kind: PlacementKind,
}

/// Keys and derived attributes of the item being placed.
struct Candidate<'a> {
    persona: &'a str,
    channel: &'a str,
    title: &'a str,
    intent: Intent,
    vibe: Vibe,
}

impl<'a> Candidate<'a> {
    fn of(item: &'a ContentItem) -> Self {
        Self {
            persona: &item.persona,
            channel: &item.channel,
            title: &item.title,
            intent: Intent::infer(&item.title, item.body.as_deref()),
            vibe: Vibe::of_channel(&item.channel),
        }
    }

    fn key(&self) -> String {
        format!("{}|{}|{}", self.persona, self.channel, self.title)
    }
}

pub struct WeekSession {
    config: SchedulingConfig,
    pacing: PacingParams,
    seed: String,
    days: [NaiveDate; 7],
    targets: [usize; 7],
    base_order: [usize; 7],
    day_load: [usize; 7],
    persona_times: HashMap<String, Vec<NaiveDateTime>>,
    channel_times: HashMap<(usize, String), Vec<NaiveDateTime>>,
}

impl WeekSession {
    pub fn new(week_start: NaiveDateTime, items: usize, pacing: PacingParams, config: SchedulingConfig) -> Self {
        let seed = week_seed(week_start.date(), items, &pacing);
        let targets = day_targets(items, &seed, pacing.max_per_day);
        let base_order = base_day_order(&seed);

        let mut days = [week_start.date(); 7];
        for (offset, day) in days.iter_mut().enumerate() {
            *day = week_start.date() + Duration::days(offset as i64);
        }

        Self {
            config,
            pacing,
            seed,
            days,
            targets,
            base_order,
            day_load: [0; 7],
            persona_times: HashMap::new(),
            channel_times: HashMap::new(),
        }
    }

    pub fn targets(&self) -> [usize; 7] {
        self.targets
    }

    pub fn day_load(&self) -> [usize; 7] {
        self.day_load
    }

    fn is_weekend(&self, day: usize) -> bool {
        self.days[day].weekday().num_days_from_monday() >= 5
    }

    /// Week day index of `at`, or `fallback` when `at` lies outside the week.
    fn day_of(&self, at: NaiveDateTime, fallback: usize) -> usize {
        self.days.iter().position(|d| *d == at.date()).unwrap_or(fallback)
    }

    fn midnight(&self, day: usize) -> NaiveDateTime {
        self.days[day].and_time(NaiveTime::MIN)
    }

    fn windows(&self, day: usize, candidate: &Candidate<'_>) -> Vec<TimeWindow> {
        time_windows(self.is_weekend(day), candidate.vibe, candidate.intent, &self.pacing)
    }

    fn channel_times_on(&self, day: usize, channel: &str) -> &[NaiveDateTime] {
        self.channel_times
            .get(&(day, channel.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn persona_times_of(&self, persona: &str) -> &[NaiveDateTime] {
        self.persona_times.get(persona).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Adjacent-day penalty: previous day loaded costs 1.0, next day 0.7.
    fn adjacency_penalty(&self, day: usize) -> f64 {
        let left = day.checked_sub(1).map(|d| self.day_load[d]).unwrap_or(0);
        let right = self.day_load.get(day + 1).copied().unwrap_or(0);
        (if left > 0 { 1.0 } else { 0.0 }) + (if right > 0 { 0.7 } else { 0.0 })
    }

    fn day_score(&self, day: usize, candidate: &Candidate<'_>) -> f64 {
        let mut score = 0.0;

        score += if self.day_load[day] < self.targets[day] { 3.0 } else { -4.0 };
        score -= self.adjacency_penalty(day);

        score += if self.channel_times_on(day, candidate.channel).is_empty() {
            1.4
        } else {
            -0.6
        };

        let same_day = self
            .persona_times_of(candidate.persona)
            .iter()
            .filter(|t| t.date() == self.days[day])
            .count();
        score += if same_day == 0 { 0.9 } else { -0.9 * same_day as f64 };

        if candidate.intent.is_help_seeking() {
            score += (6 - day) as f64 * 0.02;
        }

        score += stable_pick(&format!("{}|day{}", candidate.key(), day), 100) as f64 / 10000.0;
        score
    }

    /// Days in try order: hashed base order stably re-sorted by score.
    fn day_order(&self, candidate: &Candidate<'_>) -> Vec<usize> {
        let mut scored: Vec<(usize, f64)> = self
            .base_order
            .iter()
            .map(|&d| (d, self.day_score(d, candidate)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.into_iter().map(|(d, _)| d).collect()
    }

    fn pick_time(&self, day: usize, window: TimeWindow, candidate: &Candidate<'_>, salt: &str) -> NaiveDateTime {
        let offset = stable_pick(&format!("{}|{}", candidate.key(), salt), window.minutes() as u64) as i64;
        self.midnight(day) + Duration::minutes(window.start_hour * 60 + offset)
    }

    fn too_close(at: NaiveDateTime, others: &[NaiveDateTime], min_gap_hours: i64) -> bool {
        others
            .iter()
            .any(|o| (at - *o).num_seconds().abs() < min_gap_hours * 3600)
    }

    fn respects_gaps(&self, day: usize, at: NaiveDateTime, candidate: &Candidate<'_>) -> bool {
        !Self::too_close(at, self.persona_times_of(candidate.persona), self.pacing.min_gap_persona_hours)
            && !Self::too_close(
                at,
                self.channel_times_on(day, candidate.channel),
                self.pacing.min_gap_channel_hours,
            )
    }

    /// Preferred placement: best-scoring day, each window tried twice.
    fn place_in_window(&self, candidate: &Candidate<'_>) -> Option<Placement> {
        for day in self.day_order(candidate) {
            let windows = self.windows(day, candidate);
            let attempts = windows.iter().chain(windows.iter());
            for (attempt, window) in attempts.enumerate() {
                let salt = format!("{}|{}|{}", self.seed, day, attempt);
                let at = self.pick_time(day, *window, candidate, &salt);
                if self.respects_gaps(day, at, candidate) {
                    return Some(Placement {
                        day,
                        at,
                        kind: PlacementKind::Window,
                    });
                }
            }
        }
        None
    }

    /// Day with the most headroom (ties: lowest load, then earliest); the
    /// least loaded day once every target is met.
    fn fallback_day(&self) -> usize {
        let headroom = |d: usize| self.targets[d] as i64 - self.day_load[d] as i64;
        let best = (0..7)
            .max_by(|&a, &b| {
                headroom(a)
                    .cmp(&headroom(b))
                    .then(self.day_load[b].cmp(&self.day_load[a]))
                    .then(b.cmp(&a))
            })
            .unwrap_or(0);
        if headroom(best) > 0 {
            return best;
        }
        (0..7).min_by_key(|&d| (self.day_load[d], d)).unwrap_or(0)
    }

    /// Fallback placement: always succeeds, stepping the first window's
    /// candidate forward until spacing holds or retries run out.
    fn place_fallback(&self, candidate: &Candidate<'_>) -> Placement {
        let day = self.fallback_day();
        let window = self
            .windows(day, candidate)
            .first()
            .copied()
            .unwrap_or(TimeWindow {
                start_hour: 9,
                end_hour: 18,
            });
        let salt = format!("{}|fallback", self.seed);
        let mut at = self.pick_time(day, window, candidate, &salt);

        // Stepping may cross midnight; spacing and load follow the calendar day
        let mut kind = PlacementKind::Forced;
        for _ in 0..self.config.fallback_max_steps {
            if self.respects_gaps(self.day_of(at, day), at, candidate) {
                kind = PlacementKind::Fallback;
                break;
            }
            at += Duration::minutes(self.config.fallback_step_minutes);
        }

        Placement {
            day: self.day_of(at, day),
            at,
            kind,
        }
    }

    /// Place one item, walking the ladder from preferred windows to fallback,
    /// and record the result.
    pub fn place(&mut self, item: &ContentItem) -> Placement {
        let candidate = Candidate::of(item);
        let placement = self
            .place_in_window(&candidate)
            .unwrap_or_else(|| self.place_fallback(&candidate));
        debug!(
            "placed '{}' ({} / {}) on day {} at {} [{:?}]",
            candidate.title, candidate.persona, candidate.channel, placement.day, placement.at, placement.kind
        );
        self.record(&candidate, placement);
        placement
    }

    fn record(&mut self, candidate: &Candidate<'_>, placement: Placement) {
        self.persona_times
            .entry(candidate.persona.to_string())
            .or_default()
            .push(placement.at);
        self.channel_times
            .entry((placement.day, candidate.channel.to_string()))
            .or_default()
            .push(placement.at);
        self.day_load[placement.day] += 1;
    }
}
