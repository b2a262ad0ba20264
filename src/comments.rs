//! Comment thread planning.
//!
//! Flattens the scheduled weeks into one time-ordered post table (`P1..Pn`) and
//! attaches exactly three comments to each post. Commenters, offsets, and the
//! reply shape are all derived from a per-post seed, so the plan is a pure
//! function of the schedule and the roster.

use chrono::{Duration, NaiveDateTime};
use log::info;
use serde::{Deserialize, Serialize};

use crate::domain::{Comment, PostRow, Roster, ScheduledItem, ScheduledWeek};
use crate::error::{CadenceError, Result};
use crate::seed::{stable_hash, stable_pick};

pub const COMMENTS_PER_POST: usize = 3;

/// Offset step between commenter picks.
const PICK_STRIDE: u64 = 7;
/// Offset step used to fill slots once distinct commenters run out.
const FILL_STRIDE: u64 = 11;

/// First comment lands 12..=45 minutes after the post.
const FIRST_DELAY_MIN: i64 = 12;
const FIRST_DELAY_SPAN: u64 = 34;
/// Later comments land 8..=35 minutes after the previous one.
const NEXT_DELAY_MIN: i64 = 8;
const NEXT_DELAY_SPAN: u64 = 28;

/// Reply topology of a three-comment thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadShape {
    /// C1 top-level, C2 replies to C1, C3 top-level
    SecondRepliesToFirst,
    /// Three top-level comments
    Flat,
    /// C1 and C2 top-level, C3 replies to C1
    ThirdRepliesToFirst,
}

impl ThreadShape {
    pub fn from_seed(seed: &str) -> Self {
        match stable_pick(&format!("{}|structure", seed), 3) {
            0 => ThreadShape::SecondRepliesToFirst,
            1 => ThreadShape::Flat,
            _ => ThreadShape::ThirdRepliesToFirst,
        }
    }

    /// Parent slot for each of the three comments.
    pub fn parents(self) -> [Option<usize>; COMMENTS_PER_POST] {
        match self {
            ThreadShape::SecondRepliesToFirst => [None, Some(0), None],
            ThreadShape::Flat => [None, None, None],
            ThreadShape::ThirdRepliesToFirst => [None, None, Some(0)],
        }
    }
}

/// The post table and its comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPlan {
    pub posts: Vec<PostRow>,
    pub comments: Vec<Comment>,
}

/// Flatten weeks into one list ordered by `scheduled_at`.
pub fn flatten_schedule(weeks: &[ScheduledWeek]) -> Vec<&ScheduledItem> {
    let mut flat: Vec<&ScheduledItem> = weeks.iter().flat_map(|w| w.items.iter()).collect();
    flat.sort_by_key(|s| s.scheduled_at);
    flat
}

/// Pick three commenters for a post, never the author.
///
/// Distinct picks come from a rotating offset with stride 7; if the pool has
/// fewer than three members the remaining slots cycle it with stride 11.
pub fn pick_commenters(personas: &[&str], author: &str, seed: &str) -> Result<Vec<String>> {
    let pool: Vec<&str> = personas.iter().copied().filter(|p| *p != author).collect();
    if pool.is_empty() {
        return Err(CadenceError::Data(format!(
            "no personas other than '{}' available for commenting",
            author
        )));
    }

    let len = pool.len() as u64;
    let h = stable_hash(seed);
    let mut picked: Vec<String> = Vec::with_capacity(COMMENTS_PER_POST);

    for slot in 0..COMMENTS_PER_POST.min(pool.len()) {
        let idx = (h + slot as u64 * PICK_STRIDE) % len;
        let persona = pool[idx as usize];
        if !picked.iter().any(|p| p == persona) {
            picked.push(persona.to_string());
        }
    }
    while picked.len() < COMMENTS_PER_POST {
        let idx = (h + picked.len() as u64 * FILL_STRIDE) % len;
        picked.push(pool[idx as usize].to_string());
    }

    Ok(picked)
}

/// Comment timestamps, each strictly after the one before.
pub fn comment_times(post_time: NaiveDateTime, seed: &str) -> [NaiveDateTime; COMMENTS_PER_POST] {
    let first = FIRST_DELAY_MIN + stable_pick(seed, FIRST_DELAY_SPAN) as i64;
    let mut times = [post_time + Duration::minutes(first); COMMENTS_PER_POST];
    for i in 1..COMMENTS_PER_POST {
        let delay = NEXT_DELAY_MIN + stable_pick(&format!("{}|{}", seed, i), NEXT_DELAY_SPAN) as i64;
        times[i] = times[i - 1] + Duration::minutes(delay);
    }
    times
}

#[derive(Debug, Clone, Default)]
pub struct CommentThreadPlanner;

impl CommentThreadPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Build the post table and three comments per post.
    ///
    /// Comment ids increment across the whole campaign, in post order.
    pub fn plan(&self, weeks: &[ScheduledWeek], roster: &Roster) -> Result<CommentPlan> {
        let personas = roster.unique_personas();
        if personas.len() < 2 {
            return Err(CadenceError::Configuration(format!(
                "need at least 2 personas to write comments, roster has {}",
                personas.len()
            )));
        }

        let flat = flatten_schedule(weeks);
        let mut posts = Vec::with_capacity(flat.len());
        let mut comments = Vec::with_capacity(flat.len() * COMMENTS_PER_POST);
        let mut next_comment = 1usize;

        for (i, scheduled) in flat.into_iter().enumerate() {
            let item = &scheduled.item;
            let post_id = format!("P{}", i + 1);
            let seed = format!("{}|{}|{}|{}", post_id, item.persona, item.channel, item.title);

            let commenters = pick_commenters(&personas, &item.persona, &seed)?;
            let times = comment_times(scheduled.scheduled_at, &seed);
            let parents = ThreadShape::from_seed(&seed).parents();

            let ids: Vec<String> = (0..COMMENTS_PER_POST)
                .map(|k| format!("C{}", next_comment + k))
                .collect();
            next_comment += COMMENTS_PER_POST;

            for k in 0..COMMENTS_PER_POST {
                comments.push(Comment {
                    comment_id: ids[k].clone(),
                    post_id: post_id.clone(),
                    parent_comment_id: parents[k].map(|p| ids[p].clone()),
                    username: commenters[k].clone(),
                    timestamp: times[k],
                    title: item.title.clone(),
                    channel: item.channel.clone(),
                });
            }

            posts.push(PostRow {
                post_id,
                persona: item.persona.clone(),
                channel: item.channel.clone(),
                title: item.title.clone(),
                body: item.body.clone(),
                keyword_ids: item.keyword_ids.clone(),
                scheduled_at: scheduled.scheduled_at,
            });
        }

        info!("planned {} comments for {} posts", comments.len(), posts.len());
        Ok(CommentPlan { posts, comments })
    }
}
