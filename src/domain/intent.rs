//! Content intent and channel vibe classification
//!
//! Both are cheap keyword heuristics used only to bias pacing: which items are
//! placed first and whether they lean toward earlier or later clock windows.

use serde::{Deserialize, Serialize};

/// What a post is trying to do, inferred from its title and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Question,
    Recommendation,
    Workflow,
    General,
    Alternatives,
    Compare,
}

impl Intent {
    /// Infer intent from title and optional body.
    ///
    /// First match wins: compare, alternatives, recommendation, workflow,
    /// then a literal `?` in the title marks a question.
    pub fn infer(title: &str, body: Option<&str>) -> Self {
        let text = format!(
            "{} {}",
            title.to_lowercase(),
            body.map(str::to_lowercase).unwrap_or_default()
        );
        let has_any = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

        if has_any(&[" vs ", " versus ", "compare", "comparison"]) {
            Intent::Compare
        } else if has_any(&["alternative"]) {
            Intent::Alternatives
        } else if has_any(&["best", "recommend"]) {
            Intent::Recommendation
        } else if has_any(&["how to", "workflow", "automate", "automation", "faster"]) {
            Intent::Workflow
        } else if title.contains('?') {
            Intent::Question
        } else {
            Intent::General
        }
    }

    /// Placement order: help-seeking content is processed first.
    pub fn priority(self) -> u8 {
        match self {
            Intent::Question => 0,
            Intent::Recommendation => 1,
            Intent::Workflow => 2,
            Intent::General => 3,
            Intent::Alternatives => 4,
            Intent::Compare => 5,
        }
    }

    pub fn is_help_seeking(self) -> bool {
        matches!(self, Intent::Question | Intent::Workflow | Intent::Recommendation)
    }
}

/// Audience flavor of a channel, inferred from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
    Work,
    Tech,
    General,
}

const WORK_MARKERS: &[&str] = &[
    "powerpoint",
    "slides",
    "presentation",
    "consult",
    "startup",
    "productivity",
    "design",
];

const TECH_MARKERS: &[&str] = &["ai", "claude", "ml", "gpt", "llm", "tech"];

impl Vibe {
    pub fn of_channel(channel: &str) -> Self {
        let name = channel.to_lowercase();
        if WORK_MARKERS.iter().any(|m| name.contains(m)) {
            Vibe::Work
        } else if TECH_MARKERS.iter().any(|m| name.contains(m)) {
            Vibe::Tech
        } else {
            Vibe::General
        }
    }
}
