//! Campaign planning integration tests
//!
//! Runs the full pipeline (capacity, batching, timing, comments) through the
//! public `CampaignPlanner` API.

use std::collections::{HashMap, HashSet};

use cadence::capacity::{CapacityConfig, LimitingFactor};
use cadence::domain::{CampaignInput, ContentItem, Roster};
use cadence::{CadenceError, CampaignPlan, CampaignPlanner, EngineConfig};
use chrono::{NaiveDate, NaiveDateTime};

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 4, 6)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn unit(dim: usize, hot: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[hot] = 1.0;
    v
}

fn full_safety() -> EngineConfig {
    EngineConfig {
        capacity: CapacityConfig {
            safety: 1.0,
            ..CapacityConfig::default()
        },
        ..EngineConfig::default()
    }
}

/// 3 personas, 2 channels, 10 items with unrelated embeddings.
fn ten_item_campaign() -> CampaignInput {
    let rows = [
        ("p1", "c1", 1),
        ("p1", "c2", 2),
        ("p1", "c1", 3),
        ("p1", "c2", 4),
        ("p2", "c1", 1),
        ("p2", "c2", 2),
        ("p2", "c1", 3),
        ("p3", "c2", 1),
        ("p3", "c1", 2),
        ("p3", "c2", 3),
    ];
    let items = rows
        .iter()
        .enumerate()
        .map(|(i, (persona, channel, position))| {
            ContentItem::new(persona, channel, &format!("{} post {}", persona, position), unit(10, i))
                .with_position(*position)
        })
        .collect();
    CampaignInput {
        roster: Roster::new(&["p1", "p2", "p3"], &["c1", "c2"], 4),
        items,
    }
}

fn plan(config: EngineConfig, input: &CampaignInput) -> CampaignPlan {
    CampaignPlanner::new(config).plan(input, start()).unwrap()
}

/// Integration test: capacity for 5 personas, 4 channels, target 20
#[test]
fn test_capacity_limited_by_channels() {
    let input = CampaignInput {
        roster: Roster::new(&["a", "b", "c", "d", "e"], &["w", "x", "y", "z"], 20),
        items: vec![],
    };
    let result = CampaignPlanner::default().capacity(&input).unwrap();

    assert_eq!(result.capacities.persona_capacity, 15);
    assert_eq!(result.capacities.channel_capacity, 8);
    assert_eq!(result.capacities.pair_capacity, 20);
    assert_eq!(result.capacities.raw_max, 8);
    assert_eq!(result.capacities.safe_max, 6);
    assert_eq!(result.capacities.limiting_factors, vec![LimitingFactor::ChannelCapacity]);
    assert_eq!(result.feasible_posts_per_week, 6);
    assert!(result.target_was_capped);
}

/// Integration test: ten items at four a week split 4, 4, 2
#[test]
fn test_ten_items_split_across_three_weeks() {
    let input = ten_item_campaign();
    let plan = plan(full_safety(), &input);

    assert_eq!(plan.capacity.feasible_posts_per_week, 4);
    let sizes: Vec<usize> = plan.weeks.iter().map(|w| w.items.len()).collect();
    assert_eq!(sizes, vec![4, 4, 2]);
    assert_eq!(plan.posts.len(), 10);
    assert_eq!(plan.comments.len(), 30);
    assert_eq!(plan.report.relaxed_picks, 0);
}

/// Integration test: every item appears exactly once
#[test]
fn test_items_are_conserved() {
    let input = ten_item_campaign();
    let plan = plan(full_safety(), &input);

    let mut scheduled: Vec<&str> = plan
        .weeks
        .iter()
        .flat_map(|w| w.items.iter().map(|s| s.item.title.as_str()))
        .collect();
    let mut expected: Vec<&str> = input.items.iter().map(|i| i.title.as_str()).collect();
    scheduled.sort();
    expected.sort();
    assert_eq!(scheduled, expected);
    assert_eq!(plan.report.total_items, plan.report.scheduled_items);
}

/// Integration test: weekly caps hold and the pair cap is never relaxed
#[test]
fn test_weekly_caps_hold() {
    let config = full_safety();
    let plan = plan(config, &ten_item_campaign());
    let persona_cap = config.capacity.per_persona + config.batching.relax_step;
    let channel_cap = config.capacity.per_channel + config.batching.relax_step;

    for week in &plan.weeks {
        let mut personas: HashMap<&str, u32> = HashMap::new();
        let mut channels: HashMap<&str, u32> = HashMap::new();
        let mut pairs: HashMap<(&str, &str), u32> = HashMap::new();
        for s in &week.items {
            *personas.entry(s.item.persona.as_str()).or_default() += 1;
            *channels.entry(s.item.channel.as_str()).or_default() += 1;
            *pairs.entry((s.item.persona.as_str(), s.item.channel.as_str())).or_default() += 1;
        }
        assert!(personas.values().all(|n| *n <= persona_cap));
        assert!(channels.values().all(|n| *n <= channel_cap));
        assert!(pairs.values().all(|n| *n <= config.capacity.per_pair));
        assert!(week.items.len() <= plan.capacity.feasible_posts_per_week);
    }
}

/// Integration test: near-duplicates on one channel never share a week
#[test]
fn test_near_duplicate_deferred_to_next_week() {
    let input = CampaignInput {
        roster: Roster::new(&["p1", "p2", "p3"], &["c1"], 2),
        items: vec![
            ContentItem::new("p1", "c1", "a", vec![1.0, 0.0, 0.0]),
            ContentItem::new("p2", "c1", "b", vec![0.99, 0.141, 0.0]),
            ContentItem::new("p3", "c1", "c", vec![0.0, 0.0, 1.0]),
        ],
    };
    let plan = plan(full_safety(), &input);

    let titles = |week: usize| -> HashSet<&str> {
        plan.weeks[week]
            .items
            .iter()
            .map(|s| s.item.title.as_str())
            .collect()
    };
    assert_eq!(plan.weeks.len(), 2);
    assert_eq!(titles(0), HashSet::from(["a", "c"]));
    assert_eq!(titles(1), HashSet::from(["b"]));
}

/// Integration test: identical input yields a byte-identical plan
#[test]
fn test_plan_is_deterministic() {
    let input = ten_item_campaign();
    let first = serde_json::to_string(&plan(full_safety(), &input)).unwrap();
    let second = serde_json::to_string(&plan(full_safety(), &input)).unwrap();
    assert_eq!(first, second);
}

/// Integration test: the fingerprint tracks the input and start instant
#[test]
fn test_fingerprint_changes_with_start() {
    let input = ten_item_campaign();
    let planner = CampaignPlanner::new(full_safety());
    let a = planner.plan(&input, start()).unwrap();
    let b = planner
        .plan(&input, start() + chrono::Duration::days(1))
        .unwrap();
    assert_eq!(a.fingerprint.len(), 16);
    assert_ne!(a.fingerprint, b.fingerprint);
}

/// Integration test: post table is time ordered with sequential ids
#[test]
fn test_post_table_ordering() {
    let plan = plan(full_safety(), &ten_item_campaign());

    assert!(plan.posts.windows(2).all(|w| w[0].scheduled_at <= w[1].scheduled_at));
    for (i, post) in plan.posts.iter().enumerate() {
        assert_eq!(post.post_id, format!("P{}", i + 1));
    }
    for week in &plan.weeks {
        for s in &week.items {
            assert!(s.scheduled_at.date() >= week.week_start.date());
            assert_eq!(s.week_start, week.week_start);
        }
    }
}

/// Integration test: comment threads are well formed
#[test]
fn test_comment_threads_are_well_formed() {
    let plan = plan(full_safety(), &ten_item_campaign());
    let posts: HashMap<&str, _> = plan.posts.iter().map(|p| (p.post_id.as_str(), p)).collect();
    let by_id: HashMap<&str, _> = plan.comments.iter().map(|c| (c.comment_id.as_str(), c)).collect();

    assert_eq!(by_id.len(), plan.comments.len());
    for (i, comment) in plan.comments.iter().enumerate() {
        assert_eq!(comment.comment_id, format!("C{}", i + 1));

        let post = posts[comment.post_id.as_str()];
        assert_ne!(comment.username, post.persona);
        assert!(comment.timestamp > post.scheduled_at);
        assert_eq!(comment.channel, post.channel);

        if let Some(parent_id) = &comment.parent_comment_id {
            let parent = by_id[parent_id.as_str()];
            assert_eq!(parent.post_id, comment.post_id);
            assert!(parent.timestamp < comment.timestamp);
        }
    }

    let view = plan.threads();
    assert_eq!(view.counts.posts, 10);
    assert_eq!(view.counts.comments, 30);
    for thread in &view.posts {
        assert_eq!(thread.comments.len(), 3);
        let commenters: HashSet<&str> = thread.comments.iter().map(|c| c.username.as_str()).collect();
        // three personas leave two eligible commenters per post
        assert_eq!(commenters.len(), 2);
    }
}

/// Integration test: invalid inputs fail before any stage runs
#[test]
fn test_invalid_inputs_are_rejected() {
    let planner = CampaignPlanner::default();

    let one_persona = CampaignInput {
        roster: Roster::new(&["p1"], &["c1"], 3),
        items: vec![ContentItem::new("p1", "c1", "t", vec![1.0])],
    };
    assert!(matches!(
        planner.plan(&one_persona, start()),
        Err(CadenceError::Configuration(_))
    ));

    let zero_target = CampaignInput {
        roster: Roster::new(&["p1", "p2"], &["c1"], 0),
        items: vec![ContentItem::new("p1", "c1", "t", vec![1.0])],
    };
    assert!(matches!(
        planner.plan(&zero_target, start()),
        Err(CadenceError::Configuration(_))
    ));

    let empty_pool = CampaignInput {
        roster: Roster::new(&["p1", "p2"], &["c1"], 3),
        items: vec![],
    };
    assert!(matches!(planner.plan(&empty_pool, start()), Err(CadenceError::Data(_))));

    let ragged = CampaignInput {
        roster: Roster::new(&["p1", "p2"], &["c1"], 3),
        items: vec![
            ContentItem::new("p1", "c1", "one", vec![1.0, 0.0]),
            ContentItem::new("p2", "c1", "two", vec![1.0]),
        ],
    };
    assert!(matches!(planner.plan(&ragged, start()), Err(CadenceError::Data(_))));
}

/// Integration test: a roster too small to post anything halts
#[test]
fn test_zero_capacity_is_degenerate() {
    let config = EngineConfig {
        capacity: CapacityConfig {
            safety: 0.4,
            ..CapacityConfig::default()
        },
        ..EngineConfig::default()
    };
    let input = CampaignInput {
        roster: Roster::new(&["p1", "p2"], &["c1"], 2),
        items: vec![ContentItem::new("p1", "c1", "t", vec![1.0])],
    };
    let err = CampaignPlanner::new(config).plan(&input, start()).unwrap_err();
    match err {
        CadenceError::DegenerateScheduling { week, placed, remaining } => {
            assert_eq!(week, 1);
            assert_eq!(placed, 0);
            assert_eq!(remaining, 1);
        }
        other => panic!("unexpected error: {}", other),
    }
}

/// Integration test: input JSON with only required item fields parses
#[test]
fn test_input_json_parses() {
    let json = r#"{
        "personas": ["p1", "p2"],
        "channels": ["c1"],
        "target_posts_per_week": 2,
        "items": [
            {"persona": "p1", "channel": "c1", "title": "one", "embedding": [1.0, 0.0]},
            {"persona": "p2", "channel": "c1", "title": "two", "embedding": [0.0, 1.0], "cluster_id": "k"}
        ]
    }"#;
    let input: CampaignInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.roster.target_posts_per_week, 2);
    assert_eq!(input.items[1].cluster_id.as_deref(), Some("k"));

    let plan = CampaignPlanner::default().plan(&input, start()).unwrap();
    assert_eq!(plan.report.scheduled_items, 2);
}
