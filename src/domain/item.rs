//! Content items and the roster they are scheduled against

use serde::{Deserialize, Serialize};

/// A pre-generated post, attributed to a persona and routed to a channel.
///
/// The scheduler never mutates items; the embedding and cluster id come from
/// an upstream similarity step and are only compared, never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Author persona id
    pub persona: String,

    /// Destination channel id
    pub channel: String,

    pub title: String,

    #[serde(default)]
    pub body: Option<String>,

    /// Semantic cluster label from the upstream clustering step
    #[serde(default)]
    pub cluster_id: Option<String>,

    #[serde(default)]
    pub keyword_ids: Vec<String>,

    /// 1-based position in the persona's content arc
    #[serde(default)]
    pub position: Option<u32>,

    /// Cosine-normalized embedding, fixed length across the pool
    pub embedding: Vec<f32>,
}

impl ContentItem {
    /// Create an item with only the fields the scheduler requires.
    pub fn new(persona: &str, channel: &str, title: &str, embedding: Vec<f32>) -> Self {
        Self {
            persona: persona.to_string(),
            channel: channel.to_string(),
            title: title.to_string(),
            body: None,
            cluster_id: None,
            keyword_ids: vec![],
            position: None,
            embedding,
        }
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn with_cluster(mut self, cluster_id: &str) -> Self {
        self.cluster_id = Some(cluster_id.to_string());
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_keywords(mut self, keyword_ids: &[&str]) -> Self {
        self.keyword_ids = keyword_ids.iter().map(|k| k.to_string()).collect();
        self
    }
}

/// Personas and channels in play, plus the requested weekly volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub personas: Vec<String>,
    pub channels: Vec<String>,
    pub target_posts_per_week: i64,
}

impl Roster {
    pub fn new(personas: &[&str], channels: &[&str], target_posts_per_week: i64) -> Self {
        Self {
            personas: personas.iter().map(|p| p.to_string()).collect(),
            channels: channels.iter().map(|c| c.to_string()).collect(),
            target_posts_per_week,
        }
    }

    /// Persona ids with duplicates removed, first occurrence wins.
    pub fn unique_personas(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.personas.len());
        for persona in &self.personas {
            if !seen.contains(&persona.as_str()) {
                seen.push(persona);
            }
        }
        seen
    }

    /// Channel ids with duplicates removed, first occurrence wins.
    pub fn unique_channels(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            if !seen.contains(&channel.as_str()) {
                seen.push(channel);
            }
        }
        seen
    }
}

/// Everything one planning run consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignInput {
    #[serde(flatten)]
    pub roster: Roster,
    pub items: Vec<ContentItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_item_builders() {
        let item = ContentItem::new("alice", "r/slides", "Best deck tool?", vec![1.0, 0.0])
            .with_body("Looking for ideas")
            .with_cluster("c1")
            .with_position(2)
            .with_keywords(&["K1", "K4"]);

        assert_eq!(item.persona, "alice");
        assert_eq!(item.body.as_deref(), Some("Looking for ideas"));
        assert_eq!(item.cluster_id.as_deref(), Some("c1"));
        assert_eq!(item.position, Some(2));
        assert_eq!(item.keyword_ids, vec!["K1", "K4"]);
    }

    #[test]
    fn test_roster_unique_personas_preserves_order() {
        let roster = Roster::new(&["bob", "alice", "bob", "carol"], &["r/a", "r/a"], 3);
        assert_eq!(roster.unique_personas(), vec!["bob", "alice", "carol"]);
        assert_eq!(roster.unique_channels(), vec!["r/a"]);
    }

    #[test]
    fn test_campaign_input_from_json_defaults_optional_fields() {
        let json = r#"{
            "personas": ["alice", "bob"],
            "channels": ["r/tools"],
            "target_posts_per_week": 2,
            "items": [
                {"persona": "alice", "channel": "r/tools", "title": "Hello", "embedding": [1.0, 0.0]}
            ]
        }"#;

        let input: CampaignInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.roster.personas.len(), 2);
        assert_eq!(input.items.len(), 1);
        assert!(input.items[0].body.is_none());
        assert!(input.items[0].keyword_ids.is_empty());
        assert!(input.items[0].position.is_none());
    }
}
