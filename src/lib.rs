//! Cadence - A deterministic campaign scheduling engine
//!
//! Cadence turns a fixed pool of persona-authored content into a multi-week
//! posting plan: how many posts a roster can carry per week, which items go
//! in which week, the exact minute each one publishes, and a short seeded
//! comment thread under every post. Identical input always yields an
//! identical plan.

pub mod capacity;
pub mod comments;
pub mod domain;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod seed;

pub use engine::{CampaignPlan, CampaignPlanner, EngineConfig, PlanReport};
pub use error::{CadenceError, Result};
