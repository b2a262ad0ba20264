//! Weekly capacity planning.
//!
//! Converts roster sizes and a weekly target into a feasible posts-per-week
//! ceiling:
//! - persona capacity = personas × per-persona cap
//! - channel capacity = channels × per-channel cap
//! - pair capacity = personas × channels × per-pair cap
//!
//! The smallest of the three bounds the week; a safety fraction keeps the
//! batch selector from having to hit that bound exactly.

use serde::{Deserialize, Serialize};

use crate::error::{CadenceError, Result};

/// Default max posts per persona per week.
pub const DEFAULT_PER_PERSONA: u32 = 3;
/// Default max posts per channel per week.
pub const DEFAULT_PER_CHANNEL: u32 = 2;
/// Default max posts per persona/channel pair per week.
pub const DEFAULT_PER_PAIR: u32 = 1;
/// Default fraction of the raw ceiling actually scheduled.
pub const DEFAULT_SAFETY: f64 = 0.8;

/// Per-unit weekly caps and the safety fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    pub per_persona: u32,
    pub per_channel: u32,
    pub per_pair: u32,
    pub safety: f64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            per_persona: DEFAULT_PER_PERSONA,
            per_channel: DEFAULT_PER_CHANNEL,
            per_pair: DEFAULT_PER_PAIR,
            safety: DEFAULT_SAFETY,
        }
    }
}

/// Which capacity bound limits the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitingFactor {
    PersonaCapacity,
    ChannelCapacity,
    PairCapacity,
}

impl LimitingFactor {
    pub fn as_str(self) -> &'static str {
        match self {
            LimitingFactor::PersonaCapacity => "persona_capacity",
            LimitingFactor::ChannelCapacity => "channel_capacity",
            LimitingFactor::PairCapacity => "pair_capacity",
        }
    }
}

impl std::fmt::Display for LimitingFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityInputs {
    pub personas: usize,
    pub channels: usize,
    pub per_persona: u32,
    pub per_channel: u32,
    pub per_pair: u32,
    pub safety: f64,
    pub target_posts_per_week: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacities {
    pub persona_capacity: u64,
    pub channel_capacity: u64,
    pub pair_capacity: u64,
    pub raw_max: u64,
    pub safe_max: u64,
    pub limiting_factors: Vec<LimitingFactor>,
}

/// Outcome of capacity planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityResult {
    pub inputs: CapacityInputs,
    pub capacities: Capacities,
    pub feasible_posts_per_week: usize,
    pub target_was_capped: bool,
}

/// Compute the feasible weekly volume for a roster.
///
/// Fails with a configuration error when there are no personas, no channels,
/// a non-positive target, or a safety fraction outside (0, 1].
pub fn plan_capacity(
    personas: usize,
    channels: usize,
    target_posts_per_week: i64,
    config: &CapacityConfig,
) -> Result<CapacityResult> {
    if personas == 0 {
        return Err(CadenceError::Configuration("roster has no personas".to_string()));
    }
    if channels == 0 {
        return Err(CadenceError::Configuration("roster has no channels".to_string()));
    }
    if target_posts_per_week <= 0 {
        return Err(CadenceError::Configuration(format!(
            "target_posts_per_week must be positive, got {}",
            target_posts_per_week
        )));
    }
    if !(config.safety > 0.0 && config.safety <= 1.0) {
        return Err(CadenceError::Configuration(format!(
            "safety fraction must be in (0, 1], got {}",
            config.safety
        )));
    }

    let p = personas as u64;
    let s = channels as u64;
    let persona_capacity = p * u64::from(config.per_persona);
    let channel_capacity = s * u64::from(config.per_channel);
    let pair_capacity = p * s * u64::from(config.per_pair);

    let raw_max = persona_capacity.min(channel_capacity).min(pair_capacity);
    let safe_max = (raw_max as f64 * config.safety).floor() as u64;

    let limiting_factors = [
        (LimitingFactor::PersonaCapacity, persona_capacity),
        (LimitingFactor::ChannelCapacity, channel_capacity),
        (LimitingFactor::PairCapacity, pair_capacity),
    ]
    .into_iter()
    .filter(|(_, capacity)| *capacity == raw_max)
    .map(|(factor, _)| factor)
    .collect();

    // target is positive here
    let target = target_posts_per_week as u64;
    let feasible = target.min(safe_max) as usize;

    Ok(CapacityResult {
        inputs: CapacityInputs {
            personas,
            channels,
            per_persona: config.per_persona,
            per_channel: config.per_channel,
            per_pair: config.per_pair,
            safety: config.safety,
            target_posts_per_week,
        },
        capacities: Capacities {
            persona_capacity,
            channel_capacity,
            pair_capacity,
            raw_max,
            safe_max,
            limiting_factors,
        },
        feasible_posts_per_week: feasible,
        target_was_capped: target > safe_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_limited_roster() {
        let result = plan_capacity(5, 4, 20, &CapacityConfig::default()).unwrap();

        assert_eq!(result.capacities.persona_capacity, 15);
        assert_eq!(result.capacities.channel_capacity, 8);
        assert_eq!(result.capacities.pair_capacity, 20);
        assert_eq!(result.capacities.raw_max, 8);
        assert_eq!(result.capacities.limiting_factors, vec![LimitingFactor::ChannelCapacity]);
        assert_eq!(result.capacities.safe_max, 6);
        assert_eq!(result.feasible_posts_per_week, 6);
        assert!(result.target_was_capped);
    }

    #[test]
    fn test_target_below_ceiling_is_not_capped() {
        let result = plan_capacity(5, 4, 4, &CapacityConfig::default()).unwrap();
        assert_eq!(result.feasible_posts_per_week, 4);
        assert!(!result.target_was_capped);
    }

    #[test]
    fn test_target_equal_to_safe_max_is_not_capped() {
        let result = plan_capacity(5, 4, 6, &CapacityConfig::default()).unwrap();
        assert_eq!(result.feasible_posts_per_week, 6);
        assert!(!result.target_was_capped);
    }

    #[test]
    fn test_multiple_limiting_factors() {
        // 2 personas x 3 = 6, 3 channels x 2 = 6, pairs 2 x 3 x 1 = 6
        let result = plan_capacity(2, 3, 10, &CapacityConfig::default()).unwrap();
        assert_eq!(result.capacities.raw_max, 6);
        assert_eq!(
            result.capacities.limiting_factors,
            vec![
                LimitingFactor::PersonaCapacity,
                LimitingFactor::ChannelCapacity,
                LimitingFactor::PairCapacity,
            ]
        );
    }

    #[test]
    fn test_pair_limited_roster() {
        let config = CapacityConfig {
            per_persona: 10,
            per_channel: 10,
            per_pair: 1,
            safety: 1.0,
        };
        let result = plan_capacity(2, 2, 10, &config).unwrap();
        assert_eq!(result.capacities.raw_max, 4);
        assert_eq!(result.capacities.limiting_factors, vec![LimitingFactor::PairCapacity]);
        assert_eq!(result.feasible_posts_per_week, 4);
    }

    #[test]
    fn test_empty_personas_is_configuration_error() {
        let err = plan_capacity(0, 4, 20, &CapacityConfig::default()).unwrap_err();
        assert!(matches!(err, CadenceError::Configuration(_)));
    }

    #[test]
    fn test_empty_channels_is_configuration_error() {
        let err = plan_capacity(3, 0, 20, &CapacityConfig::default()).unwrap_err();
        assert!(matches!(err, CadenceError::Configuration(_)));
    }

    #[test]
    fn test_negative_target_is_configuration_error() {
        let err = plan_capacity(3, 2, -1, &CapacityConfig::default()).unwrap_err();
        assert!(matches!(err, CadenceError::Configuration(_)));
    }

    #[test]
    fn test_zero_target_is_configuration_error() {
        let err = plan_capacity(3, 2, 0, &CapacityConfig::default()).unwrap_err();
        assert!(matches!(err, CadenceError::Configuration(_)));
    }

    #[test]
    fn test_bad_safety_is_configuration_error() {
        let config = CapacityConfig {
            safety: 1.5,
            ..CapacityConfig::default()
        };
        assert!(plan_capacity(3, 2, 4, &config).is_err());
    }

    #[test]
    fn test_limiting_factor_serializes_snake_case() {
        let json = serde_json::to_string(&LimitingFactor::ChannelCapacity).unwrap();
        assert_eq!(json, "\"channel_capacity\"");
        assert_eq!(LimitingFactor::PairCapacity.to_string(), "pair_capacity");
    }
}
