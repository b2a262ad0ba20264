use cadence::EngineConfig;
use cadence::capacity::CapacityConfig;
use cadence::scheduler::{BatchConfig, SchedulingConfig};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub capacity: CapacityConfig,
    pub batching: BatchConfig,
    pub scheduling: SchedulingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Emit posts with nested comments instead of flat tables
    pub nested: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            nested: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            capacity: CapacityConfig::default(),
            batching: BatchConfig::default(),
            scheduling: SchedulingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Engine tunables carried by this config
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            capacity: self.capacity,
            batching: self.batching,
            scheduling: self.scheduling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level.as_deref(), Some("info"));
        assert_eq!(config.capacity.per_persona, 3);
        assert!(config.output.pretty);
        assert!(!config.output.nested);
    }

    #[test]
    fn test_load_partial_yaml_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "capacity:\n  safety: 0.5\noutput:\n  nested: true").unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.capacity.safety, 0.5);
        assert_eq!(config.capacity.per_channel, 2);
        assert!(config.output.nested);
        assert!(config.output.pretty);
        assert_eq!(config.scheduling, SchedulingConfig::default());
    }

    #[test]
    fn test_engine_config_mirrors_sections() {
        let mut config = Config::default();
        config.batching.similarity_threshold = 0.9;
        config.scheduling.fallback_max_steps = 4;

        let engine = config.engine();
        assert_eq!(engine.batching.similarity_threshold, 0.9);
        assert_eq!(engine.scheduling.fallback_max_steps, 4);
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "capacity: [not, a, map]").unwrap();
        assert!(Config::load(Some(&file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let path = PathBuf::from("/nonexistent/cadence.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
