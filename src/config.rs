use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::{ControllerOptions, Timing};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_auto_check")]
    pub auto_check: bool,
    /// Fixed shuffle seed. Unset means a fresh seed per run.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_narrate_examples")]
    pub narrate_examples: bool,
    /// Command that speaks its last argument, e.g. `espeak`.
    #[serde(default)]
    pub narrator_command: Option<String>,
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: u16,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_lessons_dir")]
    pub lessons_dir: String,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_advance_ms")]
    pub advance_ms: u64,
    #[serde(default = "default_celebrate_ms")]
    pub celebrate_ms: u64,
    #[serde(default = "default_shake_ms")]
    pub shake_ms: u64,
    #[serde(default = "default_rebuild_ms")]
    pub rebuild_ms: u64,
}

fn default_theme() -> String {
    "slate".to_string()
}
fn default_auto_check() -> bool {
    true
}
fn default_narrate_examples() -> bool {
    false
}
fn default_swipe_threshold() -> u16 {
    6
}
fn default_tick_rate_ms() -> u64 {
    50
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_lessons_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("grammr")
        .join("lessons")
        .to_string_lossy()
        .to_string()
}
fn default_advance_ms() -> u64 {
    250
}
fn default_celebrate_ms() -> u64 {
    1500
}
fn default_shake_ms() -> u64 {
    800
}
fn default_rebuild_ms() -> u64 {
    1200
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            advance_ms: default_advance_ms(),
            celebrate_ms: default_celebrate_ms(),
            shake_ms: default_shake_ms(),
            rebuild_ms: default_rebuild_ms(),
        }
    }
}

impl TimingConfig {
    pub fn timing(&self) -> Timing {
        Timing {
            advance: Duration::from_millis(self.advance_ms),
            celebrate: Duration::from_millis(self.celebrate_ms),
            shake: Duration::from_millis(self.shake_ms),
            rebuild: Duration::from_millis(self.rebuild_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            auto_check: default_auto_check(),
            seed: None,
            narrate_examples: default_narrate_examples(),
            narrator_command: None,
            swipe_threshold: default_swipe_threshold(),
            tick_rate_ms: default_tick_rate_ms(),
            log_level: default_log_level(),
            lessons_dir: default_lessons_dir(),
            timing: TimingConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("grammr")
            .join("config.toml")
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(10))
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            timing: self.timing.timing(),
            auto_check: self.auto_check,
        }
    }

    /// Validate `theme` against the available themes, resetting to default if unknown.
    pub fn normalize_theme(&mut self, valid_names: &[&str]) {
        if !valid_names.contains(&self.theme.as_str()) {
            self.theme = default_theme();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.theme, "slate");
        assert!(config.auto_check);
        assert_eq!(config.seed, None);
        assert_eq!(config.swipe_threshold, 6);
        assert_eq!(config.timing, TimingConfig::default());
        assert!(config.lessons_dir.contains("lessons"));
    }

    #[test]
    fn test_config_partial_timing_table() {
        let toml_str = r#"
theme = "paper"
seed = 7

[timing]
advance_ms = 400
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "paper");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.timing.advance_ms, 400);
        assert_eq!(config.timing.shake_ms, 800);

        let timing = config.controller_options().timing;
        assert_eq!(timing.advance, Duration::from_millis(400));
        assert_eq!(timing.rebuild, Duration::from_millis(1200));
    }

    #[test]
    fn test_default_timing_matches_session_defaults() {
        assert_eq!(TimingConfig::default().timing(), Timing::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.narrate_examples = true;
        config.narrator_command = Some("espeak".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.narrate_examples);
        assert_eq!(loaded.narrator_command.as_deref(), Some("espeak"));
        assert_eq!(loaded.timing, config.timing);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.theme, "slate");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "auto_check = \"sometimes\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_normalize_theme_unknown_resets() {
        let mut config = Config::default();
        config.theme = "neon".to_string();
        config.normalize_theme(&["slate", "paper"]);
        assert_eq!(config.theme, "slate");
    }

    #[test]
    fn test_normalize_theme_valid_unchanged() {
        let mut config = Config::default();
        config.theme = "paper".to_string();
        config.normalize_theme(&["slate", "paper"]);
        assert_eq!(config.theme, "paper");
    }
}
