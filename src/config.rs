//! Game tuning, loaded from JSON
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::levels::LevelSet;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "INVADERS_CONFIG";
/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "invaders.json";
/// Shortest allowed timer interval in seconds
pub const MIN_INTERVAL_SECS: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Session ===
    pub initial_lives: u32,

    // === Formation ===
    /// Sideways speed on level 0, in units per second
    pub base_speed: f32,
    /// Added every `step_time` seconds while a level is played
    pub speed_step: f32,
    /// Added per level number on top of `base_speed`
    pub level_speed_step: f32,
    pub step_time: f32,

    // === Player & projectiles ===
    pub player_speed: f32,
    pub bullet_speed: f32,

    // === Enemy fire ===
    /// Delay range before an enemy's first shot after it becomes a shooter
    pub min_cadence: f32,
    pub max_cadence: f32,

    // === Defenses ===
    pub defense_health: i32,
    pub defense_count: usize,

    /// How long a dead enemy stays around for its explosion
    pub death_effect_secs: f32,

    // === Layout ===
    /// Position of the top-left grid cell
    pub left_corner: Vec2,
    /// Distance between neighbouring cells
    pub spacing: Vec2,
    pub player_start: Vec2,

    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
    /// Replaces the built-in levels
    pub levels: Option<Vec<Vec<Vec<u8>>>>,

    // === Audio ===
    /// Sound effect volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub music_volume: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_lives: 3,

            base_speed: 1.0,
            speed_step: 0.05,
            level_speed_step: 0.25,
            step_time: 10.0,

            player_speed: 8.0,
            bullet_speed: 15.0,

            min_cadence: 2.0,
            max_cadence: 8.0,

            defense_health: 2,
            defense_count: 4,

            death_effect_secs: 0.6,

            left_corner: Vec2::new(-9.0, 14.0),
            spacing: Vec2::new(3.0, 2.0),
            player_start: Vec2::new(0.0, -12.0),

            seed: None,
            levels: None,

            sfx_volume: 0.5,
            music_volume: 0.3,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).wrap_err("invalid config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&json).wrap_err_with(|| format!("failed to load {}", path.display()))
    }

    /// `$INVADERS_CONFIG` if set, else `invaders.json` if it exists, else defaults
    pub fn load_or_default() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            info!(path = %path, "loading config from {}", CONFIG_ENV);
            return Self::load(path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            info!(path = DEFAULT_CONFIG_FILE, "loading config");
            return Self::load(DEFAULT_CONFIG_FILE);
        }

        info!("no config file, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_lives == 0 {
            bail!("initial_lives must be at least 1");
        }

        let floats = [
            ("base_speed", self.base_speed),
            ("speed_step", self.speed_step),
            ("level_speed_step", self.level_speed_step),
            ("step_time", self.step_time),
            ("player_speed", self.player_speed),
            ("bullet_speed", self.bullet_speed),
            ("min_cadence", self.min_cadence),
            ("max_cadence", self.max_cadence),
            ("death_effect_secs", self.death_effect_secs),
            ("sfx_volume", self.sfx_volume),
            ("music_volume", self.music_volume),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                bail!("{} must be a finite number, got {}", name, value);
            }
        }
        for (name, point) in [
            ("left_corner", self.left_corner),
            ("spacing", self.spacing),
            ("player_start", self.player_start),
        ] {
            if !point.is_finite() {
                bail!("{} must be finite, got {}", name, point);
            }
        }

        for (name, value) in [
            ("base_speed", self.base_speed),
            ("player_speed", self.player_speed),
            ("bullet_speed", self.bullet_speed),
        ] {
            if value <= 0.0 {
                bail!("{} must be positive, got {}", name, value);
            }
        }

        // Timers on the game clock can't tick faster than this
        for (name, value) in [
            ("step_time", self.step_time),
            ("min_cadence", self.min_cadence),
            ("death_effect_secs", self.death_effect_secs),
        ] {
            if value < MIN_INTERVAL_SECS {
                bail!(
                    "{} must be at least {}s, got {}",
                    name,
                    MIN_INTERVAL_SECS,
                    value
                );
            }
        }

        if self.speed_step < 0.0 || self.level_speed_step < 0.0 {
            bail!("speed steps must not be negative");
        }
        if self.min_cadence > self.max_cadence {
            bail!(
                "min_cadence ({}) is greater than max_cadence ({})",
                self.min_cadence,
                self.max_cadence
            );
        }
        if self.defense_health < 0 {
            bail!("defense_health must not be negative");
        }
        if !(0.0..=1.0).contains(&self.sfx_volume) || !(0.0..=1.0).contains(&self.music_volume) {
            bail!("volumes must be within 0.0 - 1.0");
        }

        self.level_set().map(|_| ())
    }

    /// The configured levels, or the built-in ones
    pub fn level_set(&self) -> Result<LevelSet> {
        match &self.levels {
            Some(grids) => LevelSet::from_grids(grids).wrap_err("invalid custom levels"),
            None => Ok(LevelSet::builtin()),
        }
    }

    /// World position of a grid cell
    pub fn cell_position(&self, row: usize, col: usize) -> Vec2 {
        self.left_corner + Vec2::new(self.spacing.x * col as f32, -self.spacing.y * row as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_lives, 3);
        assert_eq!(config.level_set().unwrap().len(), 5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json_str(r#"{ "initial_lives": 5, "seed": 42 }"#).unwrap();
        assert_eq!(config.initial_lives, 5);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.step_time, 10.0);
    }

    #[test]
    fn test_vec_fields_parse_from_arrays() {
        let config = GameConfig::from_json_str(r#"{ "spacing": [2.0, 1.5] }"#).unwrap();
        assert_eq!(config.spacing, Vec2::new(2.0, 1.5));
    }

    #[test]
    fn test_cadence_range_is_checked() {
        let result = GameConfig::from_json_str(r#"{ "min_cadence": 5.0, "max_cadence": 1.0 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_lives_rejected() {
        assert!(GameConfig::from_json_str(r#"{ "initial_lives": 0 }"#).is_err());
    }

    #[test]
    fn test_non_positive_speed_rejected() {
        assert!(GameConfig::from_json_str(r#"{ "base_speed": 0.0 }"#).is_err());
        assert!(GameConfig::from_json_str(r#"{ "step_time": -1.0 }"#).is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        assert!(GameConfig::from_json_str(r#"{ "max_cadence": 1e39 }"#).is_err());

        let config = GameConfig {
            max_cadence: f32::INFINITY,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            speed_step: f32::NAN,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            spacing: Vec2::new(3.0, f32::NEG_INFINITY),
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tiny_intervals_rejected() {
        for json in [
            r#"{ "step_time": 1e-9 }"#,
            r#"{ "death_effect_secs": 0.001 }"#,
            r#"{ "min_cadence": 0.0001, "max_cadence": 0.0002 }"#,
        ] {
            assert!(GameConfig::from_json_str(json).is_err(), "{}", json);
        }
        assert!(GameConfig::from_json_str(r#"{ "step_time": 0.01 }"#).is_ok());
    }

    #[test]
    fn test_custom_levels() {
        let config = GameConfig::from_json_str(r#"{ "levels": [[[1, 2], [0, 3]]] }"#).unwrap();
        let levels = config.level_set().unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels.cols(), 2);

        assert!(GameConfig::from_json_str(r#"{ "levels": [[[7]]] }"#).is_err());
        assert!(GameConfig::from_json_str(r#"{ "levels": [] }"#).is_err());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(GameConfig::from_json_str("{ initial_lives: ").is_err());
    }

    #[test]
    fn test_cell_position() {
        let config = GameConfig::default();
        assert_eq!(config.cell_position(0, 0), Vec2::new(-9.0, 14.0));
        assert_eq!(config.cell_position(2, 3), Vec2::new(0.0, 10.0));
    }
}
