//! Game configuration
//!
//! Tunables live in a RON file so they can be tweaked without a rebuild.
//! Every section uses `#[serde(default)]`, so a config file only needs the
//! fields it overrides. Lookup order:
//! 1. explicit path (command line)
//! 2. `assets/config.ron`
//! 3. `<config dir>/samply/config.ron`
//! 4. built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FaultPolicy;

/// Default location next to the executable's working directory
pub const LOCAL_CONFIG_PATH: &str = "assets/config.ron";

/// Sanity limits applied when validating a loaded config
pub mod limits {
    /// Largest playfield coordinate accepted anywhere
    pub const MAX_COORD: f32 = 1_000.0;
    /// Largest enemy wave
    pub const MAX_WAVE_SIZE: u32 = 64;
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Validation error: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: i32,
    pub height: i32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Samply".to_string(),
            width: 1024,
            height: 576,
        }
    }
}

/// Side-by-side stereo viewports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoSettings {
    pub enabled: bool,
    /// Distance between the left and right cameras
    pub eye_separation: f32,
    /// Camera distance from the playfield plane (drives parallax strength)
    pub camera_distance: f32,
    /// Visible playfield height in world units
    pub view_height: f32,
}

impl Default for StereoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            eye_separation: 0.4,
            camera_distance: 8.0,
            view_height: 13.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub max_health: i32,
    /// Units per second at full stick deflection
    pub speed: f32,
    pub radius: f32,
    pub start_position: (f32, f32),
    /// Frames of invincibility after taking a hit
    pub invincible_frames: u8,
    /// Playfield half extents the player is clamped to
    pub bounds: (f32, f32),
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            max_health: 30,
            speed: 5.0,
            radius: 0.35,
            start_position: (0.0, -3.5),
            invincible_frames: 30,
            bounds: (3.0, 5.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySettings {
    /// Seconds between waves
    pub spawn_interval: f32,
    /// Enemies in the first wave; grows by one every `wave_growth` waves
    pub first_wave: u32,
    pub wave_growth: u32,
    pub max_wave: u32,
    pub max_health: i32,
    pub speed: f32,
    pub radius: f32,
    /// Spawn height; enemies approach from here
    pub spawn_height: f32,
    /// Height at which enemies stop approaching and start strafing
    pub hover_height: f32,
    /// Seconds between shots while strafing
    pub fire_interval: f32,
    pub shot_speed: f32,
    pub shot_damage: i32,
    pub contact_damage: i32,
}

impl Default for EnemySettings {
    fn default() -> Self {
        Self {
            spawn_interval: 4.0,
            first_wave: 1,
            wave_growth: 3,
            max_wave: 6,
            max_health: 3,
            speed: 1.5,
            radius: 0.4,
            spawn_height: 7.0,
            hover_height: 3.0,
            fire_interval: 2.0,
            shot_speed: 4.0,
            shot_damage: 5,
            contact_damage: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinSettings {
    /// Coins spawn with x uniform in [-band, band]
    pub band_half_width: f32,
    pub spawn_height: f32,
    /// Duration of the drop-in effect
    pub appear_secs: f32,
    pub fall_speed: f32,
    /// Seconds a coin stays after its appear effect finishes
    pub lifetime_secs: f32,
    pub radius: f32,
}

impl Default for CoinSettings {
    fn default() -> Self {
        Self {
            band_half_width: 2.5,
            spawn_height: 5.0,
            appear_secs: 1.5,
            fall_speed: 2.0,
            lifetime_secs: 3.0,
            radius: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    /// A weapon upgrade is granted every this many coins
    pub reward_every: u32,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self { reward_every: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowSettings,
    pub stereo: StereoSettings,
    pub player: PlayerSettings,
    pub enemies: EnemySettings,
    pub coins: CoinSettings,
    pub economy: EconomySettings,
    pub faults: FaultPolicy,
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&contents)
    }

    /// Resolve a config using the lookup order. A broken file is reported
    /// and skipped rather than aborting startup.
    pub fn discover(explicit: Option<&Path>) -> Self {
        for path in Self::candidate_paths(explicit) {
            if !path.exists() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "loaded config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring config");
                }
            }
        }
        tracing::info!("using default config");
        Self::default()
    }

    fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(p) = explicit {
            paths.push(p.to_path_buf());
        }
        paths.push(PathBuf::from(LOCAL_CONFIG_PATH));
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("samply").join("config.ron"));
        }
        paths
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, v: f32) -> Result<(), ConfigError> {
            if v.is_finite() && v > 0.0 && v <= limits::MAX_COORD {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{} must be in (0, {}], got {}", name, limits::MAX_COORD, v)))
            }
        }

        if self.window.width <= 0 || self.window.height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be positive, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        positive("stereo.camera_distance", self.stereo.camera_distance)?;
        positive("stereo.view_height", self.stereo.view_height)?;
        if !self.stereo.eye_separation.is_finite() || self.stereo.eye_separation < 0.0 {
            return Err(ConfigError::Invalid("stereo.eye_separation must be >= 0".into()));
        }

        if self.player.max_health <= 0 {
            return Err(ConfigError::Invalid("player.max_health must be positive".into()));
        }
        positive("player.speed", self.player.speed)?;
        positive("player.radius", self.player.radius)?;
        positive("player.bounds.x", self.player.bounds.0)?;
        positive("player.bounds.y", self.player.bounds.1)?;

        positive("enemies.spawn_interval", self.enemies.spawn_interval)?;
        positive("enemies.speed", self.enemies.speed)?;
        positive("enemies.radius", self.enemies.radius)?;
        positive("enemies.fire_interval", self.enemies.fire_interval)?;
        if self.enemies.max_wave == 0 || self.enemies.max_wave > limits::MAX_WAVE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "enemies.max_wave must be in 1..={}", limits::MAX_WAVE_SIZE
            )));
        }
        if self.enemies.wave_growth == 0 {
            return Err(ConfigError::Invalid("enemies.wave_growth must be positive".into()));
        }
        if self.enemies.max_health <= 0 {
            return Err(ConfigError::Invalid("enemies.max_health must be positive".into()));
        }

        positive("coins.band_half_width", self.coins.band_half_width)?;
        positive("coins.appear_secs", self.coins.appear_secs)?;
        positive("coins.lifetime_secs", self.coins.lifetime_secs)?;
        positive("coins.radius", self.coins.radius)?;

        if self.economy.reward_every == 0 {
            return Err(ConfigError::Invalid("economy.reward_every must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.economy.reward_every, 5);
        assert_eq!(config.coins.band_half_width, 2.5);
        assert_eq!(config.coins.lifetime_secs, 3.0);
        assert_eq!((config.window.width, config.window.height), (1024, 576));
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(LOCAL_CONFIG_PATH);
        let config = GameConfig::load(path).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = GameConfig::from_ron_str("(coins: (lifetime_secs: 5.0), seed: Some(7))").unwrap();
        assert_eq!(config.coins.lifetime_secs, 5.0);
        assert_eq!(config.coins.spawn_height, 5.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.faults, FaultPolicy::Continue);
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(faults: Break, economy: (reward_every: 3))").unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.faults, FaultPolicy::Break);
        assert_eq!(config.economy.reward_every, 3);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = GameConfig::from_ron_str("(economy: (reward_every: 0))").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = GameConfig::from_ron_str("(coins: (lifetime_secs: -1.0))").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_ron() {
        let err = GameConfig::from_ron_str("(coins: (").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_discover_falls_back_on_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, "not ron at all {").unwrap();

        // Broken explicit file is skipped; result is still a valid config
        let config = GameConfig::discover(Some(&path));
        assert!(config.validate().is_ok());
    }
}
