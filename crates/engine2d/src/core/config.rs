//! # Engine Configuration
//!
//! All runtime settings for the engine in one serializable tree:
//!
//! - **Game**: frame rate and the scene loaded at startup
//! - **Graphics**: size of the presented frame (and default camera size)
//! - **Dev**: debug drawing and log verbosity
//!
//! Files are loaded through the [`Config`] trait, so both TOML and RON work:
//!
//! ```toml
//! [game]
//! frames_per_second = 30
//! splash_scene = "Title"
//!
//! [graphics]
//! width = 640
//! height = 360
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Loop and scene settings
    pub game: GameConfig,
    /// Output surface settings
    pub graphics: GraphicsConfig,
    /// Development switches
    pub dev: DevConfig,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.game.frames_per_second.is_finite() && self.game.frames_per_second > 0.0) {
            return Err(ConfigError::Invalid {
                field: "game.frames_per_second",
                reason: format!("must be positive, got {}", self.game.frames_per_second),
            });
        }
        if self.graphics.width == 0 || self.graphics.height == 0 {
            return Err(ConfigError::Invalid {
                field: "graphics",
                reason: format!(
                    "surface must be non-empty, got {}x{}",
                    self.graphics.width, self.graphics.height
                ),
            });
        }
        Ok(())
    }
}

/// Loop and scene settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Target frame rate of the scheduler
    pub frames_per_second: f64,
    /// Scene requested from the loader during setup
    pub splash_scene: String,
}

impl GameConfig {
    /// Minimum time between two frames, in milliseconds
    pub fn frame_interval(&self) -> f64 {
        1000.0 / self.frames_per_second
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 60.0,
            splash_scene: "SplashScene".to_string(),
        }
    }
}

/// Output surface settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Development switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    /// Start the loop right after setup
    pub auto_start: bool,
    /// Draw shape outlines
    pub debug_mode: bool,
    /// Raise the default log filter to `debug`
    pub print_logs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!((config.game.frames_per_second - 60.0).abs() < f64::EPSILON);
        assert_eq!(config.game.splash_scene, "SplashScene");
        assert_eq!(config.graphics.width, 1920);
        assert_eq!(config.graphics.height, 1080);
        assert!(!config.dev.debug_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_frame_interval() {
        let game = GameConfig {
            frames_per_second: 50.0,
            ..GameConfig::default()
        };
        assert!((game.frame_interval() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [game]
            frames_per_second = 30

            [dev]
            debug_mode = true
            "#,
        )
        .unwrap();

        assert!((config.game.frames_per_second - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.game.splash_scene, "SplashScene");
        assert_eq!(config.graphics, GraphicsConfig::default());
        assert!(config.dev.debug_mode);
    }

    #[test]
    fn test_validate_rejects_zero_rate_and_empty_surface() {
        let mut config = EngineConfig::default();
        config.game.frames_per_second = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "game.frames_per_second", .. })
        ));

        let mut config = EngineConfig::default();
        config.graphics.height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "graphics", .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EngineConfig::load_from_file("engine.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_save_and_load_ron() {
        let path = std::env::temp_dir().join(format!("engine2d-config-{}.ron", std::process::id()));
        let mut config = EngineConfig::default();
        config.graphics.width = 320;
        config.dev.print_logs = true;

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
