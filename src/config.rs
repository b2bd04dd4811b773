//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following
//! priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`TUMBLE_SECTION__KEY`)

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use tumble_core::SchedulerMode;
use tumble_render::ShadowMode;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub shadow: ShadowConfig,
    #[serde(default)]
    pub scene: SceneConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // TUMBLE_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed("TUMBLE_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Tumble".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Gravity acceleration [x, y, z]
    pub gravity: [f32; 3],
    /// Fixed substep length in seconds
    pub fixed_timestep: f32,
    /// Maximum substeps per frame
    pub max_substeps: u32,
    /// Step execution: "dual" (worker thread) or "single"
    pub scheduler: String,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 2,
            scheduler: "dual".to_string(),
        }
    }
}

impl PhysicsConfig {
    pub fn to_world_config(&self) -> tumble_physics::WorldConfig {
        tumble_physics::WorldConfig {
            gravity: tumble_math::Vec3::new(self.gravity[0], self.gravity[1], self.gravity[2]),
            fixed_timestep: self.fixed_timestep,
            max_substeps: self.max_substeps,
        }
    }

    pub fn scheduler_mode(&self) -> SchedulerMode {
        match self.scheduler.as_str() {
            "single" => SchedulerMode::Single,
            "dual" => SchedulerMode::Dual,
            other => {
                log::warn!("unknown scheduler mode '{}', using dual", other);
                SchedulerMode::Dual
            }
        }
    }
}

/// Shadow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadowConfig {
    /// Shadow map encoding: "depth" or "packed" (driver workaround)
    pub mode: String,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            mode: "depth".to_string(),
        }
    }
}

impl ShadowConfig {
    pub fn shadow_mode(&self) -> ShadowMode {
        match self.mode.as_str() {
            "packed" => ShadowMode::Packed,
            "depth" => ShadowMode::Depth,
            other => {
                log::warn!("unknown shadow mode '{}', using depth", other);
                ShadowMode::Depth
            }
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Height of the floor plane
    pub ground_y: f32,
    /// Index of the block setup shown first
    pub start_setup: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ground_y: -2.0,
            start_setup: 0,
        }
    }
}

/// Configuration loading error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.physics.scheduler_mode(), SchedulerMode::Dual);
        assert_eq!(config.shadow.shadow_mode(), ShadowMode::Depth);
        assert_eq!(config.scene.ground_y, -2.0);
    }

    #[test]
    fn test_unknown_modes_fall_back() {
        let physics = PhysicsConfig {
            scheduler: "quantum".to_string(),
            ..Default::default()
        };
        assert_eq!(physics.scheduler_mode(), SchedulerMode::Dual);

        let shadow = ShadowConfig {
            mode: "holographic".to_string(),
        };
        assert_eq!(shadow.shadow_mode(), ShadowMode::Depth);
    }

    #[test]
    fn test_load_from_missing_dir_uses_defaults() {
        let config = AppConfig::load_from("definitely/not/a/dir").unwrap();
        assert_eq!(config.window.title, "Tumble");
    }
}
