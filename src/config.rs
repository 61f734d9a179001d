use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// 按固定帧率展示
    Human,
    /// 返回像素数组
    RgbArray,
}

impl RenderMode {
    pub const ALL: [RenderMode; 2] = [RenderMode::Human, RenderMode::RgbArray];

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Human => "human",
            RenderMode::RgbArray => "rgb_array",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RenderMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| Error::InvalidRenderMode(s.to_string()))
    }
}

/// Parameters of the drone navigation task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DroneSimConfig {
    /// Side length of the square arena, in pixels.
    pub window_size: u32,
    pub render_mode: Option<RenderMode>,
    pub render_fps: u32,
    /// Side length of the agent/target squares when drawn.
    pub marker_size: u32,
    pub goal_radius: f64,
    pub goal_reward: f64,
    pub out_of_bounds_penalty: f64,
    /// The episode ends once the out-of-bounds counter exceeds this.
    pub max_out_of_bounds: u32,
    pub max_speed: f64,
    pub seed: Option<u64>,
    /// Where human mode writes the latest frame.
    pub frame_path: PathBuf,
}

impl Default for DroneSimConfig {
    fn default() -> Self {
        Self {
            window_size: 256,
            render_mode: None,
            render_fps: 4,
            marker_size: 10,
            goal_radius: 15.0,
            goal_reward: 250.0,
            out_of_bounds_penalty: -25000.0,
            max_out_of_bounds: 5,
            max_speed: 10.0,
            seed: None,
            frame_path: PathBuf::from("dronesim_frame.png"),
        }
    }
}

impl DroneSimConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 {
            return Err(Error::InvalidConfig(format!(
                "window_size must be at least 2, got {}",
                self.window_size
            )));
        }
        if !(self.goal_radius.is_finite() && self.goal_radius >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "goal_radius must be finite and non-negative, got {}",
                self.goal_radius
            )));
        }
        // Every point of the grid has a corner at least half a diagonal away,
        // so target sampling always finds a valid spot. Measured with hypot,
        // as the sampling loop does.
        let half_side = f64::from(self.window_size - 1) / 2.0;
        if half_side.hypot(half_side) < self.goal_radius {
            return Err(Error::InvalidConfig(format!(
                "window_size {} is too small for goal_radius {}",
                self.window_size, self.goal_radius
            )));
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "max_speed must be finite and positive, got {}",
                self.max_speed
            )));
        }
        if !(self.goal_reward.is_finite() && self.out_of_bounds_penalty.is_finite()) {
            return Err(Error::InvalidConfig("rewards must be finite".to_string()));
        }
        if self.render_fps == 0 {
            return Err(Error::InvalidConfig("render_fps must be positive".to_string()));
        }
        if self.marker_size == 0 {
            return Err(Error::InvalidConfig("marker_size must be positive".to_string()));
        }
        Ok(())
    }
}

/// Training loop settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub n_games: usize,
    pub max_episode_steps: usize,
    /// Skip learning and checkpointing.
    pub evaluate: bool,
    pub load_checkpoint: bool,
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            n_games: 10_000,
            max_episode_steps: 100,
            evaluate: false,
            load_checkpoint: false,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub env: DroneSimConfig,
    pub train: TrainConfig,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.env.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_mode_parses_known_names_only() {
        assert_eq!("human".parse::<RenderMode>().unwrap(), RenderMode::Human);
        assert_eq!("rgb_array".parse::<RenderMode>().unwrap(), RenderMode::RgbArray);
        assert!(matches!(
            "ansi".parse::<RenderMode>(),
            Err(Error::InvalidRenderMode(s)) if s == "ansi"
        ));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [env]
            window_size = 128
            render_mode = "rgb_array"

            [train]
            n_games = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.env.window_size, 128);
        assert_eq!(config.env.render_mode, Some(RenderMode::RgbArray));
        assert_eq!(config.env.goal_radius, 15.0);
        assert_eq!(config.train.n_games, 3);
        assert_eq!(config.train.max_episode_steps, 100);
    }

    #[test]
    fn unknown_render_mode_in_toml_is_rejected() {
        let err = AppConfig::from_toml_str("[env]\nrender_mode = \"ansi\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn tiny_window_is_rejected() {
        let config = DroneSimConfig {
            window_size: 16,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert!(DroneSimConfig::default().validate().is_ok());
    }

    #[test]
    fn goal_radius_bound_matches_hypot() {
        let at_hypot = DroneSimConfig {
            window_size: 23,
            goal_radius: 11f64.hypot(11.0),
            ..Default::default()
        };
        assert!(at_hypot.validate().is_ok());

        // one ulp above what hypot can reach from the centre
        let product = DroneSimConfig {
            goal_radius: 22.0 * std::f64::consts::SQRT_2 / 2.0,
            ..at_hypot
        };
        assert!(product.goal_radius > 11f64.hypot(11.0));
        assert!(matches!(product.validate(), Err(Error::InvalidConfig(_))));
    }
}
