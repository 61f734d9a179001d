use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::{DroneSimConfig, RenderMode};
use crate::environment::{Environment, ResetOptions, StepResult};
use crate::environments::normalize::UniformNormalizer;
use crate::error::{Error, Result};
use crate::render::{self, Frame, HumanDisplay, RenderSink, Scene};
use crate::spaces::BoxSpace;
use crate::wrappers::Flatten;

/// Normalized view of the arena handed to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub agent: [f64; 2],
    pub target: [f64; 2],
    pub velocity: [f64; 2],
}

impl Flatten for Observation {
    /// agent, target, velocity
    fn flatten(&self) -> Vec<f64> {
        [self.agent, self.target, self.velocity].concat()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Info {
    /// L1 distance between agent and target.
    pub distance: f64,
}

/// Raw simulation state of one episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DroneState {
    pub agent_position: [f64; 2],
    pub agent_velocity: [f64; 2],
    pub target_position: [f64; 2],
    pub out_of_bounds: u32,
}

impl DroneState {
    pub fn euclidean_distance(&self) -> f64 {
        let dx = self.target_position[0] - self.agent_position[0];
        let dy = self.target_position[1] - self.agent_position[1];
        dx.hypot(dy)
    }

    pub fn manhattan_distance(&self) -> f64 {
        (self.agent_position[0] - self.target_position[0]).abs()
            + (self.agent_position[1] - self.target_position[1]).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Active,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metadata {
    pub render_modes: [RenderMode; 2],
    pub render_fps: u32,
}

/// 2D drone navigation: steer a point mass with acceleration commands until it
/// reaches the target, without leaving the arena too often.
pub struct DroneSim {
    config: DroneSimConfig,
    state: Option<DroneState>,
    phase: Phase,
    rng: StdRng,
    position_norm: UniformNormalizer,
    velocity_norm: UniformNormalizer,
    sink: Option<Box<dyn RenderSink>>,
}

impl DroneSim {
    pub fn new(config: DroneSimConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let sink: Option<Box<dyn RenderSink>> = match config.render_mode {
            Some(RenderMode::Human) => Some(Box::new(HumanDisplay::new(
                config.frame_path.clone(),
                config.render_fps,
            )?)),
            _ => None,
        };
        Ok(Self {
            position_norm: UniformNormalizer::new(0.0, f64::from(config.window_size - 1)),
            velocity_norm: UniformNormalizer::new(-config.max_speed, config.max_speed),
            config,
            state: None,
            phase: Phase::Uninitialized,
            rng,
            sink,
        })
    }

    /// Parses the render mode the way callers usually pass it around.
    pub fn with_render_mode(config: DroneSimConfig, render_mode: Option<&str>) -> Result<Self> {
        let render_mode = render_mode.map(str::parse::<RenderMode>).transpose()?;
        Self::new(DroneSimConfig {
            render_mode,
            ..config
        })
    }

    pub fn config(&self) -> &DroneSimConfig {
        &self.config
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            render_modes: RenderMode::ALL,
            render_fps: self.config.render_fps,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> Option<&DroneState> {
        self.state.as_ref()
    }

    /// Overwrites the simulation state and (re)activates the episode.
    pub fn set_state(&mut self, state: DroneState) {
        self.state = Some(state);
        self.phase = Phase::Active;
    }

    /// Replaces the observer notified after each transition.
    pub fn set_render_sink(&mut self, sink: Option<Box<dyn RenderSink>>) {
        self.sink = sink;
    }

    pub fn observe(&self, state: &DroneState) -> Observation {
        Observation {
            agent: self.position_norm.apply(state.agent_position),
            target: self.position_norm.apply(state.target_position),
            velocity: self.velocity_norm.apply(state.agent_velocity),
        }
    }

    fn info(state: &DroneState) -> Info {
        Info {
            distance: state.manhattan_distance(),
        }
    }

    fn is_out_of_bounds(&self, position: &[f64; 2]) -> bool {
        let limit = f64::from(self.config.window_size);
        position.iter().any(|&p| p < 0.0 || p > limit)
    }

    fn sample_position(&mut self) -> [f64; 2] {
        let n = self.config.window_size;
        [
            f64::from(self.rng.random_range(0..n)),
            f64::from(self.rng.random_range(0..n)),
        ]
    }

    fn scene(&self, state: &DroneState) -> Scene {
        Scene {
            window_size: self.config.window_size,
            marker_size: self.config.marker_size,
            agent: state.agent_position,
            target: state.target_position,
        }
    }

    /// Presentation failures never undo a transition, they are only logged.
    fn notify(&mut self, state: &DroneState) {
        let scene = self.scene(state);
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.present(&scene) {
                tracing::warn!("render sink failed: {e}");
            }
        }
    }

    pub fn reset(
        &mut self,
        seed: Option<u64>,
        options: Option<&ResetOptions>,
    ) -> Result<(Observation, Info)> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        let agent_position = match options.and_then(|o| o.agent_position) {
            Some(position) => position,
            None => self.sample_position(),
        };
        let mut state = DroneState {
            agent_position,
            agent_velocity: [0.0, 0.0],
            target_position: self.sample_position(),
            out_of_bounds: 0,
        };
        // validate() guarantees a valid target exists for any agent position
        while state.euclidean_distance() < self.config.goal_radius {
            state.target_position = self.sample_position();
        }

        tracing::debug!(
            agent = ?state.agent_position,
            target = ?state.target_position,
            "reset episode"
        );
        self.state = Some(state);
        self.phase = Phase::Active;
        self.notify(&state);
        Ok((self.observe(&state), Self::info(&state)))
    }

    pub fn step(&mut self, action: &[f64; 2]) -> Result<StepResult<Observation, f64, Info>> {
        match self.phase {
            Phase::Uninitialized => return Err(Error::NotReset),
            Phase::Terminated => return Err(Error::EpisodeTerminated),
            Phase::Active => {}
        }
        let mut state = self.state.ok_or(Error::NotReset)?;

        // 先用旧速度积分位置, 再叠加动作并限幅
        let max_speed = self.config.max_speed;
        for axis in 0..2 {
            state.agent_position[axis] += state.agent_velocity[axis];
            state.agent_velocity[axis] =
                (state.agent_velocity[axis] + action[axis]).clamp(-max_speed, max_speed);
        }

        let distance = state.euclidean_distance();
        let (reward, terminated) = if self.is_out_of_bounds(&state.agent_position) {
            state.out_of_bounds += 1;
            let terminated = state.out_of_bounds > self.config.max_out_of_bounds;
            if terminated {
                tracing::warn!(
                    count = state.out_of_bounds,
                    "agent left the arena too often, ending episode"
                );
            }
            (self.config.out_of_bounds_penalty, terminated)
        } else if distance < self.config.goal_radius {
            (self.config.goal_reward, true)
        } else {
            (-distance, false)
        };
        tracing::debug!(distance, reward, terminated, "step");

        self.state = Some(state);
        if terminated {
            self.phase = Phase::Terminated;
        }
        self.notify(&state);

        Ok(StepResult {
            next_state: self.observe(&state),
            reward,
            terminated,
            truncated: false,
            info: Self::info(&state),
        })
    }

    /// Pixel buffer of the current scene in `rgb_array` mode, `None` otherwise.
    pub fn render(&mut self) -> Result<Option<Frame>> {
        if self.config.render_mode != Some(RenderMode::RgbArray) {
            return Ok(None);
        }
        match self.state {
            Some(state) => render::render_rgb(&self.scene(&state)).map(Some),
            None => Err(Error::NotReset),
        }
    }

    pub fn close(&mut self) -> Result<()> {
        if let Some(mut sink) = self.sink.take() {
            sink.close()?;
        }
        Ok(())
    }
}

impl Environment for DroneSim {
    type State = Observation;
    type Action = [f64; 2];
    type Reward = f64;
    type Info = Info;
    type ActionSpace = BoxSpace<2>;

    fn reset(
        &mut self,
        seed: Option<u64>,
        options: Option<&ResetOptions>,
    ) -> Result<(Self::State, Self::Info)> {
        DroneSim::reset(self, seed, options)
    }

    fn step(
        &mut self,
        action: &Self::Action,
    ) -> Result<StepResult<Self::State, Self::Reward, Self::Info>> {
        DroneSim::step(self, action)
    }

    fn current_state(&self) -> Option<Self::State> {
        self.state.as_ref().map(|s| self.observe(s))
    }

    fn action_space(&self) -> Self::ActionSpace {
        BoxSpace::UNIT
    }

    fn state_dim(&self) -> usize {
        6 // agent(2) + target(2) + velocity(2)
    }

    fn render(&mut self) -> Result<Option<Frame>> {
        DroneSim::render(self)
    }

    fn close(&mut self) -> Result<()> {
        DroneSim::close(self)
    }
}
