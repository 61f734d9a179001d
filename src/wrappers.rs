use crate::environment::{Environment, ResetOptions, StepResult};
use crate::error::Result;
use crate::render::Frame;

/// Structured observations that can be laid out as a flat vector.
pub trait Flatten {
    fn flatten(&self) -> Vec<f64>;
}

/// Marks an episode as truncated once it has run `max_episode_steps` steps.
pub struct TimeLimit<E> {
    env: E,
    max_episode_steps: usize,
    elapsed_steps: usize,
}

impl<E: Environment> TimeLimit<E> {
    pub fn new(env: E, max_episode_steps: usize) -> Self {
        Self {
            env,
            max_episode_steps,
            elapsed_steps: 0,
        }
    }

    pub fn elapsed_steps(&self) -> usize {
        self.elapsed_steps
    }

    pub fn inner(&self) -> &E {
        &self.env
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E: Environment> Environment for TimeLimit<E> {
    type State = E::State;
    type Action = E::Action;
    type Reward = E::Reward;
    type Info = E::Info;
    type ActionSpace = E::ActionSpace;

    fn reset(
        &mut self,
        seed: Option<u64>,
        options: Option<&ResetOptions>,
    ) -> Result<(Self::State, Self::Info)> {
        self.elapsed_steps = 0;
        self.env.reset(seed, options)
    }

    fn step(
        &mut self,
        action: &Self::Action,
    ) -> Result<StepResult<Self::State, Self::Reward, Self::Info>> {
        let mut result = self.env.step(action)?;
        self.elapsed_steps += 1;
        if self.elapsed_steps >= self.max_episode_steps {
            result.truncated = true;
        }
        Ok(result)
    }

    fn current_state(&self) -> Option<Self::State> {
        self.env.current_state()
    }

    fn action_space(&self) -> Self::ActionSpace {
        self.env.action_space()
    }

    fn state_dim(&self) -> usize {
        self.env.state_dim()
    }

    fn render(&mut self) -> Result<Option<Frame>> {
        self.env.render()
    }

    fn close(&mut self) -> Result<()> {
        self.env.close()
    }
}

/// Hands the agent a flat `Vec<f64>` instead of the structured observation.
pub struct FlattenObservation<E> {
    env: E,
}

impl<E: Environment> FlattenObservation<E>
where
    E::State: Flatten,
{
    pub fn new(env: E) -> Self {
        Self { env }
    }

    pub fn inner(&self) -> &E {
        &self.env
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E: Environment> Environment for FlattenObservation<E>
where
    E::State: Flatten,
{
    type State = Vec<f64>;
    type Action = E::Action;
    type Reward = E::Reward;
    type Info = E::Info;
    type ActionSpace = E::ActionSpace;

    fn reset(
        &mut self,
        seed: Option<u64>,
        options: Option<&ResetOptions>,
    ) -> Result<(Self::State, Self::Info)> {
        let (obs, info) = self.env.reset(seed, options)?;
        Ok((obs.flatten(), info))
    }

    fn step(
        &mut self,
        action: &Self::Action,
    ) -> Result<StepResult<Self::State, Self::Reward, Self::Info>> {
        let result = self.env.step(action)?;
        Ok(StepResult {
            next_state: result.next_state.flatten(),
            reward: result.reward,
            terminated: result.terminated,
            truncated: result.truncated,
            info: result.info,
        })
    }

    fn current_state(&self) -> Option<Self::State> {
        self.env.current_state().map(|s| s.flatten())
    }

    fn action_space(&self) -> Self::ActionSpace {
        self.env.action_space()
    }

    fn state_dim(&self) -> usize {
        self.env.state_dim()
    }

    fn render(&mut self) -> Result<Option<Frame>> {
        self.env.render()
    }

    fn close(&mut self) -> Result<()> {
        self.env.close()
    }
}
