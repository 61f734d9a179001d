use crate::error::Result;
use crate::render::Frame;
use crate::spaces::Space;

pub struct StepResult<S, R, I> {
    pub next_state: S,
    pub reward: R,
    /// 任务本身结束(到达目标或越界过多)
    pub terminated: bool,
    /// 被外部步数限制截断
    pub truncated: bool,
    pub info: I,
}

impl<S, R, I> StepResult<S, R, I> {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResetOptions {
    /// Start the agent here instead of sampling a position.
    pub agent_position: Option<[f64; 2]>,
}

pub trait Environment {
    type State;
    type Action;
    type Reward: Copy + Into<f64>;
    type Info;
    type ActionSpace: Space<Self::Action>;

    fn reset(
        &mut self,
        seed: Option<u64>,
        options: Option<&ResetOptions>,
    ) -> Result<(Self::State, Self::Info)>;

    fn step(
        &mut self,
        action: &Self::Action,
    ) -> Result<StepResult<Self::State, Self::Reward, Self::Info>>;

    /// 获取当前状态, reset 之前为 None
    fn current_state(&self) -> Option<Self::State>;

    /// 动作空间
    fn action_space(&self) -> Self::ActionSpace;

    /// 状态空间维度
    fn state_dim(&self) -> usize;

    fn render(&mut self) -> Result<Option<Frame>>;

    fn close(&mut self) -> Result<()>;
}
