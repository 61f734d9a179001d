use crate::config::TrainConfig;
use crate::environment::Environment;
use crate::error::Result;

/// Number of recent episodes averaged when tracking the best score.
pub const SCORE_WINDOW: usize = 100;

pub struct Transition<S, A> {
    pub state: S,
    pub action: A,
    pub reward: f64,
    pub next_state: S,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStats {
    pub score: f64,
    pub steps: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainSummary {
    pub score_history: Vec<f64>,
    pub best_score: f64,
}

/// Mean of the last `window` scores, 0 for an empty history.
pub fn mean_of_last(scores: &[f64], window: usize) -> f64 {
    let tail = &scores[scores.len().saturating_sub(window)..];
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().sum::<f64>() / tail.len() as f64
}

/// Seam for the learner driving the environment. Only `choose_action` is
/// required; agents that do not learn keep the no-op hooks.
pub trait Agent<E: Environment> {
    fn choose_action(&mut self, state: &E::State, evaluate: bool) -> E::Action;

    fn store_transition(&mut self, _transition: Transition<E::State, E::Action>) {}

    fn learn(&mut self) -> Result<()> {
        Ok(())
    }

    fn save_models(&self) -> Result<()> {
        Ok(())
    }

    fn load_models(&mut self) -> Result<()> {
        Ok(())
    }

    // 训练一个episode，返回总奖励
    fn train_episode(
        &mut self,
        env: &mut E,
        seed: Option<u64>,
        evaluate: bool,
    ) -> Result<EpisodeStats>
    where
        E::State: Clone,
    {
        let (mut state, _info) = env.reset(seed, None)?;
        let mut stats = EpisodeStats {
            score: 0.0,
            steps: 0,
        };

        loop {
            let action = self.choose_action(&state, evaluate);
            let result = env.step(&action)?;
            let reward: f64 = result.reward.into();
            let done = result.done();
            stats.score += reward;
            stats.steps += 1;

            self.store_transition(Transition {
                state,
                action,
                reward,
                next_state: result.next_state.clone(),
                done,
            });
            if !evaluate {
                self.learn()?;
            }

            if done {
                break;
            }
            state = result.next_state;
        }

        Ok(stats)
    }

    fn train(&mut self, env: &mut E, config: &TrainConfig) -> Result<TrainSummary>
    where
        E::State: Clone,
    {
        if config.load_checkpoint {
            self.load_models()?;
        }

        let mut summary = TrainSummary {
            score_history: Vec::with_capacity(config.n_games),
            best_score: f64::NEG_INFINITY,
        };
        for episode in 0..config.n_games {
            // only the first reset is seeded, later episodes continue the stream
            let seed = if episode == 0 { config.seed } else { None };
            let stats = self.train_episode(env, seed, config.evaluate)?;
            summary.score_history.push(stats.score);

            let avg_score = mean_of_last(&summary.score_history, SCORE_WINDOW);
            if avg_score > summary.best_score {
                summary.best_score = avg_score;
                if !config.evaluate {
                    self.save_models()?;
                }
            }

            tracing::info!(
                "episode {} score {:.1} avg score {:.1} best score {:.1}",
                episode,
                stats.score,
                avg_score,
                summary.best_score
            );
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_last_uses_only_the_tail() {
        assert_eq!(mean_of_last(&[], 100), 0.0);
        assert_eq!(mean_of_last(&[1.0, 2.0, 3.0], 100), 2.0);
        assert_eq!(mean_of_last(&[100.0, 2.0, 4.0], 2), 3.0);
    }
}
