use std::cell::Cell;
use std::rc::Rc;

use dronesim::agent::{Agent, Transition};
use dronesim::algorithms::random::RandomAgent;
use dronesim::config::{DroneSimConfig, TrainConfig};
use dronesim::environment::Environment;
use dronesim::environments::DroneSim;
use dronesim::policy::Policy;
use dronesim::spaces::{BoxSpace, Space};
use dronesim::wrappers::{FlattenObservation, TimeLimit};

type Env = TimeLimit<FlattenObservation<DroneSim>>;

fn make_env(max_steps: usize) -> Env {
    let sim = DroneSim::new(DroneSimConfig {
        seed: Some(3),
        ..Default::default()
    })
    .unwrap();
    TimeLimit::new(FlattenObservation::new(sim), max_steps)
}

#[test]
fn random_agent_stays_inside_action_space() {
    let space = BoxSpace::<2>::UNIT;
    let mut agent = RandomAgent::new(space, Some(9));
    for _ in 0..500 {
        let action: [f64; 2] = agent.select_action(&());
        assert!(space.contains(&action));
    }
}

#[test]
fn random_agent_runs_episodes_to_completion() {
    let mut env = make_env(20);
    let mut agent = RandomAgent::new(env.action_space(), Some(1));
    let config = TrainConfig {
        n_games: 5,
        max_episode_steps: 20,
        seed: Some(1),
        ..Default::default()
    };

    let summary = agent.train(&mut env, &config).unwrap();
    assert_eq!(summary.score_history.len(), 5);
    assert!(summary.best_score.is_finite());
    assert!(summary.score_history.iter().all(|s| s.is_finite()));
}

/// Counts calls to the learning hooks.
struct CountingAgent {
    inner: RandomAgent<BoxSpace<2>>,
    transitions: usize,
    learns: usize,
    saves: Rc<Cell<usize>>,
    loads: usize,
    last_done: bool,
}

impl Agent<Env> for CountingAgent {
    fn choose_action(&mut self, state: &Vec<f64>, _evaluate: bool) -> [f64; 2] {
        self.inner.select_action(state)
    }

    fn store_transition(&mut self, transition: Transition<Vec<f64>, [f64; 2]>) {
        assert_eq!(transition.state.len(), 6);
        self.transitions += 1;
        self.last_done = transition.done;
    }

    fn learn(&mut self) -> dronesim::Result<()> {
        self.learns += 1;
        Ok(())
    }

    fn save_models(&self) -> dronesim::Result<()> {
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn load_models(&mut self) -> dronesim::Result<()> {
        self.loads += 1;
        Ok(())
    }
}

fn counting_agent() -> CountingAgent {
    CountingAgent {
        inner: RandomAgent::new(BoxSpace::UNIT, Some(2)),
        transitions: 0,
        learns: 0,
        saves: Rc::new(Cell::new(0)),
        loads: 0,
        last_done: false,
    }
}

#[test]
fn episode_stores_and_learns_every_step() {
    let mut env = make_env(10);
    let mut agent = counting_agent();

    let stats = agent.train_episode(&mut env, Some(4), false).unwrap();
    assert!(stats.steps >= 1 && stats.steps <= 10);
    assert_eq!(agent.transitions, stats.steps);
    assert_eq!(agent.learns, stats.steps);
    assert!(agent.last_done);
}

#[test]
fn evaluation_skips_learning_and_checkpoints() {
    let mut env = make_env(10);
    let mut agent = counting_agent();
    let config = TrainConfig {
        n_games: 3,
        evaluate: true,
        load_checkpoint: true,
        ..Default::default()
    };

    agent.train(&mut env, &config).unwrap();
    assert_eq!(agent.learns, 0);
    assert_eq!(agent.saves.get(), 0);
    assert_eq!(agent.loads, 1);
}

#[test]
fn first_episode_always_saves_a_checkpoint() {
    let mut env = make_env(10);
    let mut agent = counting_agent();
    let config = TrainConfig {
        n_games: 4,
        ..Default::default()
    };

    let summary = agent.train(&mut env, &config).unwrap();
    assert!(agent.saves.get() >= 1);

    // best average over the prefixes of the history
    let history = &summary.score_history;
    let best = (1..=history.len())
        .map(|n| history[..n].iter().sum::<f64>() / n as f64)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(summary.best_score, best);
}
