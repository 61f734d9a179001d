use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::agent::Agent;
use crate::environment::Environment;
use crate::policy::Policy;
use crate::spaces::Space;

/// Baseline that samples actions uniformly from the action space.
pub struct RandomAgent<Sp> {
    space: Sp,
    rng: StdRng,
}

impl<Sp> RandomAgent<Sp> {
    pub fn new(space: Sp, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { space, rng }
    }
}

impl<S, A, Sp: Space<A>> Policy<S, A> for RandomAgent<Sp> {
    fn select_action(&mut self, _state: &S) -> A {
        self.space.sample(&mut self.rng)
    }
}

impl<E: Environment> Agent<E> for RandomAgent<E::ActionSpace> {
    fn choose_action(&mut self, state: &E::State, _evaluate: bool) -> E::Action {
        <Self as Policy<E::State, E::Action>>::select_action(self, state)
    }
}
