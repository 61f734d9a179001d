pub mod drone;
pub mod normalize;

pub use drone::{DroneSim, DroneState, Info, Observation, Phase};
