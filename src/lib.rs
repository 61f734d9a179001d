// detailed implementation
pub mod algorithms;
pub mod config;
pub mod environments;
pub mod error;
pub mod render;
pub mod spaces;
pub mod wrappers;

// Traits
pub mod agent;
pub mod environment;
pub mod policy;

pub use error::{Error, Result};
