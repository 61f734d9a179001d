use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid render mode: {0} (expected \"human\" or \"rgb_array\")")]
    InvalidRenderMode(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid space: {0}")]
    InvalidSpace(String),
    #[error("step called before reset")]
    NotReset,
    #[error("episode has terminated, call reset before stepping again")]
    EpisodeTerminated,
    #[error("render failed: {0}")]
    Render(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
