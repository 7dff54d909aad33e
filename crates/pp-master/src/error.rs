use pp_audio::AudioError;
use pp_formats::FormatError;

/// Errors surfaced by the controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("invalid session config: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid engine config: {0}")]
    Engine(#[from] pp_engine::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
