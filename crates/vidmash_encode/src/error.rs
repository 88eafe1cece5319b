use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("ffmpeg not found")]
    FfmpegNotFound,

    #[error("failed to execute ffmpeg: {0}")]
    FfmpegExec(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] vidmash_core::CoreError),
}

pub type Result<T> = std::result::Result<T, EncodeError>;
