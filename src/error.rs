use std::path::PathBuf;

/// Errors raised while building or rendering a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Invalid color '{value}': expected #RRGGBB or #RRGGBBAA")]
    InvalidColor { value: String },

    #[error("Font could not be loaded: {path}: {reason}")]
    MissingFont { path: PathBuf, reason: String },

    #[error("Duration must be positive, got {seconds}")]
    InvalidDuration { seconds: f32 },

    #[error("play() needs at least one animation")]
    EmptyPlay,

    #[error("Scene has already been played")]
    AlreadyPlayed,

    #[error("Unknown mobject id {id}")]
    UnknownMobject { id: usize },

    #[error("Mobject {id} is not a text object")]
    NotText { id: usize },

    #[error("Invalid resolution '{value}'")]
    InvalidResolution { value: String },
}

pub type SceneResult<T> = std::result::Result<T, SceneError>;
