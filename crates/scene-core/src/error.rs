//! Failure taxonomy for the scene subsystem.
//!
//! None of these are retried automatically. A mount that fails, or a loop that
//! stops on a tick error, is terminal for that viewport; the owner remounts.

/// The graphics context could not be acquired.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("graphics surface could not be created: {0}")]
    Surface(String),

    #[error("no compatible graphics adapter")]
    NoAdapter,

    #[error("graphics device request failed: {0}")]
    Device(String),
}

/// The host container is missing or went away before mount completed.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("host container `{0}` not found")]
    ContainerMissing(String),

    #[error("host container is not attached to a document")]
    Detached,

    #[error("host container was removed before mount completed")]
    RemovedDuringMount,

    #[error("host container already holds a mounted scene")]
    Occupied,

    #[error("could not attach rendering surface: {0}")]
    Surface(String),

    #[error("could not register `{0}` listener")]
    Listener(&'static str),
}

/// A scheduled tick failed; the loop is stopped when one of these is raised.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeTickError {
    #[error("tick ran against disposed graphics resources")]
    Disposed,

    #[error("viewport state was busy when the tick fired")]
    Reentrant,

    #[error("frame submission failed: {0}")]
    Render(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("smoothing factor {0} is outside (0, 1]")]
    Smoothing(f32),

    #[error("{name} must be finite and non-negative, got {value}")]
    Sensitivity { name: &'static str, value: f32 },

    #[error("field of view {0} degrees is outside (0, 180)")]
    FieldOfView(f32),

    #[error("clip planes near={near} far={far} are invalid")]
    ClipPlanes { near: f32, far: f32 },
}

/// Everything that can abort a mount.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}
