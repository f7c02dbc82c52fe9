use thiserror::Error;

/// Rejected simulation parameters.
///
/// Everything the simulator accepts from the outside world is checked up
/// front; once a [`Simulation`](crate::Simulation) exists its configuration
/// is known to be valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("page count must be at least 1")]
    ZeroPages,

    #[error("frame count must be at least 1")]
    ZeroFrames,

    #[error("reference sequence is empty")]
    EmptyReferenceSequence,

    #[error("invalid reference `{token}` at position {position}")]
    InvalidToken { token: String, position: usize },

    #[error("page {page} at position {position} is outside 0..{page_count}")]
    PageOutOfRange {
        page: usize,
        position: usize,
        page_count: usize,
    },

    #[error("playback speed must be at least 1 step per second")]
    ZeroSpeed,
}
