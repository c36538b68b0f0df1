use thiserror::Error;

/// Errors raised while setting up a world or a view onto it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("mine percentage must be between 0 and 100, got {0}")]
    InvalidMinePercentage(u8),

    #[error("view dimensions must be positive")]
    EmptyView,
}

pub type GameResult<T> = Result<T, GameError>;
