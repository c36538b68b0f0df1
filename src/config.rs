use crate::error::{GameError, GameResult};

/// Share of fields that are mines unless configured otherwise.
pub const DEFAULT_MINE_PERCENTAGE: u8 = 10;

/// Generation parameters fixed for the lifetime of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub seed: u32,
    /// A field is a mine when its streamed value exceeds this.
    pub mine_threshold: u32,
}

impl GameConfig {
    pub fn new(seed: u32, mine_percentage: u8) -> GameResult<Self> {
        if mine_percentage > 100 { return Err(GameError::InvalidMinePercentage(mine_percentage)); }
        Ok(Self::with_threshold(seed, mine_threshold(mine_percentage)))
    }

    pub fn with_threshold(seed: u32, mine_threshold: u32) -> Self { Self { seed, mine_threshold } }
}

impl Default for GameConfig {
    fn default() -> Self { Self::with_threshold(0, mine_threshold(DEFAULT_MINE_PERCENTAGE)) }
}

/// Threshold for roughly `percentage` percent mines. 100 makes every field
/// a mine.
pub fn mine_threshold(percentage: u8) -> u32 {
    u32::MAX / 100 * (100 - u32::from(percentage.min(100)))
}
