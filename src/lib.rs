//! Infinite minesweeper: a lazily generated, chunked mine field.

pub mod chunk;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod rng;
pub mod tui;
pub mod view;

pub use chunk::{Chunk, ChunkId, Field, CHUNK_SIZE};
pub use config::GameConfig;
pub use engine::{Lookup, RevealResult, Visibility, World};
pub use error::{GameError, GameResult};
