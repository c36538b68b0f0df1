//! Arena owning every chunk of the world.
//!
//! Chunks are addressed by [`ChunkId`] and never freed individually, so
//! neighbour links stay valid for the lifetime of the registry.

use tracing::debug;

use crate::chunk::{Chunk, ChunkId};

/// Capacity added to the registry every time it fills up.
pub const CHUNK_LIST_GROWTH: usize = 256;

pub struct ChunkRegistry {
    chunks: Vec<Chunk>,
}

impl Default for ChunkRegistry {
    fn default() -> Self { Self::new() }
}

impl ChunkRegistry {
    pub fn new() -> Self { Self { chunks: Vec::with_capacity(CHUNK_LIST_GROWTH) } }

    /// Existing chunk at `(x, y)`, without creating one.
    pub fn find(&self, x: u32, y: u32) -> Option<ChunkId> {
        self.chunks.iter().position(|c| c.x() == x && c.y() == y).map(ChunkId)
    }

    pub fn get_or_create(&mut self, x: u32, y: u32, world_seed: u32) -> ChunkId {
        match self.find(x, y) {
            Some(id) => id,
            None => self.create(x, y, world_seed),
        }
    }

    /// Builds the chunk at `(x, y)` and links it with every existing
    /// neighbour in both directions. Callers must have checked that no chunk
    /// exists at these coordinates.
    pub(crate) fn create(&mut self, x: u32, y: u32, world_seed: u32) -> ChunkId {
        debug_assert!(self.find(x, y).is_none(), "duplicate chunk at ({x},{y})");
        let id = ChunkId(self.chunks.len());
        let mut chunk = Chunk::new(x, y, world_seed);

        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 { continue; }
                if let Some(n) = self.find(x.wrapping_add_signed(dx), y.wrapping_add_signed(dy)) {
                    self.chunks[n.0].set_neighbor(-dx, -dy, id);
                    chunk.set_neighbor(dx, dy, n);
                }
            }
        }

        debug!(x, y, seed = chunk.seed(), "created chunk");
        self.register(chunk)
    }

    /// Appends `chunk`, growing storage by [`CHUNK_LIST_GROWTH`] when full.
    /// Running out of memory here aborts the process.
    pub(crate) fn register(&mut self, chunk: Chunk) -> ChunkId {
        if self.chunks.len() == self.chunks.capacity() {
            self.chunks.reserve_exact(CHUNK_LIST_GROWTH);
            debug!(capacity = self.chunks.capacity(), "grew chunk registry");
        }
        self.chunks.push(chunk);
        ChunkId(self.chunks.len() - 1)
    }

    pub fn get(&self, id: ChunkId) -> &Chunk { &self.chunks[id.0] }
    pub(crate) fn get_mut(&mut self, id: ChunkId) -> &mut Chunk { &mut self.chunks[id.0] }

    pub fn len(&self) -> usize { self.chunks.len() }
    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }
    pub fn capacity(&self) -> usize { self.chunks.capacity() }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkId, &Chunk)> {
        self.chunks.iter().enumerate().map(|(i, c)| (ChunkId(i), c))
    }
}
