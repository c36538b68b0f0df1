use crate::rng::chunk_seed;

/// log2 of the chunk side length.
pub const CHUNK_SIZE_LOG2: u32 = 6;
/// Side length of a chunk in fields.
pub const CHUNK_SIZE: u32 = 1 << CHUNK_SIZE_LOG2;
/// Largest local coordinate inside a chunk.
pub const CHUNK_POS_MAX: u32 = CHUNK_SIZE - 1;
/// Number of fields in a chunk.
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

const FIELD_MINE_CACHE_MASK: u8 = 0x0f;
const FIELD_UNCOVERED: u8 = 0x10;
const FIELD_MINE: u8 = 0x20;
const FIELD_FLAG: u8 = 0x40;
const FIELD_MINE_COUNT_CACHED: u8 = 0x80;

const CHUNK_POPULATED: u8 = 0x01;
const CHUNK_HIT: u8 = 0x02;

/// Handle of a chunk inside the registry arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkId(pub usize);

/// State byte of a single field.
///
/// Bits 0-3 hold the cached mine count and are only meaningful once the
/// count-cached bit is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Field(u8);

impl Field {
    pub fn bits(self) -> u8 { self.0 }
    pub fn is_mine(self) -> bool { self.0 & FIELD_MINE != 0 }
    pub fn uncovered(self) -> bool { self.0 & FIELD_UNCOVERED != 0 }
    pub fn flagged(self) -> bool { self.0 & FIELD_FLAG != 0 }

    pub fn cached_mines(self) -> Option<u8> {
        if self.0 & FIELD_MINE_COUNT_CACHED != 0 { Some(self.0 & FIELD_MINE_CACHE_MASK) } else { None }
    }

    pub(crate) fn set_mine(&mut self) { self.0 |= FIELD_MINE; }
    pub(crate) fn uncover(&mut self) { self.0 |= FIELD_UNCOVERED; }
    pub(crate) fn toggle_flag(&mut self) { self.0 ^= FIELD_FLAG; }

    pub(crate) fn cache_mines(&mut self, mines: u8) {
        debug_assert!(mines <= 8);
        self.0 = (self.0 & !FIELD_MINE_CACHE_MASK) | FIELD_MINE_COUNT_CACHED | (mines & FIELD_MINE_CACHE_MASK);
    }
}

/// Slot of the neighbour at offset `(dx, dy)`, both in `-1..=1`.
#[inline]
pub fn neighbor_slot(dx: i32, dy: i32) -> usize {
    debug_assert!((-1..=1).contains(&dx) && (-1..=1).contains(&dy));
    ((dx + 1) + 3 * (dy + 1)) as usize
}

/// Splits an absolute world coordinate into chunk and local coordinates.
/// Chunk coordinates wrap, so negative positions land near `u32::MAX`.
pub fn split_world(w: i64) -> (u32, u32) {
    ((w >> CHUNK_SIZE_LOG2) as u32, (w & i64::from(CHUNK_POS_MAX)) as u32)
}

/// Inverse of [`split_world`] for chunks within `i32` range of the origin.
pub fn world_coord(chunk: u32, local: u32) -> i64 {
    i64::from(chunk as i32) * i64::from(CHUNK_SIZE) + i64::from(local)
}

#[inline]
pub(crate) fn idx(x: u32, y: u32) -> usize { (x + CHUNK_SIZE * y) as usize }

/// A `CHUNK_SIZE` square tile of the infinite field.
///
/// Neighbour slots are handles into the same registry; the centre slot is
/// never set.
#[derive(Clone, Debug)]
pub struct Chunk {
    x: u32,
    y: u32,
    seed: u32,
    flags: u8,
    fields: Box<[Field]>,
    neighbors: [Option<ChunkId>; 9],
}

impl Chunk {
    pub(crate) fn new(x: u32, y: u32, world_seed: u32) -> Self {
        Self {
            x,
            y,
            seed: chunk_seed(x, y, world_seed),
            flags: 0,
            fields: vec![Field::default(); CHUNK_AREA].into_boxed_slice(),
            neighbors: [None; 9],
        }
    }

    pub fn x(&self) -> u32 { self.x }
    pub fn y(&self) -> u32 { self.y }
    pub fn seed(&self) -> u32 { self.seed }
    pub fn populated(&self) -> bool { self.flags & CHUNK_POPULATED != 0 }
    pub fn hit(&self) -> bool { self.flags & CHUNK_HIT != 0 }

    /// Neighbour handle at `(dx, dy)`, if that chunk exists.
    pub fn neighbor(&self, dx: i32, dy: i32) -> Option<ChunkId> { self.neighbors[neighbor_slot(dx, dy)] }

    /// Field at local `(x, y)`; `None` outside the chunk.
    pub fn field(&self, x: u32, y: u32) -> Option<Field> {
        if x < CHUNK_SIZE && y < CHUNK_SIZE { Some(self.fields[idx(x, y)]) } else { None }
    }

    pub fn fields(&self) -> &[Field] { &self.fields }

    pub(crate) fn field_mut(&mut self, x: u32, y: u32) -> &mut Field { &mut self.fields[idx(x, y)] }
    pub(crate) fn fields_mut(&mut self) -> &mut [Field] { &mut self.fields }
    pub(crate) fn set_neighbor(&mut self, dx: i32, dy: i32, id: ChunkId) { self.neighbors[neighbor_slot(dx, dy)] = Some(id); }
    pub(crate) fn mark_populated(&mut self) { self.flags |= CHUNK_POPULATED; }
    pub(crate) fn mark_hit(&mut self) { self.flags |= CHUNK_HIT; }
    pub(crate) fn clear_hit(&mut self) { self.flags &= !CHUNK_HIT; }
}
