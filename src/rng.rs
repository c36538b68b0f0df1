//! Deterministic bit mixing used for all world generation.

/// One xorshift32 step. Zero maps to zero, so callers keep their state odd.
#[inline]
pub fn xorshift32(mut x: u32) -> u32 {
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    x
}

/// Seed of the chunk at `(x, y)`, always odd.
pub fn chunk_seed(x: u32, y: u32, world_seed: u32) -> u32 {
    xorshift32(xorshift32(xorshift32(x) ^ y) ^ world_seed) | 1
}

/// Stream of xorshift32 values starting after `state`.
pub struct XorShift32 { state: u32 }

impl XorShift32 {
    pub fn new(seed: u32) -> Self { Self { state: seed } }

    pub fn next_u32(&mut self) -> u32 {
        self.state = xorshift32(self.state);
        self.state
    }
}

impl Iterator for XorShift32 {
    type Item = u32;

    fn next(&mut self) -> Option<u32> { Some(self.next_u32()) }
}
