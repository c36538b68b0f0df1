use tracing::{debug, trace};

use crate::chunk::{idx, split_world, Chunk, ChunkId, Field, CHUNK_POS_MAX, CHUNK_SIZE, CHUNK_SIZE_LOG2};
use crate::config::GameConfig;
use crate::registry::ChunkRegistry;
use crate::rng::XorShift32;

/// Result of a query that may need data from a chunk that is out of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Known(T),
    /// Depends on a chunk gated by visibility; ask again later.
    Indeterminate,
    /// Local coordinates more than one chunk away.
    OutOfRange,
}

impl<T> Lookup<T> {
    pub fn known(self) -> Option<T> {
        match self { Lookup::Known(v) => Some(v), _ => None }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealResult {
    NoOp,
    /// Number of fields newly uncovered.
    RevealedSafe(usize),
    HitMine,
}

/// Tells the world which chunks a viewer can currently see.
pub trait Visibility {
    fn is_visible(&self, x: u32, y: u32) -> bool;
}

impl<F: Fn(u32, u32) -> bool> Visibility for F {
    fn is_visible(&self, x: u32, y: u32) -> bool { self(x, y) }
}

type Pending = Vec<(ChunkId, i32, i32)>;

/// The whole game: configuration, every generated chunk and the dead flag.
///
/// A new world treats every chunk as out of view until [`World::set_visibility`]
/// installs something else, which keeps flood fills bounded.
pub struct World {
    config: GameConfig,
    chunks: ChunkRegistry,
    visibility: Box<dyn Visibility>,
    dead: bool,
}

impl World {
    pub fn new(config: GameConfig) -> Self {
        Self { config, chunks: ChunkRegistry::new(), visibility: Box::new(|_: u32, _: u32| false), dead: false }
    }

    pub fn with_visibility(config: GameConfig, visibility: impl Visibility + 'static) -> Self {
        let mut world = Self::new(config);
        world.visibility = Box::new(visibility);
        world
    }

    /// Installs a new visibility and rechecks chunks that came into view.
    /// Returns the number of fields uncovered by the recheck.
    pub fn set_visibility(&mut self, visibility: impl Visibility + 'static) -> usize {
        self.visibility = Box::new(visibility);
        self.recheck_visible()
    }

    /// Runs [`World::check_covered_fields`] on every visible chunk carrying the
    /// out-of-view hit flag, clearing the flag.
    pub fn recheck_visible(&mut self) -> usize {
        let due: Vec<ChunkId> = self
            .chunks
            .iter()
            .filter(|(_, c)| c.hit() && self.visibility.is_visible(c.x(), c.y()))
            .map(|(id, _)| id)
            .collect();
        if due.is_empty() { return 0; }
        debug!(chunks = due.len(), "rechecking chunks that came into view");

        let mut revealed = 0;
        for id in due {
            self.chunks.get_mut(id).clear_hit();
            revealed += self.check_covered_fields(id);
        }
        revealed
    }

    pub fn get_chunk_by_pos(&mut self, x: u32, y: u32, create: bool) -> Option<ChunkId> {
        if create { Some(self.chunk_at(x, y)) } else { self.find_chunk(x, y) }
    }

    pub fn find_chunk(&self, x: u32, y: u32) -> Option<ChunkId> { self.chunks.find(x, y) }

    pub fn chunk_at(&mut self, x: u32, y: u32) -> ChunkId { self.chunks.get_or_create(x, y, self.config.seed) }

    /// Neighbour of `id` at `(dx, dy)`, created and linked if missing.
    ///
    /// When neither chunk is visible the neighbour still joins the graph but
    /// `None` is returned and both chunks are marked for a recheck once they
    /// come into view.
    pub fn get_neighbor(&mut self, id: ChunkId, dx: i32, dy: i32) -> Option<ChunkId> {
        if !(-1..=1).contains(&dx) || !(-1..=1).contains(&dy) { return None; }
        if dx == 0 && dy == 0 { return Some(id); }

        let n = match self.chunks.get(id).neighbor(dx, dy) {
            Some(n) => n,
            None => {
                let c = self.chunks.get(id);
                let (x, y) = (c.x().wrapping_add_signed(dx), c.y().wrapping_add_signed(dy));
                self.chunks.create(x, y, self.config.seed)
            }
        };

        if !self.is_visible(id) && !self.is_visible(n) {
            trace!(from = ?id, to = ?n, "neighbour out of view");
            self.chunks.get_mut(n).mark_hit();
            self.chunks.get_mut(id).mark_hit();
            return None;
        }
        Some(n)
    }

    /// Rebases local coordinates that may spill one chunk in any direction.
    fn correct_pos(&mut self, id: ChunkId, x: i32, y: i32) -> Lookup<(ChunkId, u32, u32)> {
        let ox = x >> CHUNK_SIZE_LOG2;
        let oy = y >> CHUNK_SIZE_LOG2;
        if !(-1..=1).contains(&ox) || !(-1..=1).contains(&oy) { return Lookup::OutOfRange; }
        if ox == 0 && oy == 0 { return Lookup::Known((id, x as u32, y as u32)); }

        let size = CHUNK_SIZE as i32;
        match self.get_neighbor(id, ox, oy) {
            Some(n) => Lookup::Known((n, (x - ox * size) as u32, (y - oy * size) as u32)),
            None => Lookup::Indeterminate,
        }
    }

    /// Generates the mine layout of `id` on first use.
    pub fn populate(&mut self, id: ChunkId) {
        let threshold = self.config.mine_threshold;
        let chunk = self.chunks.get_mut(id);
        if chunk.populated() { return; }

        let stream = XorShift32::new(chunk.seed());
        for (field, value) in chunk.fields_mut().iter_mut().zip(stream) {
            if value > threshold { field.set_mine(); }
        }
        chunk.mark_populated();
    }

    pub fn is_mine(&mut self, id: ChunkId, x: i32, y: i32) -> Lookup<bool> {
        let (id, x, y) = match self.correct_pos(id, x, y) {
            Lookup::Known(pos) => pos,
            Lookup::Indeterminate => return Lookup::Indeterminate,
            Lookup::OutOfRange => return Lookup::OutOfRange,
        };
        self.populate(id);
        Lookup::Known(self.field_ref(id, x, y).is_mine())
    }

    /// Mines around local `(x, y)`, cached once every neighbour was readable.
    pub fn mine_count(&mut self, id: ChunkId, x: u32, y: u32) -> Lookup<u8> {
        if x >= CHUNK_SIZE || y >= CHUNK_SIZE { return Lookup::OutOfRange; }
        self.populate(id);
        if let Some(mines) = self.field_ref(id, x, y).cached_mines() { return Lookup::Known(mines); }

        let mut mines = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 { continue; }
                match self.is_mine(id, x as i32 + dx, y as i32 + dy) {
                    Lookup::Known(true) => mines += 1,
                    Lookup::Known(false) => {}
                    _ => return Lookup::Indeterminate,
                }
            }
        }

        self.chunks.get_mut(id).field_mut(x, y).cache_mines(mines);
        Lookup::Known(mines)
    }

    pub fn uncover_in_bounds(&mut self, id: ChunkId, x: u32, y: u32) -> RevealResult {
        if self.dead || x >= CHUNK_SIZE || y >= CHUNK_SIZE { return RevealResult::NoOp; }
        if self.field_ref(id, x, y).uncovered() { return RevealResult::NoOp; }
        self.flood(id, x, y)
    }

    /// Like [`World::uncover_in_bounds`] but accepts coordinates one chunk
    /// outside of `id`.
    pub fn uncover(&mut self, id: ChunkId, x: i32, y: i32) -> RevealResult {
        if self.dead { return RevealResult::NoOp; }
        let Lookup::Known((id, x, y)) = self.correct_pos(id, x, y) else { return RevealResult::NoOp };
        if self.field_ref(id, x, y).uncovered() { return RevealResult::NoOp; }
        self.flood(id, x, y)
    }

    /// Reveals `(x, y)` even if it is already uncovered, then spreads through
    /// zero-count fields until nothing changes.
    fn flood(&mut self, id: ChunkId, x: u32, y: u32) -> RevealResult {
        let mut pending = Pending::new();
        let mut revealed = 0;
        if !self.reveal_field(id, x, y, &mut pending, &mut revealed) { return RevealResult::HitMine; }

        while let Some((c, x, y)) = pending.pop() {
            let Lookup::Known((c, x, y)) = self.correct_pos(c, x, y) else { continue };
            if self.field_ref(c, x, y).uncovered() { continue; }
            if !self.reveal_field(c, x, y, &mut pending, &mut revealed) { return RevealResult::HitMine; }
        }

        if revealed == 0 { RevealResult::NoOp } else { RevealResult::RevealedSafe(revealed) }
    }

    /// Uncovers one field and queues its neighbours if it borders no mines.
    /// Returns false when the field was a mine.
    fn reveal_field(&mut self, id: ChunkId, x: u32, y: u32, pending: &mut Pending, revealed: &mut usize) -> bool {
        self.populate(id);
        let field = self.chunks.get_mut(id).field_mut(x, y);
        if field.flagged() { return true; }
        if !field.uncovered() { *revealed += 1; }
        field.uncover();
        if field.is_mine() {
            let c = self.chunks.get(id);
            debug!(chunk_x = c.x(), chunk_y = c.y(), x, y, "uncovered a mine");
            self.dead = true;
            return false;
        }

        if self.mine_count(id, x, y) == Lookup::Known(0) {
            let (x, y) = (x as i32, y as i32);
            // Reversed so pops walk the neighbourhood row by row.
            for dy in (-1..=1).rev() {
                for dx in (-1..=1).rev() {
                    if dx == 0 && dy == 0 { continue; }
                    pending.push((id, x + dx, y + dy));
                }
            }
        }
        true
    }

    pub fn toggle_flag(&mut self, id: ChunkId, x: u32, y: u32) -> bool {
        if self.dead || x >= CHUNK_SIZE || y >= CHUNK_SIZE { return false; }
        let field = self.chunks.get_mut(id).field_mut(x, y);
        if field.uncovered() { return false; }
        field.toggle_flag();
        true
    }

    /// Carries flood fills across the borders of `id` that could not be
    /// crossed while it was out of view. Returns the number of fields
    /// uncovered.
    pub fn check_covered_fields(&mut self, id: ChunkId) -> usize {
        if self.dead { return 0; }
        let mut roots = Vec::new();

        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 { continue; }
                let Some(n) = self.chunks.get(id).neighbor(dx, dy) else { continue };
                for ((nx, ny), (x, y)) in border_pairs(dx, dy) {
                    if self.field_ref(n, nx, ny).uncovered() && self.mine_count(n, nx, ny) == Lookup::Known(0) {
                        roots.push((x, y));
                    }
                }
            }
        }

        // Own border fields whose propagation stopped on an indeterminate count.
        for (x, y) in border_fields() {
            if self.field_ref(id, x, y).uncovered() && self.mine_count(id, x, y) == Lookup::Known(0) {
                roots.push((x, y));
            }
        }

        let mut revealed = 0;
        for (x, y) in roots {
            match self.flood(id, x, y) {
                RevealResult::RevealedSafe(n) => revealed += n,
                RevealResult::HitMine => break,
                RevealResult::NoOp => {}
            }
        }
        revealed
    }

    fn is_visible(&self, id: ChunkId) -> bool {
        let c = self.chunks.get(id);
        self.visibility.is_visible(c.x(), c.y())
    }

    fn field_ref(&self, id: ChunkId, x: u32, y: u32) -> Field { self.chunks.get(id).fields()[idx(x, y)] }
}

/// For the neighbour at `(dx, dy)`: pairs of (its bordering field, our field).
fn border_pairs(dx: i32, dy: i32) -> impl Iterator<Item = ((u32, u32), (u32, u32))> {
    let axis = |d: i32, i: u32| match d {
        -1 => (CHUNK_POS_MAX, 0),
        1 => (0, CHUNK_POS_MAX),
        _ => (i, i),
    };
    let len = if dx == 0 || dy == 0 { CHUNK_SIZE } else { 1 };
    (0..len).map(move |i| {
        let (nx, x) = axis(dx, i);
        let (ny, y) = axis(dy, i);
        ((nx, ny), (x, y))
    })
}

fn border_fields() -> impl Iterator<Item = (u32, u32)> {
    (0..CHUNK_SIZE)
        .flat_map(|y| (0..CHUNK_SIZE).map(move |x| (x, y)))
        .filter(|&(x, y)| x == 0 || y == 0 || x == CHUNK_POS_MAX || y == CHUNK_POS_MAX)
}

// Public getters for encapsulation
impl World {
    pub fn config(&self) -> GameConfig { self.config }
    pub fn seed(&self) -> u32 { self.config.seed }
    pub fn mine_threshold(&self) -> u32 { self.config.mine_threshold }
    pub fn is_dead(&self) -> bool { self.dead }
    pub fn alive(&self) -> bool { !self.dead }
    pub fn chunk(&self, id: ChunkId) -> &Chunk { self.chunks.get(id) }
    pub fn chunk_count(&self) -> usize { self.chunks.len() }
    pub fn chunks(&self) -> impl Iterator<Item = (ChunkId, &Chunk)> { self.chunks.iter() }

    pub fn field(&self, id: ChunkId, x: u32, y: u32) -> Option<Field> { self.chunks.get(id).field(x, y) }

    /// Field at absolute world coordinates, if its chunk exists.
    pub fn field_at(&self, wx: i64, wy: i64) -> Option<Field> {
        let (cx, x) = split_world(wx);
        let (cy, y) = split_world(wy);
        self.find_chunk(cx, cy).and_then(|id| self.field(id, x, y))
    }
}
