//! A rectangular window onto the infinite field, shared by the CLI and TUI.

use std::fmt::Write as _;

use crate::chunk::split_world;
use crate::engine::{Lookup, RevealResult, Visibility, World};
use crate::error::{GameError, GameResult};

pub const COVERED: char = '·';

/// Rectangle of chunk coordinates; wraps around like the coordinates do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Visibility for ChunkWindow {
    fn is_visible(&self, x: u32, y: u32) -> bool {
        x.wrapping_sub(self.x) < self.width && y.wrapping_sub(self.y) < self.height
    }
}

/// Fields shown on screen: top-left world position plus size in fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    x: i64,
    y: i64,
    width: usize,
    height: usize,
}

impl Viewport {
    pub fn new(x: i64, y: i64, width: usize, height: usize) -> GameResult<Self> {
        if width == 0 || height == 0 { return Err(GameError::EmptyView); }
        Ok(Self { x, y, width, height })
    }

    pub fn x(&self) -> i64 { self.x }
    pub fn y(&self) -> i64 { self.y }
    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    pub fn resize(&mut self, width: usize, height: usize) -> GameResult<()> {
        if width == 0 || height == 0 { return Err(GameError::EmptyView); }
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn centre_on(&mut self, wx: i64, wy: i64) {
        self.x = wx.wrapping_sub(self.width as i64 / 2);
        self.y = wy.wrapping_sub(self.height as i64 / 2);
    }

    /// Scrolls the least amount needed for `(wx, wy)` to be on screen.
    /// Positions wrap at the `i64` edge, like chunk coordinates do.
    pub fn scroll_to_include(&mut self, wx: i64, wy: i64) {
        self.x = scroll_axis(self.x, self.width, wx);
        self.y = scroll_axis(self.y, self.height, wy);
    }

    pub fn contains(&self, wx: i64, wy: i64) -> bool {
        (wx.wrapping_sub(self.x) as u64) < self.width as u64 && (wy.wrapping_sub(self.y) as u64) < self.height as u64
    }

    fn last_x(&self) -> i64 { self.x.wrapping_add(self.width as i64 - 1) }
    fn last_y(&self) -> i64 { self.y.wrapping_add(self.height as i64 - 1) }

    /// Every chunk overlapping the viewport.
    pub fn chunk_window(&self) -> ChunkWindow {
        let (x0, _) = split_world(self.x);
        let (y0, _) = split_world(self.y);
        let (x1, _) = split_world(self.last_x());
        let (y1, _) = split_world(self.last_y());
        ChunkWindow { x: x0, y: y0, width: x1.wrapping_sub(x0) + 1, height: y1.wrapping_sub(y0) + 1 }
    }

    pub fn render(&self, world: &mut World, show_all: bool) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "x {}..{}  y {}..{}", self.x, self.last_x(), self.y, self.last_y());
        // Column header: last digit of each column
        s.push_str("        ");
        for col in 0..self.width as i64 {
            let _ = write!(s, "{} ", self.x.wrapping_add(col).rem_euclid(10));
        }
        s.push('\n');
        s.push_str("       ");
        s.push_str(&"-".repeat(self.width * 2 + 1));
        s.push('\n');

        for row in 0..self.height as i64 {
            let wy = self.y.wrapping_add(row);
            let _ = write!(s, "{:>6} | ", wy);
            for col in 0..self.width as i64 {
                let _ = write!(s, "{} ", glyph(world, self.x.wrapping_add(col), wy, show_all));
            }
            s.push('\n');
        }
        s
    }
}

fn scroll_axis(start: i64, len: usize, target: i64) -> i64 {
    let offset = target.wrapping_sub(start);
    if offset < 0 {
        target
    } else if offset >= len as i64 {
        target.wrapping_sub(len as i64 - 1)
    } else {
        start
    }
}

/// Character for the field at world `(wx, wy)`. Unexplored chunks are not
/// created unless `show_all` asks for their mines.
pub fn glyph(world: &mut World, wx: i64, wy: i64, show_all: bool) -> char {
    let (cx, x) = split_world(wx);
    let (cy, y) = split_world(wy);
    let id = if show_all {
        world.chunk_at(cx, cy)
    } else {
        match world.find_chunk(cx, cy) { Some(id) => id, None => return COVERED }
    };
    world.populate(id);
    let Some(f) = world.field(id, x, y) else { return COVERED };

    let exposed = show_all || world.is_dead();
    if f.flagged() {
        if world.is_dead() && !f.is_mine() { 'X' } else { 'F' }
    } else if f.uncovered() && f.is_mine() {
        '@'
    } else if exposed && f.is_mine() {
        '*'
    } else if f.uncovered() {
        match world.mine_count(id, x, y) {
            Lookup::Known(0) => ' ',
            Lookup::Known(n) => char::from_digit(u32::from(n), 10).unwrap_or('?'),
            _ => '?',
        }
    } else {
        COVERED
    }
}

/// Reveals the field at world `(wx, wy)`; a flagged field loses its flag
/// instead.
pub fn reveal_at(world: &mut World, wx: i64, wy: i64) -> RevealResult {
    let (cx, x) = split_world(wx);
    let (cy, y) = split_world(wy);
    let id = world.chunk_at(cx, cy);
    if world.field(id, x, y).is_some_and(|f| f.flagged()) {
        world.toggle_flag(id, x, y);
        return RevealResult::NoOp;
    }
    world.uncover_in_bounds(id, x, y)
}

pub fn flag_at(world: &mut World, wx: i64, wy: i64) -> bool {
    let (cx, x) = split_world(wx);
    let (cy, y) = split_world(wy);
    let id = world.chunk_at(cx, cy);
    world.toggle_flag(id, x, y)
}
