use infinite_minesweeper::chunk::{world_coord, CHUNK_SIZE};
use infinite_minesweeper::config::mine_threshold;
use infinite_minesweeper::engine::{Lookup, RevealResult, World};
use infinite_minesweeper::view::ChunkWindow;
use infinite_minesweeper::{ChunkId, GameConfig};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const OFFSETS: [(i32, i32); 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];

fn origin_only() -> ChunkWindow { ChunkWindow { x: 0, y: 0, width: 1, height: 1 } }

fn uncovered(world: &World, id: ChunkId) -> usize {
    world.chunk(id).fields().iter().filter(|f| f.uncovered()).count()
}

fn layout(world: &World, id: ChunkId) -> Vec<bool> {
    world.chunk(id).fields().iter().map(|f| f.is_mine()).collect()
}

/// First non-mine field with no adjacent mines, away from the chunk border.
fn interior_zero(world: &mut World, id: ChunkId) -> (u32, u32) {
    for y in 5..59 {
        for x in 5..59 {
            if world.is_mine(id, x as i32, y as i32) == Lookup::Known(false) && world.mine_count(id, x, y) == Lookup::Known(0) {
                return (x, y);
            }
        }
    }
    panic!("no zero field in chunk");
}

#[test]
fn population_is_deterministic_regardless_of_creation_order() {
    let config = GameConfig::new(77, 10).expect("config");
    let mut coords: Vec<(u32, u32)> = (0..5u32).flat_map(|y| (0..5u32).map(move |x| (x.wrapping_sub(2), y.wrapping_sub(2)))).collect();

    let mut a = World::new(config);
    for &(x, y) in &coords {
        let id = a.chunk_at(x, y);
        a.populate(id);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    coords.shuffle(&mut rng);
    let mut b = World::new(config);
    for &(x, y) in &coords {
        let id = b.chunk_at(x, y);
        b.populate(id);
    }

    for &(x, y) in &coords {
        let ia = a.find_chunk(x, y).unwrap();
        let ib = b.find_chunk(x, y).unwrap();
        assert_eq!(a.chunk(ia).seed(), b.chunk(ib).seed());
        assert_eq!(layout(&a, ia), layout(&b, ib), "layout mismatch at ({x},{y})");
    }
}

#[test]
fn chunk_created_through_neighbour_matches_direct_creation() {
    let config = GameConfig::new(5, 20).expect("config");
    let mut direct = World::new(config);
    let d = direct.chunk_at(3, 7);
    direct.populate(d);

    // (3,7) comes into existence while counting a border field of (2,7).
    let mut world = World::with_visibility(config, |_: u32, _: u32| true);
    let w = world.chunk_at(2, 7);
    assert!(world.find_chunk(3, 7).is_none());
    assert!(world.mine_count(w, CHUNK_SIZE - 1, 10).known().is_some());
    let n = world.find_chunk(3, 7).expect("neighbour created");
    world.populate(n);

    assert_eq!(layout(&direct, d), layout(&world, n));
}

#[test]
fn cached_mine_count_matches_recount() {
    let config = GameConfig::new(999, 15).expect("config");
    let mut world = World::with_visibility(config, |_: u32, _: u32| true);
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    for &(cx, cy) in &[(0u32, 0u32), (u32::MAX, 7)] {
        let id = world.chunk_at(cx, cy);
        for _ in 0..200 {
            let (x, y) = (rng.gen_range(0..CHUNK_SIZE), rng.gen_range(0..CHUNK_SIZE));
            let first = world.mine_count(id, x, y).known().expect("all chunks visible");
            assert_eq!(world.field(id, x, y).unwrap().cached_mines(), Some(first));

            let mut recount = 0;
            for (dx, dy) in OFFSETS {
                if world.is_mine(id, x as i32 + dx, y as i32 + dy) == Lookup::Known(true) { recount += 1; }
            }
            assert_eq!(first, recount, "count mismatch at ({x},{y}) in ({cx},{cy})");
            assert_eq!(world.mine_count(id, x, y), Lookup::Known(first));
        }
    }
}

#[test]
fn out_of_range_coordinates_are_reported() {
    let mut world = World::new(GameConfig::default());
    let id = world.chunk_at(0, 0);
    assert_eq!(world.mine_count(id, CHUNK_SIZE, 0), Lookup::OutOfRange);
    assert_eq!(world.is_mine(id, 200, 0), Lookup::OutOfRange);
    assert_eq!(world.is_mine(id, -65, 3), Lookup::OutOfRange);
    assert_eq!(world.uncover(id, 3, 300), RevealResult::NoOp);
}

#[test]
fn border_count_is_indeterminate_while_out_of_view() {
    let mut world = World::new(GameConfig::default());
    let id = world.chunk_at(0, 0);
    assert_eq!(world.mine_count(id, 0, 10), Lookup::Indeterminate);
    assert_eq!(world.field(id, 0, 10).unwrap().cached_mines(), None);
    assert_eq!(world.is_mine(id, -1, 10), Lookup::Indeterminate);
    // Interior fields never leave the chunk.
    assert!(world.mine_count(id, 10, 10).known().is_some());
}

#[test]
fn nonzero_field_reveals_only_itself() {
    let mut world = World::new(GameConfig::new(42, 10).expect("config"));
    let id = world.chunk_at(0, 0);
    let (x, y) = (1..CHUNK_SIZE - 1)
        .flat_map(|y| (1..CHUNK_SIZE - 1).map(move |x| (x, y)))
        .find(|&(x, y)| {
            world.is_mine(id, x as i32, y as i32) == Lookup::Known(false)
                && world.mine_count(id, x, y).known().is_some_and(|n| n > 0)
        })
        .expect("a numbered field");

    assert_eq!(world.uncover_in_bounds(id, x, y), RevealResult::RevealedSafe(1));
    assert_eq!(uncovered(&world, id), 1);
    assert_eq!(world.uncover_in_bounds(id, x, y), RevealResult::NoOp);
}

#[test]
fn zero_field_reveals_connected_region_and_its_border() {
    let mut world = World::with_visibility(GameConfig::new(42, 10).expect("config"), origin_only());
    let origin = world.chunk_at(0, 0);
    let start = interior_zero(&mut world, origin);

    let res = world.uncover_in_bounds(origin, start.0, start.1);
    assert!(matches!(res, RevealResult::RevealedSafe(n) if n > 1), "{res:?}");
    assert!(world.alive());

    let chunks: Vec<ChunkId> = world.chunks().map(|(id, _)| id).collect();
    for id in chunks {
        let (cx, cy) = (world.chunk(id).x(), world.chunk(id).y());
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let f = world.field(id, x, y).unwrap();
                if !f.uncovered() { continue; }
                assert!(!f.is_mine());
                let (wx, wy) = (world_coord(cx, x), world_coord(cy, y));
                let around: Vec<_> = OFFSETS.iter().map(|&(dx, dy)| world.field_at(wx + i64::from(dx), wy + i64::from(dy))).collect();

                // Every uncovered field was reached from an uncovered zero field.
                if id != origin || (x, y) != start {
                    assert!(
                        around.iter().flatten().any(|g| g.uncovered() && g.cached_mines() == Some(0)),
                        "({wx},{wy}) uncovered without a zero neighbour"
                    );
                }
                // Zero fields in view opened their whole neighbourhood.
                if id == origin {
                    let mines = f.cached_mines().expect("count known in view");
                    if mines == 0 {
                        assert!(around.iter().all(|g| g.is_some_and(|g| g.uncovered())), "({wx},{wy}) left neighbours covered");
                    }
                }
            }
        }
    }
}

#[test]
fn flags_wall_off_the_flood() {
    let mut world = World::new(GameConfig::with_threshold(3, u32::MAX));
    let id = world.chunk_at(0, 0);
    for y in 0..CHUNK_SIZE {
        assert!(world.toggle_flag(id, 10, y));
    }

    assert_eq!(world.uncover_in_bounds(id, 5, 5), RevealResult::RevealedSafe(10 * CHUNK_SIZE as usize));
    for y in 0..CHUNK_SIZE {
        assert!(world.field(id, 9, y).unwrap().uncovered());
        let wall = world.field(id, 10, y).unwrap();
        assert!(wall.flagged() && !wall.uncovered());
        assert!(!world.field(id, 11, y).unwrap().uncovered());
    }

    // A flag blocks a direct reveal too.
    assert_eq!(world.uncover_in_bounds(id, 10, 3), RevealResult::NoOp);
}

#[test]
fn flag_toggles_only_covered_fields() {
    let mut world = World::new(GameConfig::with_threshold(3, u32::MAX));
    let id = world.chunk_at(4, 4);
    assert!(world.toggle_flag(id, 20, 20));
    assert!(world.field(id, 20, 20).unwrap().flagged());
    assert!(world.toggle_flag(id, 20, 20));
    assert!(!world.field(id, 20, 20).unwrap().flagged());

    let _ = world.uncover_in_bounds(id, 30, 30);
    assert!(world.field(id, 30, 30).unwrap().uncovered());
    assert!(!world.toggle_flag(id, 30, 30));
    assert!(!world.field(id, 30, 30).unwrap().flagged());
    assert!(!world.toggle_flag(id, CHUNK_SIZE, 0));
}

#[test]
fn always_mine_world_kills_on_first_reveal() {
    let config = GameConfig::new(8, 100).expect("config");
    assert_eq!(config.mine_threshold, 0);
    let mut world = World::with_visibility(config, |_: u32, _: u32| true);
    let id = world.chunk_at(12, 34);
    for (x, y) in [(0, 0), (17, 40), (-1, -1), (CHUNK_SIZE as i32, 5), (63, 63)] {
        assert_eq!(world.is_mine(id, x, y), Lookup::Known(true));
    }
    assert_eq!(world.mine_count(id, 30, 30), Lookup::Known(8));

    assert!(world.toggle_flag(id, 2, 2));
    assert_eq!(world.uncover_in_bounds(id, 2, 2), RevealResult::NoOp);
    assert!(world.alive());

    assert_eq!(world.uncover_in_bounds(id, 5, 6), RevealResult::HitMine);
    assert!(world.is_dead());
    assert!(world.field(id, 5, 6).unwrap().uncovered());
}

#[test]
fn dead_world_ignores_every_mutation() {
    let mut world = World::new(GameConfig::new(1, 100).expect("config"));
    let id = world.chunk_at(0, 0);
    assert_eq!(world.uncover(id, 3, 3), RevealResult::HitMine);

    let before: Vec<u8> = world.chunk(id).fields().iter().map(|f| f.bits()).collect();
    assert_eq!(world.uncover(id, 4, 4), RevealResult::NoOp);
    assert_eq!(world.uncover_in_bounds(id, 5, 5), RevealResult::NoOp);
    assert!(!world.toggle_flag(id, 6, 6));
    assert_eq!(world.check_covered_fields(id), 0);
    let after: Vec<u8> = world.chunk(id).fields().iter().map(|f| f.bits()).collect();
    assert_eq!(before, after);
    assert!(world.is_dead());
}

#[test]
fn near_zero_mines_floods_whole_chunk_and_touches_neighbours() {
    assert_eq!(mine_threshold(0), 4_294_967_200);
    let mut world = World::with_visibility(GameConfig::new(0, 0).expect("config"), origin_only());
    let origin = world.get_chunk_by_pos(0, 0, true).expect("created");

    let res = world.uncover_in_bounds(origin, 0, 0);
    assert!(matches!(res, RevealResult::RevealedSafe(_)));
    assert_eq!(uncovered(&world, origin), CHUNK_SIZE as usize * CHUNK_SIZE as usize);

    let east = world.get_chunk_by_pos(1, 0, false).expect("east neighbour touched");
    assert!(world.field(east, 0, 0).unwrap().uncovered());
    let west = world.find_chunk(u32::MAX, 0).expect("west neighbour touched");
    assert!(world.field(west, CHUNK_SIZE - 1, 32).unwrap().uncovered());
}

#[test]
fn flood_without_visible_chunks_stays_in_its_chunk() {
    let mut world = World::new(GameConfig::with_threshold(0, u32::MAX));
    let id = world.chunk_at(0, 0);

    // A corner looks into neighbours, so its count is unknown and it stops.
    assert_eq!(world.uncover_in_bounds(id, 0, 0), RevealResult::RevealedSafe(1));
    assert_eq!(world.uncover_in_bounds(id, 5, 5), RevealResult::RevealedSafe(4095));
    for (nid, chunk) in world.chunks() {
        if nid != id {
            assert!(chunk.fields().iter().all(|f| !f.uncovered()));
            assert!(chunk.hit());
        }
    }
}

#[test]
fn uncover_accepts_coordinates_in_neighbouring_chunk() {
    let mut world = World::with_visibility(GameConfig::new(42, 10).expect("config"), origin_only());
    let origin = world.chunk_at(0, 0);
    let res = world.uncover(origin, -1, 20);
    assert_ne!(res, RevealResult::NoOp);

    let west = world.find_chunk(u32::MAX, 0).expect("west chunk");
    assert!(world.field(west, CHUNK_SIZE - 1, 20).unwrap().uncovered());
    assert_eq!(world.uncover(origin, -1, 20), RevealResult::NoOp);
}
