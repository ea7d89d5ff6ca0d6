//! Scrolls a synthetic 2048x1024 px landscape over a simulated 64x32 tile
//! plane and cross-checks the streamed buffer against a direct decode.

use embedded_graphics::prelude::{Point, Size};
use log::{error, info};
use tilestream::map::{Map, MapDefinition, PaletteId, TilesetId};
use tilestream::plane::{Plane, PlaneConfig};
use tilestream::tile::{MetaTileAttr, TileAttr};
use tilestream::transfer::{CommandQueue, TransferCommand};

const PLANE_W: u32 = 64;
const PLANE_H: u32 = 32;
const VIEW_W: u32 = 320;
const VIEW_H: u32 = 224;
const MAP_W: u16 = 16;
const MAP_H: u16 = 8;
const FRAMES: u32 = 600;

// Metatile numbers used by the blocks below.
const GRASS: u16 = 0;
const WATER: u16 = 1;
const ROCK: u16 = 2;
const PATH: u16 = 3;

struct MapTables {
    metatiles: Vec<u16>,
    blocks: Vec<u16>,
    block_indexes: Vec<u16>,
    block_row_offsets: Vec<u16>,
}

impl MapTables {
    fn def(&self) -> MapDefinition<'_> {
        MapDefinition {
            width: MAP_W,
            height: MAP_H,
            palette: PaletteId(0),
            tileset: TilesetId(0),
            metatiles: &self.metatiles,
            blocks: &self.blocks,
            block_indexes: &self.block_indexes,
            block_row_offsets: &self.block_row_offsets,
        }
    }
}

// What the asset pipeline would emit for a small landscape: four metatiles,
// three unique blocks, and a heavily deduplicated 16x8 block index.
fn build_tables() -> MapTables {
    let mut metatiles = Vec::new();
    for meta in 0..4u16 {
        for quadrant in 0..4u16 {
            let priority = meta == PATH && quadrant < 2;
            metatiles.push(TileAttr::new(priority, (meta % 4) as u8, false, false, meta * 4 + quadrant).0);
        }
    }

    let mut blocks = Vec::new();
    // Plains: grass with scattered rocks, mirrored on alternating cells.
    for cell in 0..64u16 {
        let (x, y) = (cell % 8, cell / 8);
        if (x + y) % 7 == 0 {
            blocks.push(MetaTileAttr::new(false, false, x % 2 == 1, ROCK).0);
        } else {
            blocks.push(MetaTileAttr::new(false, false, false, GRASS).0);
        }
    }
    // Lake: water with a grass shore.
    for cell in 0..64u16 {
        let (x, y) = (cell % 8, cell / 8);
        let shore = x == 0 || x == 7 || y == 0 || y == 7;
        let meta = if shore { GRASS } else { WATER };
        blocks.push(MetaTileAttr::new(false, false, false, meta).0);
    }
    // Trail: a prioritized path band through grass.
    for cell in 0..64u16 {
        let y = cell / 8;
        if y == 3 || y == 4 {
            blocks.push(MetaTileAttr::new(y == 3, false, false, PATH).0);
        } else {
            blocks.push(MetaTileAttr::new(false, false, false, GRASS).0);
        }
    }

    let mut block_indexes = Vec::new();
    let mut block_row_offsets = Vec::new();
    for y in 0..MAP_H {
        block_row_offsets.push(y * MAP_W);
        for x in 0..MAP_W {
            let block = if y == 5 {
                2
            } else if (3..6).contains(&x) && (1..4).contains(&y) {
                1
            } else {
                0
            };
            block_indexes.push(block);
        }
    }

    MapTables {
        metatiles,
        blocks,
        block_indexes,
        block_row_offsets,
    }
}

struct PlaneRam {
    tiles: Vec<u16>,
    scroll: (i32, i32),
}

impl PlaneRam {
    fn new() -> PlaneRam {
        PlaneRam {
            tiles: vec![0; (PLANE_W * PLANE_H) as usize],
            scroll: (0, 0),
        }
    }

    fn apply(&mut self, command: TransferCommand) {
        match command {
            TransferCommand::Tile { addr, attr, .. } => self.tiles[addr as usize] = attr.0,
            TransferCommand::Scroll { x, y, .. } => self.scroll = (x, y),
        }
    }

    // The streamed window is pulled back at the map edge the same way the
    // scroller pulls it back, then compared cell by cell.
    fn window_mismatches(&self, map: &Map<'_>, pos: Point) -> u32 {
        let cols = (VIEW_W / 8 + 1) as i32;
        let rows = (VIEW_H / 8 + 1) as i32;
        let xt = (pos.x / 8).min(MAP_W as i32 * 16 - cols);
        let yt = (pos.y / 8).min(MAP_H as i32 * 16 - rows);
        let mut mismatches = 0;
        for row in 0..rows {
            let y = (yt + row) as u32;
            for col in 0..cols {
                let x = (xt + col) as u32;
                let addr = (y & (PLANE_H - 1)) * PLANE_W + (x & (PLANE_W - 1));
                let expected = map.get_tile(x, y).merge(map.base_attr());
                if self.tiles[addr as usize] != expected.0 {
                    mismatches += 1;
                }
            }
        }
        mismatches
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let tables = build_tables();
    let def = tables.def();
    let config = PlaneConfig::new(PLANE_W, PLANE_H, Size::new(VIEW_W, VIEW_H));
    let base = TileAttr::new(false, 0, false, false, 0x100);
    let mut map = Map::new(&def, Plane::A, base, config).expect("map setup");

    let mut queue: CommandQueue<4096> = CommandQueue::new();
    let (mut sink, mut drain) = queue.split();
    let mut ram = PlaneRam::new();
    let mut rng = oorandom::Rand32::new(0x5eed);

    let max_x = (MAP_W as u32 * 128 - VIEW_W) as i32;
    let max_y = (MAP_H as u32 * 128 - VIEW_H) as i32;
    let mut pos = Point::zero();
    let mut velocity = Point::new(3, 1);

    let mut total_writes: u64 = 0;
    let mut peak_writes = 0;
    let mut bad_frames = 0;

    for frame in 0..FRAMES {
        if rng.rand_range(0..60) == 0 {
            velocity = Point::new(
                rng.rand_range(0..17) as i32 - 8,
                rng.rand_range(0..17) as i32 - 8,
            );
        }
        if rng.rand_range(0..240) == 0 {
            // Teleport, as a level transition would.
            pos = Point::new(
                rng.rand_range(0..max_x as u32 + 1) as i32,
                rng.rand_range(0..max_y as u32 + 1) as i32,
            );
        }
        pos.x = (pos.x + velocity.x).clamp(0, max_x);
        pos.y = (pos.y + velocity.y).clamp(0, max_y);

        map.scroll_to(&mut sink, pos);

        // Vertical-blank side: drain everything this frame produced.
        let mut writes = 0;
        while let Some(command) = drain.pop() {
            if matches!(command, TransferCommand::Tile { .. }) {
                writes += 1;
            }
            ram.apply(command);
        }
        total_writes += writes as u64;
        peak_writes = peak_writes.max(writes);

        if frame % 120 == 0 {
            let mismatches = ram.window_mismatches(&map, pos);
            if mismatches > 0 {
                error!("frame {frame}: {mismatches} stale tiles in the visible window");
                bad_frames += 1;
            }
        }
    }

    let mismatches = ram.window_mismatches(&map, pos);
    if mismatches > 0 || bad_frames > 0 {
        error!("finished with {bad_frames} bad frames, {mismatches} stale tiles at rest");
    }
    info!(
        "{FRAMES} frames: {total_writes} tile writes total, {:.1} avg / {peak_writes} peak per frame, {} dropped, scroll at {:?}",
        total_writes as f64 / FRAMES as f64,
        sink.dropped(),
        ram.scroll,
    );
}
