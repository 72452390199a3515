//! Seeded initial layout.
//!
//! A game starts on a rectangular grid of cells:
//! - One HQ per player, spread evenly around an inset perimeter
//! - Four territory markers around each HQ
//! - Neutral wall blocks scattered on the remaining cells, kept clear of
//!   every spawn site
//!
//! Generation is a pure function of [`GameData`]. The layout lists
//! placements in seeding order, which is also the id order the world
//! assigns.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::components::{GameData, PlayerId, UnitType, NEUTRAL_PLAYER};
use crate::error::Result;
use crate::math::{Fixed, Vec2Fixed};

/// Side length of one grid cell in world units.
pub const CELL_SIZE: u32 = 8;

/// Cells between the map edge and the ring spawns are placed on.
const SPAWN_INSET: u32 = 2;

/// Cells between an HQ and each of its territory markers.
const TERRITORY_OFFSET: u32 = 2;

/// Blocks never land within this many cells (Chebyshev) of a spawn.
const SPAWN_CLEARANCE: u32 = 3;

/// Deterministic linear congruential generator for layout seeding.
#[derive(Debug, Clone)]
struct MapRng {
    state: u64,
}

impl MapRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        // Low bits of an LCG cycle quickly; use the high half
        self.state >> 32
    }

    /// Uniform-ish value in `[min, max)`. Returns `min` for an empty range.
    fn next_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = u64::from(max - min);
        #[allow(clippy::cast_possible_truncation)]
        let offset = (self.next() % span) as u32;
        min + offset
    }
}

/// One unit to seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Type of unit.
    pub unit_type: UnitType,
    /// Owner ([`NEUTRAL_PLAYER`] for blocks).
    pub owner: PlayerId,
    /// Grid cell `(x, y)`.
    pub cell: (u32, u32),
}

/// A generated starting layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapLayout {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Spawn cell of each player, indexed by player id.
    pub spawns: Vec<(u32, u32)>,
    /// Every unit to seed, in seeding order.
    pub placements: Vec<Placement>,
}

impl MapLayout {
    /// World position of a cell's centre.
    #[must_use]
    pub fn cell_center(cell: (u32, u32)) -> Vec2Fixed {
        let half = CELL_SIZE / 2;
        Vec2Fixed::new(
            Fixed::from_num(cell.0 * CELL_SIZE + half),
            Fixed::from_num(cell.1 * CELL_SIZE + half),
        )
    }

    /// Width of the map in world units.
    #[must_use]
    pub const fn world_width(&self) -> u32 {
        self.width * CELL_SIZE
    }

    /// Height of the map in world units.
    #[must_use]
    pub const fn world_height(&self) -> u32 {
        self.height * CELL_SIZE
    }

    /// Number of placements of one type.
    #[must_use]
    pub fn count_of(&self, unit_type: UnitType) -> usize {
        self.placements
            .iter()
            .filter(|p| p.unit_type == unit_type)
            .count()
    }

    /// ASCII rendering, one row per line, two characters per cell.
    ///
    /// `()` marks an HQ, `::` a territory marker, `##` a wall block and two
    /// spaces an empty cell.
    #[must_use]
    pub fn dump(&self) -> String {
        let width = self.width as usize;
        let mut grid = vec!["  "; width * self.height as usize];
        for placement in &self.placements {
            let (x, y) = placement.cell;
            grid[y as usize * width + x as usize] = match placement.unit_type {
                UnitType::HQ => "()",
                UnitType::Territory => "::",
                UnitType::Block => "##",
                _ => "??",
            };
        }

        grid.chunks(width)
            .map(|row| row.concat())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Generate the starting layout for a game.
///
/// # Errors
///
/// Returns [`GameError::InvalidConfig`](crate::error::GameError::InvalidConfig)
/// if the player count is out of range.
pub fn generate_layout(config: &GameData) -> Result<MapLayout> {
    config.validate()?;

    let mut rng = MapRng::new(config.map_seed);
    let players = config.num_players;
    let width = rng.next_range(10, 15) + 4 * players;
    let height = rng.next_range(10, 15) + 4 * players;

    let spawns = spawn_cells(width, height, players, &mut rng);

    let mut placements = Vec::new();
    for (player, &(x, y)) in spawns.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let owner = player as PlayerId;
        placements.push(Placement {
            unit_type: UnitType::HQ,
            owner,
            cell: (x, y),
        });
        let d = TERRITORY_OFFSET;
        for cell in [(x + d, y), (x - d, y), (x, y + d), (x, y - d)] {
            placements.push(Placement {
                unit_type: UnitType::Territory,
                owner,
                cell,
            });
        }
    }

    placements.extend(block_cells(width, height, &spawns, &mut rng).into_iter().map(
        |cell| Placement {
            unit_type: UnitType::Block,
            owner: NEUTRAL_PLAYER,
            cell,
        },
    ));

    Ok(MapLayout {
        width,
        height,
        spawns,
        placements,
    })
}

/// Spread spawn sites evenly along the inset perimeter, starting from a
/// seeded offset.
fn spawn_cells(width: u32, height: u32, players: u32, rng: &mut MapRng) -> Vec<(u32, u32)> {
    let p = SPAWN_INSET;
    let w = width - 1 - 2 * p;
    let h = height - 1 - 2 * p;
    let perimeter = 2 * (w + h);
    let offset = rng.next_range(0, perimeter);

    (0..players)
        .map(|i| {
            let t = (offset + i * perimeter / players) % perimeter;
            if t < w {
                (p + t, p)
            } else if t < w + h {
                (p + w, p + (t - w))
            } else if t < 2 * w + h {
                (p + w - (t - w - h), p + h)
            } else {
                (p, p + h - (t - 2 * w - h))
            }
        })
        .collect()
}

/// Scatter wall blocks, skipping duplicates and the area around spawns.
fn block_cells(width: u32, height: u32, spawns: &[(u32, u32)], rng: &mut MapRng) -> Vec<(u32, u32)> {
    let cells = width * height;
    let attempts = rng.next_range(cells / 10, cells / 4);

    let mut taken = BTreeSet::new();
    let mut blocks = Vec::new();
    for _ in 0..attempts {
        let cell = (rng.next_range(0, width), rng.next_range(0, height));
        let near_spawn = spawns
            .iter()
            .any(|&spawn| chebyshev(cell, spawn) <= SPAWN_CLEARANCE);
        if near_spawn || !taken.insert(cell) {
            continue;
        }
        blocks.push(cell);
    }
    blocks
}

fn chebyshev(a: (u32, u32), b: (u32, u32)) -> u32 {
    a.0.abs_diff(b.0).max(a.1.abs_diff(b.1))
}
