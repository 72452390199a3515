//! Test fixtures and helpers.
//!
//! Pre-built worlds and unit placements for consistent testing.

use fixed::types::I32F32;
use flategy_core::components::{Command, CommandSlot, GameData, PlayerId, UnitId, UnitType};
use flategy_core::data::BalanceTable;
use flategy_core::math::Vec2Fixed;
use flategy_core::world::{UnitSpawnParams, World};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a position from integer coordinates.
#[must_use]
pub fn pos(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_num(x, y)
}

/// An empty two-player world with the default balance.
///
/// # Panics
///
/// Never for the built-in defaults.
#[must_use]
pub fn empty_world() -> World {
    World::empty(GameData::new(2, 0), BalanceTable::default())
        .expect("default configuration is valid")
}

/// Place a unit with explicit orders in both slots.
pub fn place(
    world: &mut World,
    unit_type: UnitType,
    owner: PlayerId,
    position: Vec2Fixed,
    command: Command,
) -> UnitId {
    world.insert_unit(
        UnitSpawnParams::new(unit_type, owner, position).with_commands(command, command),
    )
}

/// Two opposing units of the given types facing each other along the x
/// axis, `gap` world units apart edge to edge, both on `IdleAutoAttack`.
///
/// Returns the world and the ids of player 0's and player 1's unit.
#[must_use]
pub fn duel(a: UnitType, b: UnitType, gap: I32F32) -> (World, UnitId, UnitId) {
    let mut world = empty_world();
    let x = world.balance().stats(a).radius + gap + world.balance().stats(b).radius;

    let first = place(&mut world, a, 0, Vec2Fixed::ZERO, Command::IdleAutoAttack);
    let second = place(
        &mut world,
        b,
        1,
        Vec2Fixed::new(x, I32F32::ZERO),
        Command::IdleAutoAttack,
    );
    (world, first, second)
}

/// A busy world: a seeded layout plus a squad of mixed mobile units per
/// player converging on the map centre.
///
/// # Panics
///
/// Panics if `num_players` is out of range.
#[must_use]
pub fn skirmish(num_players: u32, seed: u64, squad: u32) -> World {
    let mut world = World::create(GameData::new(num_players, seed)).expect("valid player count");
    let hqs: Vec<(PlayerId, Vec2Fixed)> = world
        .units()
        .filter(|u| u.unit_type == UnitType::HQ)
        .map(|u| (u.owner, u.position))
        .collect();

    let centre = hqs
        .iter()
        .fold(Vec2Fixed::ZERO, |acc, &(_, p)| acc + p)
        .scale(fixed(1) / fixed(i32::try_from(hqs.len()).unwrap_or(1)));
    let kinds = [UnitType::Melee, UnitType::Ranged, UnitType::Fast];

    for &(owner, hq) in &hqs {
        for i in 0..squad {
            let unit_type = kinds[i as usize % kinds.len()];
            let offset = fixed(i32::try_from(i).unwrap_or(0) * 2);
            let id = place(
                &mut world,
                unit_type,
                owner,
                hq + Vec2Fixed::new(offset, fixed(8)),
                Command::IdleAutoAttack,
            );
            world
                .set_command(id, CommandSlot::Primary, Command::Move(centre))
                .expect("unit was just placed");
        }
    }
    world
}
