//! Command resolution.
//!
//! Every tick each unit ends up with exactly one [`Intent`]. The primary
//! slot governs unless it holds `IdleDoNothing` or `IdleDontMove`; then the
//! secondary slot is evaluated. Whichever slot governs, an idle variant in
//! it decides as follows:
//!
//! | command          | result                                           |
//! |------------------|--------------------------------------------------|
//! | `IdleDoNothing`  | [`Intent::Idle`]                                 |
//! | `IdleDontMove`   | attack nearest in-reach hostile, never advance   |
//! | `IdleAutoAttack` | attack nearest in-reach hostile, may advance     |
//!
//! A secondary `IdleAutoAttack` behind a primary `IdleDontMove` keeps the
//! no-movement rule: it attacks in reach but never advances.
//!
//! Auto-acquired targets last for the current tick only and are never
//! written back into a slot.

use crate::components::{Command, CommandSlot, Unit, UnitId, UnitType};
use crate::data::BalanceTable;
use crate::math::Vec2Fixed;
use crate::registry::UnitRegistry;
use crate::spatial::nearest_hostile;

/// What a unit does this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Nothing at all.
    Idle,
    /// Explicit halt.
    Stop,
    /// Travel toward a destination.
    MoveTo(Vec2Fixed),
    /// Engage a target.
    Attack {
        /// Unit being attacked.
        target: UnitId,
        /// Whether the attacker may advance to get into reach.
        pursue: bool,
    },
    /// Produce a unit.
    Spawn {
        /// Type to produce.
        unit_type: UnitType,
        /// Where the new unit appears.
        position: Vec2Fixed,
    },
}

/// Resolution result for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// The unit.
    pub unit: UnitId,
    /// Slot that governed this tick.
    pub slot: CommandSlot,
    /// Behavior for this tick.
    pub intent: Intent,
    /// The unit was told to stay put (`Stop`, `IdleDoNothing` or
    /// `IdleDontMove`); separation does not push it.
    pub holds_position: bool,
}

/// Pick the governing slot of a unit.
#[must_use]
pub fn active_slot(unit: &Unit) -> CommandSlot {
    if unit.primary_command.defers_to_secondary() {
        CommandSlot::Secondary
    } else {
        CommandSlot::Primary
    }
}

/// Resolve a single unit against the current registry.
#[must_use]
pub fn resolve_unit(unit: &Unit, registry: &UnitRegistry, balance: &BalanceTable) -> ResolvedCommand {
    let slot = active_slot(unit);
    let command = unit.command(slot);
    let dont_move = unit.primary_command == Command::IdleDontMove;
    let intent = match command {
        Command::Stop => Intent::Stop,
        Command::Move(destination) => Intent::MoveTo(destination),
        Command::Attack(target) => Intent::Attack {
            target,
            pursue: true,
        },
        Command::Spawn(unit_type, position) => Intent::Spawn {
            unit_type,
            position,
        },
        Command::IdleDoNothing => Intent::Idle,
        Command::IdleDontMove => auto_attack(unit, registry, balance, false),
        Command::IdleAutoAttack => auto_attack(unit, registry, balance, !dont_move),
    };
    let holds_position = match command {
        Command::Stop | Command::IdleDoNothing | Command::IdleDontMove => true,
        Command::IdleAutoAttack => dont_move,
        Command::Move(_) | Command::Attack(_) | Command::Spawn(..) => false,
    };

    ResolvedCommand {
        unit: unit.id,
        slot,
        intent,
        holds_position,
    }
}

fn auto_attack(unit: &Unit, registry: &UnitRegistry, balance: &BalanceTable, pursue: bool) -> Intent {
    if !unit.unit_type.can_attack() {
        return Intent::Idle;
    }
    let range = balance.stats(unit.unit_type).range();
    match nearest_hostile(unit, registry.iter(), range) {
        Some(target) => Intent::Attack { target, pursue },
        None => Intent::Idle,
    }
}

/// Resolve every unit, ascending id.
///
/// Reads the registry only; nothing is mutated, so all units see the same
/// start-of-tick world.
#[must_use]
pub fn resolve_commands(registry: &UnitRegistry, balance: &BalanceTable) -> Vec<ResolvedCommand> {
    registry
        .iter()
        .map(|unit| resolve_unit(unit, registry, balance))
        .collect()
}
