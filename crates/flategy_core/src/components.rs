//! Unit, command and boundary data types.
//!
//! These are pure data with no simulation behavior. The world owns every
//! [`Unit`]; callers only ever see copies of them inside a [`Snapshot`].

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Unique identifier for units. Allocated monotonically, never reused.
pub type UnitId = u64;

/// Player index. Players are numbered `0..num_players`.
pub type PlayerId = u16;

/// Owner of map furniture (walls). Never hostile to anyone, never allied.
pub const NEUTRAL_PLAYER: PlayerId = PlayerId::MAX;

/// Largest supported player count.
pub const MAX_PLAYERS: u32 = 8;

// ============================================================================
// Unit Types
// ============================================================================

/// The closed set of unit types.
///
/// The type fixes what a unit can do. Numeric stats (speed, range, damage)
/// live in the [`BalanceTable`](crate::data::BalanceTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    /// Impassable map wall.
    Block,
    /// Territory marker surrounding a player's base.
    Territory,
    /// Headquarters - a player's main producer.
    HQ,
    /// Static defence. Attacks and produces.
    Turret,
    /// Short-reach infantry.
    Melee,
    /// Long-reach infantry.
    Ranged,
    /// Quick raider.
    Fast,
}

impl UnitType {
    /// Every unit type, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Block,
        Self::Territory,
        Self::HQ,
        Self::Turret,
        Self::Melee,
        Self::Ranged,
        Self::Fast,
    ];

    /// Check if this unit type can ever translate.
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        matches!(self, Self::Melee | Self::Ranged | Self::Fast)
    }

    /// Check if this unit type can attack (explicitly or automatically).
    #[must_use]
    pub const fn can_attack(self) -> bool {
        matches!(self, Self::Turret | Self::Melee | Self::Ranged | Self::Fast)
    }

    /// Check if this unit type may execute spawn commands.
    #[must_use]
    pub const fn is_producer(self) -> bool {
        matches!(self, Self::HQ | Self::Turret)
    }

    /// Command slots a unit of this type starts with.
    ///
    /// Map furniture and HQs sit idle; anything that can fight defends
    /// itself.
    #[must_use]
    pub const fn default_commands(self) -> (Command, Command) {
        if self.can_attack() {
            (Command::IdleAutoAttack, Command::IdleAutoAttack)
        } else {
            (Command::IdleDoNothing, Command::IdleDoNothing)
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// A command that can be stored in a unit's command slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Halt: no movement and no attack this tick.
    Stop,
    /// Move to a destination.
    Move(Vec2Fixed),
    /// Attack a specific unit.
    Attack(UnitId),
    /// Produce a unit of the given type at a position.
    Spawn(UnitType, Vec2Fixed),
    /// No explicit order; do nothing at all.
    IdleDoNothing,
    /// No explicit order; hold position but fire at anything in reach.
    IdleDontMove,
    /// No explicit order; engage the nearest hostile in reach.
    IdleAutoAttack,
}

impl Command {
    /// Check if this is one of the idle variants.
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(
            self,
            Self::IdleDoNothing | Self::IdleDontMove | Self::IdleAutoAttack
        )
    }

    /// Check if a primary slot holding this command hands control to the
    /// secondary slot.
    ///
    /// `IdleAutoAttack` is idle but still governs from the primary slot.
    #[must_use]
    pub const fn defers_to_secondary(self) -> bool {
        matches!(self, Self::IdleDoNothing | Self::IdleDontMove)
    }
}

/// One of the two command slots every unit carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommandSlot {
    /// Explicit orders. Consulted first.
    #[default]
    Primary,
    /// Standing fallback behavior.
    Secondary,
}

// ============================================================================
// Units
// ============================================================================

/// A live unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Type, fixed for the unit's lifetime.
    pub unit_type: UnitType,
    /// Owning player.
    pub owner: PlayerId,
    /// Explicit orders slot.
    pub primary_command: Command,
    /// Fallback behavior slot.
    pub secondary_command: Command,
    /// World position of the footprint centre.
    pub position: Vec2Fixed,
    /// Footprint radius for collision and reach.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Facing in radians.
    #[serde(with = "fixed_serde")]
    pub orientation: Fixed,
    /// Current health. The unit is dead at or below zero.
    #[serde(with = "fixed_serde")]
    pub health: Fixed,
}

impl Unit {
    /// Check if the unit still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > Fixed::ZERO
    }

    /// Read a command slot.
    #[must_use]
    pub const fn command(&self, slot: CommandSlot) -> Command {
        match slot {
            CommandSlot::Primary => self.primary_command,
            CommandSlot::Secondary => self.secondary_command,
        }
    }

    /// Overwrite a command slot.
    pub fn set_command(&mut self, slot: CommandSlot, command: Command) {
        match slot {
            CommandSlot::Primary => self.primary_command = command,
            CommandSlot::Secondary => self.secondary_command = command,
        }
    }

    /// Check if the other unit is an enemy player's unit.
    ///
    /// Neutral units are nobody's enemy.
    #[must_use]
    pub const fn is_hostile_to(&self, other: &Unit) -> bool {
        self.owner != other.owner && self.owner != NEUTRAL_PLAYER && other.owner != NEUTRAL_PLAYER
    }

    /// Check if the other unit belongs to the same owner.
    #[must_use]
    pub const fn is_allied_with(&self, other: &Unit) -> bool {
        self.owner == other.owner
    }
}

// ============================================================================
// Boundary Types
// ============================================================================

/// Immutable configuration of a fresh game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameData {
    /// Number of players, `1..=MAX_PLAYERS`.
    pub num_players: u32,
    /// Seed for the deterministic initial layout.
    pub map_seed: u64,
}

impl GameData {
    /// Create a game configuration.
    #[must_use]
    pub const fn new(num_players: u32, map_seed: u64) -> Self {
        Self {
            num_players,
            map_seed,
        }
    }

    /// Check the configuration can seed a game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if `num_players` is zero or
    /// exceeds [`MAX_PLAYERS`].
    pub fn validate(&self) -> Result<()> {
        if self.num_players == 0 {
            return Err(GameError::InvalidConfig(
                "num_players must be at least 1".to_string(),
            ));
        }
        if self.num_players > MAX_PLAYERS {
            return Err(GameError::InvalidConfig(format!(
                "num_players must be at most {MAX_PLAYERS}, got {}",
                self.num_players
            )));
        }
        Ok(())
    }
}

/// A single command assignment inside a [`TickData`] batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickEntry {
    /// Unit receiving the command.
    pub unit: UnitId,
    /// Slot to overwrite.
    pub slot: CommandSlot,
    /// The command itself.
    pub command: Command,
}

/// The commands issued for one tick, in issue order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TickData {
    /// Entries, applied first to last.
    pub entries: Vec<TickEntry>,
}

impl TickData {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Give a unit an explicit order (primary slot).
    pub fn push(&mut self, unit: UnitId, command: Command) {
        self.push_to_slot(unit, CommandSlot::Primary, command);
    }

    /// Assign a command to a specific slot.
    pub fn push_to_slot(&mut self, unit: UnitId, slot: CommandSlot, command: Command) {
        self.entries.push(TickEntry {
            unit,
            slot,
            command,
        });
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, unit: UnitId, command: Command) -> Self {
        self.push(unit, command);
        self
    }

    /// Check if the batch has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in issue order.
    pub fn iter(&self) -> std::slice::Iter<'_, TickEntry> {
        self.entries.iter()
    }
}

impl FromIterator<(UnitId, Command)> for TickData {
    fn from_iter<I: IntoIterator<Item = (UnitId, Command)>>(iter: I) -> Self {
        let mut batch = Self::new();
        for (unit, command) in iter {
            batch.push(unit, command);
        }
        batch
    }
}

/// Point-in-time copy of every live unit, ascending by id.
///
/// Owns its data; later ticks cannot change it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tick count at the moment the snapshot was taken.
    pub tick: u64,
    /// Unit copies, ascending id.
    pub units: Vec<Unit>,
}

impl Snapshot {
    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if no units are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate units in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Unit> {
        self.units.iter()
    }

    /// Look up a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units
            .binary_search_by_key(&id, |unit| unit.id)
            .ok()
            .map(|index| &self.units[index])
    }

    /// Count units of one type.
    #[must_use]
    pub fn count_of(&self, unit_type: UnitType) -> usize {
        self.units
            .iter()
            .filter(|unit| unit.unit_type == unit_type)
            .count()
    }

    /// Largest id present, if any.
    #[must_use]
    pub fn max_id(&self) -> Option<UnitId> {
        self.units.last().map(|unit| unit.id)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Unit;
    type IntoIter = std::slice::Iter<'a, Unit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}
