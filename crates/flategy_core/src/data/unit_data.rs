//! Per-type unit stats.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_decimal, Fixed};

/// Attack statistics for a unit type.
///
/// Units without attack stats are non-combatants (walls, territory, HQs).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AttackStats {
    /// Health removed from the target per tick of attacking.
    #[serde(with = "fixed_decimal")]
    pub damage: Fixed,

    /// Reach beyond both footprints, in world units.
    #[serde(with = "fixed_decimal")]
    pub range: Fixed,
}

impl AttackStats {
    /// Create attack stats.
    #[must_use]
    pub fn new(damage: Fixed, range: Fixed) -> Self {
        Self { damage, range }
    }
}

/// Numeric definition of one unit type.
///
/// # Example RON
///
/// ```ron
/// (
///     max_health: 100.0,
///     radius: 1.5,
///     speed: 1.0,
///     attack: Some((damage: 10.0, range: 0.5)),
/// )
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UnitStats {
    /// Health a unit of this type starts with.
    #[serde(with = "fixed_decimal")]
    pub max_health: Fixed,

    /// Footprint radius.
    #[serde(with = "fixed_decimal")]
    pub radius: Fixed,

    /// Movement per tick. Zero for stationary types.
    #[serde(with = "fixed_decimal")]
    pub speed: Fixed,

    /// Attack statistics (None for non-combat types).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<AttackStats>,
}

impl UnitStats {
    /// Stats for a unit that never moves or fights.
    #[must_use]
    pub fn inert(max_health: Fixed, radius: Fixed) -> Self {
        Self {
            max_health,
            radius,
            speed: Fixed::ZERO,
            attack: None,
        }
    }

    /// Builder method to set movement speed.
    #[must_use]
    pub fn with_speed(mut self, speed: Fixed) -> Self {
        self.speed = speed;
        self
    }

    /// Builder method to set attack stats.
    #[must_use]
    pub fn with_attack(mut self, damage: Fixed, range: Fixed) -> Self {
        self.attack = Some(AttackStats::new(damage, range));
        self
    }

    /// Attack reach (zero for non-combatants).
    #[must_use]
    pub fn range(&self) -> Fixed {
        self.attack.map_or(Fixed::ZERO, |attack| attack.range)
    }

    /// Per-tick damage (zero for non-combatants).
    #[must_use]
    pub fn damage(&self) -> Fixed {
        self.attack.map_or(Fixed::ZERO, |attack| attack.damage)
    }

    /// Check if this unit type can engage in combat.
    #[must_use]
    pub fn is_combatant(&self) -> bool {
        self.attack.is_some()
    }
}
