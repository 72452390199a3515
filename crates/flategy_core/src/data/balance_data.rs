//! The per-game balance table.

use serde::{Deserialize, Serialize};

use super::unit_data::UnitStats;
use crate::components::UnitType;
use crate::error::{GameError, Result};
use crate::math::{fixed_decimal, Fixed};

/// Numeric balance for every unit type, plus global tuning.
///
/// A world copies its table at creation and never changes it, so a unit's
/// radius and speed stay fixed for its whole lifetime.
///
/// # Example RON
///
/// ```ron
/// BalanceTable(
///     block: (max_health: 500.0, radius: 4.0, speed: 0.0),
///     // ... one entry per unit type ...
///     separation: 1.0,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BalanceTable {
    /// Map walls.
    pub block: UnitStats,
    /// Territory markers.
    pub territory: UnitStats,
    /// Headquarters.
    pub hq: UnitStats,
    /// Turrets.
    pub turret: UnitStats,
    /// Melee infantry.
    pub melee: UnitStats,
    /// Ranged infantry.
    pub ranged: UnitStats,
    /// Fast raiders.
    pub fast: UnitStats,
    /// Fraction of an overlap resolved per tick, in `[0, 1]`.
    #[serde(with = "fixed_decimal", default = "default_separation")]
    pub separation: Fixed,
}

fn default_separation() -> Fixed {
    Fixed::ONE
}

impl Default for BalanceTable {
    fn default() -> Self {
        let n = Fixed::from_num::<i32>;
        Self {
            block: UnitStats::inert(n(500), n(4)),
            territory: UnitStats::inert(n(200), n(3)),
            hq: UnitStats::inert(n(1000), n(6)),
            turret: UnitStats::inert(n(300), n(3)).with_attack(n(8), n(14)),
            melee: UnitStats::inert(n(100), Fixed::from_num(1.5))
                .with_speed(n(1))
                .with_attack(n(10), Fixed::from_num(0.5)),
            ranged: UnitStats::inert(n(70), Fixed::from_num(1.5))
                .with_speed(Fixed::from_num(0.75))
                .with_attack(n(6), n(10)),
            fast: UnitStats::inert(n(60), n(1))
                .with_speed(n(2))
                .with_attack(n(5), Fixed::from_num(0.5)),
            separation: default_separation(),
        }
    }
}

impl BalanceTable {
    /// Stats for a unit type.
    #[must_use]
    pub const fn stats(&self, unit_type: UnitType) -> &UnitStats {
        match unit_type {
            UnitType::Block => &self.block,
            UnitType::Territory => &self.territory,
            UnitType::HQ => &self.hq,
            UnitType::Turret => &self.turret,
            UnitType::Melee => &self.melee,
            UnitType::Ranged => &self.ranged,
            UnitType::Fast => &self.fast,
        }
    }

    /// Mutable stats for a unit type (scenario tuning before creation).
    pub fn stats_mut(&mut self, unit_type: UnitType) -> &mut UnitStats {
        match unit_type {
            UnitType::Block => &mut self.block,
            UnitType::Territory => &mut self.territory,
            UnitType::HQ => &mut self.hq,
            UnitType::Turret => &mut self.turret,
            UnitType::Melee => &mut self.melee,
            UnitType::Ranged => &mut self.ranged,
            UnitType::Fast => &mut self.fast,
        }
    }

    /// Parse a table from RON and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if the text is not a valid
    /// table, or [`GameError::InvalidBalance`] if it fails validation.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        Self::from_ron_named(source, "<inline>")
    }

    /// Same as [`from_ron_str`](Self::from_ron_str), naming the source in
    /// parse errors.
    ///
    /// # Errors
    ///
    /// See [`from_ron_str`](Self::from_ron_str).
    pub fn from_ron_named(source: &str, path: &str) -> Result<Self> {
        let table: Self = ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        table.validate()?;
        Ok(table)
    }

    /// Render the table as pretty RON.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| {
            GameError::DataParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Check every entry against what its unit type is allowed to do.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidBalance`] naming the first offending type.
    pub fn validate(&self) -> Result<()> {
        for unit_type in UnitType::ALL {
            let stats = self.stats(unit_type);
            let invalid = |reason: &str| GameError::InvalidBalance {
                unit_type,
                reason: reason.to_string(),
            };

            if stats.max_health <= Fixed::ZERO {
                return Err(invalid("max_health must be positive"));
            }
            if stats.radius <= Fixed::ZERO {
                return Err(invalid("radius must be positive"));
            }
            if stats.speed < Fixed::ZERO {
                return Err(invalid("speed must not be negative"));
            }
            if !unit_type.is_mobile() && stats.speed != Fixed::ZERO {
                return Err(invalid("stationary type cannot have a speed"));
            }

            match (unit_type.can_attack(), stats.attack) {
                (true, None) => return Err(invalid("attack-capable type needs attack stats")),
                (false, Some(_)) => return Err(invalid("type cannot attack")),
                (true, Some(attack)) => {
                    if attack.damage <= Fixed::ZERO {
                        return Err(invalid("damage must be positive"));
                    }
                    if attack.range < Fixed::ZERO {
                        return Err(invalid("range must not be negative"));
                    }
                }
                (false, None) => {}
            }
        }

        if self.separation < Fixed::ZERO || self.separation > Fixed::ONE {
            return Err(GameError::InvalidBalance {
                unit_type: UnitType::Melee,
                reason: "separation must lie in [0, 1]".to_string(),
            });
        }

        Ok(())
    }
}
