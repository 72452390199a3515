//! Spawn subsystem.
//!
//! Producers (HQ, Turret) turn a resolved `Spawn` into a new unit. The unit
//! is inserted after resolution has already run, so it takes no action
//! until the following tick.

use crate::components::{Command, CommandSlot, PlayerId, Unit, UnitId, UnitType};
use crate::data::BalanceTable;
use crate::math::{Fixed, Vec2Fixed};
use crate::registry::UnitRegistry;
use crate::resolver::{Intent, ResolvedCommand};

/// What the spawn pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnOutcome {
    /// Ids of the units created, ascending.
    pub spawned: Vec<UnitId>,
    /// Every `(unit, slot)` whose spawn order was attempted, whether it
    /// produced anything or not.
    pub consumed: Vec<(UnitId, CommandSlot)>,
}

/// Build a fresh unit of `unit_type` with full health and default orders.
///
/// The id is a placeholder; the registry assigns the real one on insert.
#[must_use]
pub fn new_unit(
    balance: &BalanceTable,
    unit_type: UnitType,
    owner: PlayerId,
    position: Vec2Fixed,
) -> Unit {
    let stats = balance.stats(unit_type);
    let (primary_command, secondary_command) = unit_type.default_commands();
    Unit {
        id: 0,
        unit_type,
        owner,
        primary_command,
        secondary_command,
        position,
        radius: stats.radius,
        orientation: Fixed::ZERO,
        health: stats.max_health,
    }
}

/// Execute every resolved spawn order in ascending producer id.
///
/// The new unit belongs to the producer's owner and appears exactly at the
/// requested position. No obstruction check is made. Non-producers and
/// producers killed earlier this tick produce nothing.
pub fn spawn_system(
    registry: &mut UnitRegistry,
    resolved: &[ResolvedCommand],
    balance: &BalanceTable,
) -> SpawnOutcome {
    let mut outcome = SpawnOutcome::default();

    for command in resolved {
        let Intent::Spawn {
            unit_type,
            position,
        } = command.intent
        else {
            continue;
        };
        outcome.consumed.push((command.unit, command.slot));

        let Some(producer) = registry.get(command.unit) else {
            continue;
        };
        if !producer.unit_type.is_producer() || !producer.is_alive() {
            tracing::trace!(
                unit = command.unit,
                unit_type = ?producer.unit_type,
                "Spawn order is inert"
            );
            continue;
        }

        let mut unit = new_unit(balance, unit_type, producer.owner, position);
        // Spawned units start on auto-attack regardless of type
        unit.primary_command = Command::IdleAutoAttack;
        unit.secondary_command = Command::IdleAutoAttack;
        outcome.spawned.push(registry.insert(unit));
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_commands;

    fn producer(registry: &mut UnitRegistry, unit_type: UnitType, command: Command) -> UnitId {
        let mut unit = new_unit(&BalanceTable::default(), unit_type, 3, Vec2Fixed::ZERO);
        unit.primary_command = command;
        registry.insert(unit)
    }

    fn run(registry: &mut UnitRegistry) -> SpawnOutcome {
        let balance = BalanceTable::default();
        let resolved = resolve_commands(registry, &balance);
        spawn_system(registry, &resolved, &balance)
    }

    #[test]
    fn test_hq_spawns_unit() {
        let mut registry = UnitRegistry::new();
        let pos = Vec2Fixed::from_num(10, 5);
        let hq = producer(&mut registry, UnitType::HQ, Command::Spawn(UnitType::Melee, pos));

        let outcome = run(&mut registry);
        assert_eq!(outcome.spawned, vec![hq + 1]);
        assert_eq!(outcome.consumed, vec![(hq, CommandSlot::Primary)]);

        let unit = registry.get(hq + 1).unwrap();
        assert_eq!(unit.unit_type, UnitType::Melee);
        assert_eq!(unit.owner, 3);
        assert_eq!(unit.position, pos);
        assert_eq!(unit.health, Fixed::from_num(100));
        assert_eq!(unit.primary_command, Command::IdleAutoAttack);
        assert_eq!(unit.secondary_command, Command::IdleAutoAttack);
    }

    #[test]
    fn test_non_producer_spawn_is_inert_but_consumed() {
        let mut registry = UnitRegistry::new();
        let melee = producer(
            &mut registry,
            UnitType::Melee,
            Command::Spawn(UnitType::Fast, Vec2Fixed::ZERO),
        );

        let outcome = run(&mut registry);
        assert!(outcome.spawned.is_empty());
        assert_eq!(outcome.consumed, vec![(melee, CommandSlot::Primary)]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_dead_producer_spawns_nothing() {
        let mut registry = UnitRegistry::new();
        let turret = producer(
            &mut registry,
            UnitType::Turret,
            Command::Spawn(UnitType::Ranged, Vec2Fixed::ZERO),
        );
        let balance = BalanceTable::default();
        let resolved = resolve_commands(&registry, &balance);
        registry.get_mut(turret).unwrap().health = Fixed::ZERO;

        let outcome = spawn_system(&mut registry, &resolved, &balance);
        assert!(outcome.spawned.is_empty());
    }

    #[test]
    fn test_new_unit_uses_balance() {
        let balance = BalanceTable::default();
        let wall = new_unit(&balance, UnitType::Block, 0, Vec2Fixed::ZERO);
        assert_eq!(wall.radius, Fixed::from_num(4));
        assert_eq!(wall.primary_command, Command::IdleDoNothing);

        let turret = new_unit(&balance, UnitType::Turret, 0, Vec2Fixed::ZERO);
        assert_eq!(turret.secondary_command, Command::IdleAutoAttack);
    }
}
