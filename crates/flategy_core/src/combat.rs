//! Combat subsystem.
//!
//! Attacks resolve one attacker at a time in ascending id order, so damage
//! dealt by a lower id is visible to every later attacker in the same tick.
//! A unit killed earlier in the pass neither attacks nor can be attacked.

use serde::{Deserialize, Serialize};

use crate::components::UnitId;
use crate::data::BalanceTable;
use crate::math::{fixed_serde, Fixed};
use crate::registry::UnitRegistry;
use crate::resolver::{Intent, ResolvedCommand};
use crate::spatial::within_reach;

/// Damage event generated by the combat system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageEvent {
    /// The unit dealing damage.
    pub attacker: UnitId,
    /// The unit receiving damage.
    pub target: UnitId,
    /// Amount of health removed.
    #[serde(with = "fixed_serde")]
    pub damage: Fixed,
}

/// Apply every resolved attack.
///
/// An attack lands when the attacker is alive and attack-capable, and the
/// target exists, is alive, is not owned by the attacker's owner, and lies
/// within reach. Anything else is inert for the tick.
pub fn combat_system(
    registry: &mut UnitRegistry,
    resolved: &[ResolvedCommand],
    balance: &BalanceTable,
) -> Vec<DamageEvent> {
    let mut events = Vec::new();

    for command in resolved {
        let Intent::Attack { target, .. } = command.intent else {
            continue;
        };
        if let Some(event) = strike(registry, balance, command.unit, target) {
            events.push(event);
        }
    }

    events
}

fn strike(
    registry: &mut UnitRegistry,
    balance: &BalanceTable,
    attacker_id: UnitId,
    target_id: UnitId,
) -> Option<DamageEvent> {
    let attacker = registry.get(attacker_id)?;
    let target = registry.get(target_id)?;

    if !attacker.is_alive() || !target.is_alive() || attacker.is_allied_with(target) {
        return None;
    }
    let attack = balance.stats(attacker.unit_type).attack?;
    if !within_reach(attacker, target, attack.range) {
        return None;
    }

    let facing = (target.position - attacker.position).heading();
    if let Some(attacker) = registry.get_mut(attacker_id) {
        attacker.orientation = facing;
    }
    let target = registry.get_mut(target_id)?;
    target.health -= attack.damage;

    Some(DamageEvent {
        attacker: attacker_id,
        target: target_id,
        damage: attack.damage,
    })
}
