//! Movement subsystem.
//!
//! Runs after command resolution and before combat. Mobile units advance
//! toward a `Move` destination or close in on an `Attack` target, then
//! overlapping mobile footprints are pushed apart. Units holding position
//! are never pushed.

use std::collections::BTreeSet;

use crate::components::{CommandSlot, UnitId};
use crate::data::BalanceTable;
use crate::math::{Fixed, Vec2Fixed};
use crate::registry::UnitRegistry;
use crate::resolver::{Intent, ResolvedCommand};
use crate::spatial::{footprints_overlap, reach};

/// Advance every mobile unit according to its resolved intent.
///
/// Units are processed in ascending id order; a unit chasing a target sees
/// the target's position as already updated this tick if the target has a
/// smaller id.
///
/// Returns the `(unit, slot)` pairs whose `Move` destination was reached,
/// so the orchestrator can retire those commands.
pub fn movement_system(
    registry: &mut UnitRegistry,
    resolved: &[ResolvedCommand],
    balance: &BalanceTable,
) -> Vec<(UnitId, CommandSlot)> {
    let mut arrived = Vec::new();

    for command in resolved {
        match command.intent {
            Intent::MoveTo(destination) => {
                if move_to(registry, balance, command.unit, destination) {
                    arrived.push((command.unit, command.slot));
                }
            }
            Intent::Attack {
                target,
                pursue: true,
            } => approach(registry, balance, command.unit, target),
            _ => {}
        }
    }

    separation_system(registry, resolved, balance.separation);

    arrived
}

/// Step a unit toward a destination. Returns true once it stands on it.
fn move_to(
    registry: &mut UnitRegistry,
    balance: &BalanceTable,
    id: UnitId,
    destination: Vec2Fixed,
) -> bool {
    let Some(unit) = registry.get_mut(id) else {
        return false;
    };
    if !unit.unit_type.is_mobile() {
        return false;
    }

    let speed = balance.stats(unit.unit_type).speed;
    let heading = destination - unit.position;
    if heading != Vec2Fixed::ZERO {
        unit.orientation = heading.heading();
    }
    unit.position = unit.position.step_toward(destination, speed);
    unit.position == destination
}

/// Close in on an attack target until it is within reach.
fn approach(registry: &mut UnitRegistry, balance: &BalanceTable, id: UnitId, target: UnitId) {
    let Some(target_unit) = registry.get(target).cloned() else {
        return;
    };
    let Some(unit) = registry.get_mut(id) else {
        return;
    };
    if !unit.unit_type.is_mobile() || !target_unit.is_alive() || unit.is_allied_with(&target_unit) {
        return;
    }

    let stats = balance.stats(unit.unit_type);
    let reach = reach(unit, &target_unit, stats.range());
    let distance = unit.position.distance(target_unit.position);
    if distance <= reach {
        return;
    }

    let step = stats.speed.min(distance - reach);
    unit.orientation = (target_unit.position - unit.position).heading();
    unit.position = unit.position.step_toward(target_unit.position, step);
}

/// Push overlapping mobile footprints apart.
///
/// Pairs are visited in ascending `(lower id, higher id)` order and each
/// push is applied immediately, so later pairs see earlier corrections.
/// The pair separates by `overlap * strength` along the line between their
/// centres, split evenly between both units. A unit whose resolved command
/// holds position stays put and its partner takes the whole push; two such
/// units are left overlapping. Coincident units are split along the x
/// axis, the higher id moving toward +x.
pub fn separation_system(
    registry: &mut UnitRegistry,
    resolved: &[ResolvedCommand],
    strength: Fixed,
) {
    if strength <= Fixed::ZERO {
        return;
    }

    let anchored: BTreeSet<UnitId> = resolved
        .iter()
        .filter(|command| command.holds_position)
        .map(|command| command.unit)
        .collect();
    let mobile: Vec<UnitId> = registry
        .iter()
        .filter(|unit| unit.unit_type.is_mobile())
        .map(|unit| unit.id)
        .collect();
    let two = Fixed::from_num(2);

    for (i, &a_id) in mobile.iter().enumerate() {
        for &b_id in &mobile[i + 1..] {
            let (a_fixed, b_fixed) = (anchored.contains(&a_id), anchored.contains(&b_id));
            if a_fixed && b_fixed {
                continue;
            }
            let (Some(a), Some(b)) = (registry.get(a_id), registry.get(b_id)) else {
                continue;
            };
            if !footprints_overlap(a, b) {
                continue;
            }

            let combined = a.radius + b.radius;
            let offset = b.position - a.position;
            let distance = offset.length();
            let direction = if distance == Fixed::ZERO {
                Vec2Fixed::new(Fixed::ONE, Fixed::ZERO)
            } else {
                offset.normalize()
            };
            let depth = (combined - distance) * strength;
            let (a_push, b_push) = match (a_fixed, b_fixed) {
                (true, _) => (Fixed::ZERO, depth),
                (_, true) => (depth, Fixed::ZERO),
                _ => (depth / two, depth / two),
            };

            if let Some(a) = registry.get_mut(a_id) {
                a.position = a.position - direction.scale(a_push);
            }
            if let Some(b) = registry.get_mut(b_id) {
                b.position = b.position + direction.scale(b_push);
            }
        }
    }
}
