//! Geometry checks shared by the resolver and the subsystems.
//!
//! Reach is measured edge to edge: a unit can hit a target when the gap
//! between their footprints is no larger than the attacker's range. All
//! comparisons use exact squared distances, so no square root is taken and
//! far-apart units never overflow.

use std::cmp::Ordering;

use crate::components::{Unit, UnitId};
use crate::math::Fixed;

/// Centre-to-centre distance at which `attacker` can hit `target`.
#[must_use]
pub fn reach(attacker: &Unit, target: &Unit, range: Fixed) -> Fixed {
    range + attacker.radius + target.radius
}

/// Check if `target` lies within `range` of `attacker`'s footprint.
#[must_use]
pub fn within_reach(attacker: &Unit, target: &Unit, range: Fixed) -> bool {
    let reach = reach(attacker, target, range);
    attacker.position.compare_distance(target.position, reach) != Ordering::Greater
}

/// Check if two footprints strictly overlap. Touching is not overlapping.
#[must_use]
pub fn footprints_overlap(a: &Unit, b: &Unit) -> bool {
    a.position.compare_distance(b.position, a.radius + b.radius) == Ordering::Less
}

/// Nearest unit among `candidates` that is hostile to `unit` and within
/// `range` of it.
///
/// Ties on distance go to the smallest id. Dead candidates and `unit`
/// itself are skipped.
pub fn nearest_hostile<'a, I>(unit: &Unit, candidates: I, range: Fixed) -> Option<UnitId>
where
    I: IntoIterator<Item = &'a Unit>,
{
    let mut best: Option<(Fixed, UnitId)> = None;

    for candidate in candidates {
        if candidate.id == unit.id || !candidate.is_alive() || !unit.is_hostile_to(candidate) {
            continue;
        }
        if !within_reach(unit, candidate, range) {
            continue;
        }

        let dist_sq = unit.position.distance_squared(candidate.position);
        let better = match best {
            None => true,
            Some((best_dist, best_id)) => {
                dist_sq < best_dist || (dist_sq == best_dist && candidate.id < best_id)
            }
        };
        if better {
            best = Some((dist_sq, candidate.id));
        }
    }

    best.map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Command, PlayerId, UnitType, NEUTRAL_PLAYER};
    use crate::math::Vec2Fixed;

    fn unit(id: UnitId, owner: PlayerId, x: i32, y: i32) -> Unit {
        Unit {
            id,
            unit_type: UnitType::Melee,
            owner,
            primary_command: Command::IdleAutoAttack,
            secondary_command: Command::IdleAutoAttack,
            position: Vec2Fixed::from_num(x, y),
            radius: Fixed::ONE,
            orientation: Fixed::ZERO,
            health: Fixed::from_num(10),
        }
    }

    #[test]
    fn test_reach_is_edge_to_edge() {
        let a = unit(1, 0, 0, 0);
        let b = unit(2, 1, 5, 0);
        // Gap between footprints is 3
        assert!(within_reach(&a, &b, Fixed::from_num(3)));
        assert!(!within_reach(&a, &b, Fixed::from_num(2)));
    }

    #[test]
    fn test_touching_is_not_overlap() {
        let a = unit(1, 0, 0, 0);
        let touching = unit(2, 0, 2, 0);
        let overlapping = unit(3, 0, 1, 0);
        assert!(!footprints_overlap(&a, &touching));
        assert!(footprints_overlap(&a, &overlapping));
    }

    #[test]
    fn test_nearest_hostile_picks_closest() {
        let me = unit(1, 0, 0, 0);
        let others = [unit(2, 1, 4, 0), unit(3, 1, 3, 0), unit(4, 0, 2, 0)];
        assert_eq!(nearest_hostile(&me, &others, Fixed::from_num(10)), Some(3));
    }

    #[test]
    fn test_nearest_hostile_breaks_ties_by_id() {
        let me = unit(1, 0, 0, 0);
        let others = [unit(9, 1, 0, 3), unit(5, 1, 3, 0), unit(7, 1, -3, 0)];
        assert_eq!(nearest_hostile(&me, &others, Fixed::from_num(10)), Some(5));
    }

    #[test]
    fn test_far_apart_units() {
        let me = unit(1, 0, 0, 0);
        let far = unit(2, 1, 50_000, 0);
        assert!(!within_reach(&me, &far, Fixed::from_num(10)));
        assert!(!footprints_overlap(&me, &far));
        assert_eq!(nearest_hostile(&me, [&far], Fixed::from_num(10)), None);

        // Gap is 49,998
        assert!(within_reach(&me, &far, Fixed::from_num(49_998)));
        assert_eq!(nearest_hostile(&me, [&far], Fixed::from_num(49_998)), Some(2));
    }

    #[test]
    fn test_nearest_hostile_ignores_neutral_dead_and_out_of_range() {
        let me = unit(1, 0, 0, 0);
        let mut dead = unit(2, 1, 1, 0);
        dead.health = Fixed::ZERO;
        let wall = unit(3, NEUTRAL_PLAYER, 1, 0);
        let far = unit(4, 1, 50, 0);
        assert_eq!(
            nearest_hostile(&me, &[dead, wall, far], Fixed::from_num(5)),
            None
        );
    }
}
