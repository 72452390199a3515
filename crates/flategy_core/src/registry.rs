//! Unit storage.
//!
//! The registry is an id-keyed arena. Iteration is always in ascending id
//! order, which is what every subsystem relies on for determinism.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{Unit, UnitId};

/// Storage for all live units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitRegistry {
    /// Units keyed by id.
    units: BTreeMap<UnitId, Unit>,
    /// Next id to hand out. Only ever grows.
    next_id: UnitId,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    /// Create an empty registry. The first id handed out is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Insert a unit under a fresh id and return that id.
    ///
    /// Whatever id the unit carried is overwritten.
    pub fn insert(&mut self, mut unit: Unit) -> UnitId {
        let id = self.next_id;
        self.next_id += 1;
        unit.id = id;
        self.units.insert(id, unit);
        id
    }

    /// Remove a unit by id.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Remove every unit at or below zero health, returning their ids in
    /// ascending order.
    pub fn remove_dead(&mut self) -> Vec<UnitId> {
        let dead: Vec<UnitId> = self
            .units
            .values()
            .filter(|unit| !unit.is_alive())
            .map(|unit| unit.id)
            .collect();
        for id in &dead {
            self.units.remove(id);
        }
        dead
    }

    /// Get a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a mutable reference to a unit by id.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Check if a unit exists.
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// The id the next insert will receive.
    #[must_use]
    pub const fn next_id(&self) -> UnitId {
        self.next_id
    }

    /// Ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }

    /// Iterate units in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Iterate units mutably in ascending id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.values_mut()
    }

    /// Value copies of every unit, ascending id.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Unit> {
        self.units.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Command, UnitType};
    use crate::math::{Fixed, Vec2Fixed};

    fn unit(health: i32) -> Unit {
        Unit {
            id: 0,
            unit_type: UnitType::Fast,
            owner: 0,
            primary_command: Command::IdleDoNothing,
            secondary_command: Command::IdleDoNothing,
            position: Vec2Fixed::ZERO,
            radius: Fixed::ONE,
            orientation: Fixed::ZERO,
            health: Fixed::from_num(health),
        }
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut registry = UnitRegistry::new();
        let a = registry.insert(unit(10));
        let b = registry.insert(unit(10));
        assert_eq!((a, b), (1, 2));

        registry.remove(b);
        let c = registry.insert(unit(10));
        assert_eq!(c, 3);
        assert_eq!(registry.next_id(), 4);
    }

    #[test]
    fn test_remove_dead() {
        let mut registry = UnitRegistry::new();
        registry.insert(unit(10));
        let dead = registry.insert(unit(0));
        registry.insert(unit(5));
        let also_dead = registry.insert(unit(-3));

        assert_eq!(registry.remove_dead(), vec![dead, also_dead]);
        assert_eq!(registry.ids(), vec![1, 3]);
    }

    #[test]
    fn test_iteration_is_ordered() {
        let mut registry = UnitRegistry::new();
        for _ in 0..20 {
            registry.insert(unit(1));
        }
        registry.remove(7);
        let ids: Vec<UnitId> = registry.iter().map(|u| u.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
