//! Balance testing utilities for headless simulation.
//!
//! Runs unit-versus-unit duels through the real tick loop so balance
//! changes can be checked against expected matchups.

use fixed::types::I32F32;
use flategy_core::components::{TickData, UnitType};
use flategy_core::data::BalanceTable;

use crate::fixtures::duel;

/// Result of a simulated duel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelResult {
    /// The surviving side: 0, 1, or `None` for a mutual kill or timeout.
    pub winner: Option<u16>,
    /// Ticks elapsed until the duel ended (or the tick limit).
    pub ticks: u64,
    /// Health left on player 0's unit (zero if it died).
    pub remaining_a: I32F32,
    /// Health left on player 1's unit (zero if it died).
    pub remaining_b: I32F32,
}

/// Fight unit type `a` (player 0) against `b` (player 1), starting `gap`
/// world units apart edge to edge, for at most `max_ticks` ticks.
#[must_use]
pub fn run_duel(a: UnitType, b: UnitType, gap: I32F32, max_ticks: u64) -> DuelResult {
    let (mut world, id_a, id_b) = duel(a, b, gap);
    let empty = TickData::new();

    let mut ticks = 0;
    while ticks < max_ticks && world.unit(id_a).is_some() && world.unit(id_b).is_some() {
        world.tick(&empty);
        ticks += 1;
    }

    let remaining = |id| world.unit(id).map_or(I32F32::ZERO, |u| u.health);
    let (remaining_a, remaining_b) = (remaining(id_a), remaining(id_b));
    let winner = match (remaining_a > I32F32::ZERO, remaining_b > I32F32::ZERO) {
        (true, false) => Some(0),
        (false, true) => Some(1),
        _ => None,
    };

    tracing::debug!(?a, ?b, ticks, ?winner, "Duel finished");

    DuelResult {
        winner,
        ticks,
        remaining_a,
        remaining_b,
    }
}

/// Ticks an attacker of type `attacker` needs to kill a fresh `target`
/// while standing in reach, or `None` if it cannot attack.
#[must_use]
pub fn time_to_kill(balance: &BalanceTable, attacker: UnitType, target: UnitType) -> Option<u64> {
    let damage = balance.stats(attacker).attack?.damage;
    let health = balance.stats(target).max_health;
    let hits = (health / damage).ceil();
    Some(hits.to_num::<u64>())
}

/// Time-to-kill for every attacker/target pair among the given types.
#[must_use]
pub fn ttk_matrix(balance: &BalanceTable, types: &[UnitType]) -> Vec<(UnitType, UnitType, u64)> {
    types
        .iter()
        .flat_map(|&attacker| {
            types.iter().filter_map(move |&target| {
                time_to_kill(balance, attacker, target).map(|ttk| (attacker, target, ttk))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::fixed;

    #[test]
    fn test_mirror_duel_goes_to_the_first_striker() {
        // Both take 10 per tick until the tick where the lower id lands the
        // killing blow before the other can answer
        let result = run_duel(UnitType::Melee, UnitType::Melee, fixed(0), 100);
        assert_eq!(result.winner, Some(0));
        assert_eq!(result.ticks, 10);
        assert_eq!(result.remaining_a, fixed(10));
        assert_eq!(result.remaining_b, I32F32::ZERO);
    }

    #[test]
    fn test_ranged_outlasts_melee_at_distance() {
        // Auto-attack never acquires a target outside the melee unit's reach
        let result = run_duel(UnitType::Ranged, UnitType::Melee, fixed(8), 200);
        assert_eq!(result.winner, Some(0));
    }

    #[test]
    fn test_time_to_kill() {
        let balance = BalanceTable::default();
        assert_eq!(time_to_kill(&balance, UnitType::Melee, UnitType::Melee), Some(10));
        assert_eq!(time_to_kill(&balance, UnitType::Fast, UnitType::Ranged), Some(14));
        assert_eq!(time_to_kill(&balance, UnitType::HQ, UnitType::Melee), None);
    }

    #[test]
    fn test_ttk_matrix_skips_non_attackers() {
        let balance = BalanceTable::default();
        let matrix = ttk_matrix(&balance, &[UnitType::HQ, UnitType::Turret, UnitType::Fast]);
        assert_eq!(matrix.len(), 6);
        assert!(matrix.iter().all(|&(attacker, _, _)| attacker != UnitType::HQ));
    }
}
