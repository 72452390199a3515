//! Property tests over random unit placements and command scripts.
//!
//! Every property runs the real tick loop; the generators live in
//! `flategy_test_utils::determinism::strategies`.

use flategy_core::prelude::*;
use flategy_test_utils::determinism::strategies::{
    arb_script, arb_unit_list, TestUnitParams,
};
use flategy_test_utils::fixtures::empty_world;
use proptest::prelude::*;

fn populate(units: &[TestUnitParams]) -> World {
    let mut world = empty_world();
    for params in units {
        world.insert_unit(UnitSpawnParams::new(
            params.unit_type,
            params.owner,
            params.position,
        ));
    }
    world
}

fn is_strictly_ascending(snapshot: &Snapshot) -> bool {
    snapshot.units.windows(2).all(|pair| pair[0].id < pair[1].id)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Two runs of the same placements and script end in the same state.
    #[test]
    fn prop_identical_inputs_give_identical_worlds(
        units in arb_unit_list(12),
        script in arb_script(14, 25, 4),
    ) {
        let mut a = populate(&units);
        let mut b = populate(&units);
        for batch in &script {
            let events_a = a.tick(batch);
            let events_b = b.tick(batch);
            prop_assert_eq!(events_a, events_b);
        }
        prop_assert_eq!(a.state_hash(), b.state_hash());
        prop_assert_eq!(a.view(), b.view());
    }

    /// Ids stay unique and ascending, and new ids are always above any id
    /// ever handed out before.
    #[test]
    fn prop_ids_are_monotonic(
        units in arb_unit_list(10),
        script in arb_script(12, 30, 5),
    ) {
        let mut world = populate(&units);
        let mut highest = world.view().max_id().unwrap_or(0);

        for batch in &script {
            let events = world.tick(batch);
            for &id in &events.spawned {
                prop_assert!(id > highest);
                highest = id;
            }
            let view = world.view();
            prop_assert!(is_strictly_ascending(&view));
            prop_assert!(view.max_id().unwrap_or(0) <= highest);
        }
    }

    /// A surviving unit's health never goes up, and dead units never
    /// come back.
    #[test]
    fn prop_health_only_decreases(
        units in arb_unit_list(10),
        script in arb_script(12, 30, 5),
    ) {
        let mut world = populate(&units);
        let mut removed = Vec::new();

        for batch in &script {
            let before = world.view();
            let events = world.tick(batch);
            let after = world.view();

            for unit in &after {
                prop_assert!(unit.is_alive());
                if let Some(old) = before.get(unit.id) {
                    prop_assert!(unit.health <= old.health);
                }
            }
            removed.extend(events.deaths);
            for id in &removed {
                prop_assert!(after.get(*id).is_none());
            }
        }
    }

    /// Structures never change position whatever they are told.
    #[test]
    fn prop_stationary_units_never_move(
        units in arb_unit_list(12),
        script in arb_script(14, 20, 6),
    ) {
        let mut world = populate(&units);

        for batch in &script {
            let before = world.view();
            world.tick(batch);
            let after = world.view();

            for unit in before.iter().filter(|u| !u.unit_type.is_mobile()) {
                if let Some(now) = after.get(unit.id) {
                    prop_assert_eq!(now.position, unit.position);
                }
            }
        }
    }

    /// Units told to stop in both slots keep their place and health, even
    /// when their footprints overlap.
    #[test]
    fn prop_stopped_units_stay_put(
        units in arb_unit_list(12),
        ticks in 1usize..10,
    ) {
        let mut world = empty_world();
        for params in &units {
            world.insert_unit(
                UnitSpawnParams::new(params.unit_type, params.owner, params.position)
                    .with_commands(Command::Stop, Command::Stop),
            );
        }
        let initial = world.view();

        for _ in 0..ticks {
            world.tick(&TickData::new());
        }
        prop_assert_eq!(world.view().units, initial.units);
    }

    /// Snapshots taken earlier are unaffected by later ticks.
    #[test]
    fn prop_snapshots_are_values(
        units in arb_unit_list(8),
        script in arb_script(10, 10, 4),
    ) {
        let mut world = populate(&units);
        let first = world.view();
        let copy = first.clone();
        for batch in &script {
            world.tick(batch);
        }
        prop_assert_eq!(first, copy);
        prop_assert_eq!(world.get_tick(), script.len() as u64);
    }
}
