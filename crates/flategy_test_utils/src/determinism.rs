//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the world produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Identical `GameData` and identical command batches must yield identical
//! snapshots. Sources of non-determinism guarded against:
//!
//! - **Floating-point math**: all simulation math is fixed-point via
//!   [`flategy_core::math::Fixed`].
//!
//! - **Map iteration order**: the registry is ordered by unit id and every
//!   subsystem walks it in that order.
//!
//! - **System randomness**: the only "random" behavior is the seeded
//!   layout generator.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual subsystem behavior
//! 2. **Property tests**: random command streams stay deterministic
//! 3. **Integration tests**: full scenarios are reproducible
//! 4. **Parallel tests**: N worlds on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use flategy_core::components::TickData;
use flategy_core::world::World;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic world).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "World is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state; receives the step index
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```
/// use flategy_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 10, || 0u64, |n, _| *n += 2, |n| *n);
/// result.assert_deterministic();
/// assert_eq!(result.hashes, vec![20, 20, 20]);
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for tick in 0..ticks {
            step(&mut state, tick);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Batch for a given tick of a script; ticks past the end get an empty
/// batch.
fn batch_at(script: &[TickData], tick: u64) -> Option<&TickData> {
    usize::try_from(tick).ok().and_then(|i| script.get(i))
}

fn run_script(world: &mut World, script: &[TickData], ticks: u64) {
    let empty = TickData::new();
    for tick in 0..ticks {
        world.tick(batch_at(script, tick).unwrap_or(&empty));
    }
}

/// Run a world twice with the same setup and command script, and check the
/// final states match exactly.
///
/// `script[i]` is fed to tick `i`; ticks beyond the script get empty
/// batches.
pub fn verify_world_determinism<F>(setup_fn: F, script: &[TickData], num_ticks: u64) -> bool
where
    F: Fn() -> World,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |world, tick| {
            let empty = TickData::new();
            world.tick(batch_at(script, tick).unwrap_or(&empty));
        },
        World::state_hash,
    );
    result.is_deterministic
}

/// Result of parallel world runs.
#[derive(Debug, Clone)]
pub struct ParallelWorldResult {
    /// Final state hash from each world.
    pub hashes: Vec<u64>,
    /// Number of ticks each world ran.
    pub ticks: u64,
}

impl ParallelWorldResult {
    /// Check if all worlds produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all worlds matched.
    ///
    /// # Panics
    ///
    /// Panics if the worlds produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            panic!(
                "Parallel worlds diverged!\n\
                 Worlds: {}\n\
                 Ticks: {}\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                self.hashes
            );
        }
    }
}

/// Run N worlds on N scoped threads and collect their final hashes.
///
/// Catches non-determinism that only shows up under different thread
/// scheduling or memory layout.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_worlds<F>(
    setup_fn: F,
    script: &[TickData],
    num_worlds: usize,
    num_ticks: u64,
) -> ParallelWorldResult
where
    F: Fn() -> World + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_worlds)
            .map(|_| {
                s.spawn(|| {
                    let mut world = setup_fn();
                    run_script(&mut world, script, num_ticks);
                    world.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("world thread panicked"))
            .collect()
    });

    ParallelWorldResult {
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two runs tick by tick, finding the first divergence.
///
/// Returns `None` if the runs stay identical, `Some(tick)` otherwise.
pub fn find_first_divergence<F>(setup_fn: F, script: &[TickData], num_ticks: u64) -> Option<u64>
where
    F: Fn() -> World,
{
    let mut a = setup_fn();
    let mut b = setup_fn();
    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    let empty = TickData::new();
    for tick in 0..num_ticks {
        let batch = batch_at(script, tick).unwrap_or(&empty);
        a.tick(batch);
        b.tick(batch);
        if a.state_hash() != b.state_hash() || a.view() != b.view() {
            tracing::warn!(tick = tick + 1, "Worlds diverged");
            return Some(tick + 1);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the world.
pub mod strategies {
    use flategy_core::components::{Command, CommandSlot, PlayerId, TickData, UnitId, UnitType};
    use flategy_core::math::{Fixed, Vec2Fixed};
    use proptest::prelude::*;

    /// Generate a coordinate, in quarter steps.
    ///
    /// Mostly within -60 to 60, so units meet within a few dozen ticks;
    /// one in five lies anywhere within a million units of the origin.
    pub fn arb_coordinate() -> impl Strategy<Value = Fixed> {
        prop_oneof![
            4 => (-240i32..240i32).prop_map(|q| Fixed::from_num(q) / Fixed::from_num(4)),
            1 => (-4_000_000i32..4_000_000i32).prop_map(|q| Fixed::from_num(q) / Fixed::from_num(4)),
        ]
    }

    /// Generate a position on the arena.
    pub fn arb_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_coordinate(), arb_coordinate()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// Generate any unit type.
    pub fn arb_unit_type() -> impl Strategy<Value = UnitType> {
        proptest::sample::select(UnitType::ALL.to_vec())
    }

    /// Generate a mobile unit type.
    pub fn arb_mobile_type() -> impl Strategy<Value = UnitType> {
        prop_oneof![
            Just(UnitType::Melee),
            Just(UnitType::Ranged),
            Just(UnitType::Fast),
        ]
    }

    /// Generate a player index for a two-player game.
    pub fn arb_owner() -> impl Strategy<Value = PlayerId> {
        0u16..2u16
    }

    /// Generate a unit id in `1..=max_id`, plus a few that never exist.
    pub fn arb_unit_id(max_id: UnitId) -> impl Strategy<Value = UnitId> {
        1..max_id + 4
    }

    /// Generate any command, referring to ids up to `max_id`.
    pub fn arb_command(max_id: UnitId) -> impl Strategy<Value = Command> {
        prop_oneof![
            Just(Command::Stop),
            Just(Command::IdleDoNothing),
            Just(Command::IdleDontMove),
            Just(Command::IdleAutoAttack),
            arb_position().prop_map(Command::Move),
            arb_unit_id(max_id).prop_map(Command::Attack),
            (arb_unit_type(), arb_position()).prop_map(|(t, p)| Command::Spawn(t, p)),
        ]
    }

    /// Generate one tick's batch of up to `max_len` entries.
    pub fn arb_tick_data(max_id: UnitId, max_len: usize) -> impl Strategy<Value = TickData> {
        proptest::collection::vec(
            (
                arb_unit_id(max_id),
                prop_oneof![
                    3 => Just(CommandSlot::Primary),
                    1 => Just(CommandSlot::Secondary),
                ],
                arb_command(max_id),
            ),
            0..max_len,
        )
        .prop_map(|entries| {
            let mut batch = TickData::new();
            for (unit, slot, command) in entries {
                batch.push_to_slot(unit, slot, command);
            }
            batch
        })
    }

    /// Generate a script of `ticks` batches.
    pub fn arb_script(
        max_id: UnitId,
        ticks: usize,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<TickData>> {
        proptest::collection::vec(arb_tick_data(max_id, max_len), ticks)
    }

    /// Parameters for placing a test unit.
    #[derive(Debug, Clone)]
    pub struct TestUnitParams {
        /// Unit type.
        pub unit_type: UnitType,
        /// Owner.
        pub owner: PlayerId,
        /// Position.
        pub position: Vec2Fixed,
    }

    /// Generate parameters for a test unit.
    pub fn arb_unit_params() -> impl Strategy<Value = TestUnitParams> {
        (arb_unit_type(), arb_owner(), arb_position()).prop_map(|(unit_type, owner, position)| {
            TestUnitParams {
                unit_type,
                owner,
                position,
            }
        })
    }

    /// Generate a list of unit placements.
    pub fn arb_unit_list(max_units: usize) -> impl Strategy<Value = Vec<TestUnitParams>> {
        proptest::collection::vec(arb_unit_params(), 1..max_units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{duel, fixed, skirmish};
    use flategy_core::components::{Command, GameData, UnitType};
    use flategy_core::math::Vec2Fixed;
    use proptest::prelude::*;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n, _| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_unique_hashes_reports_divergence() {
        let result = DeterminismResult {
            is_deterministic: false,
            hashes: vec![3, 1, 3],
            ticks: 1,
        };
        assert_eq!(result.unique_hashes(), vec![1, 3]);
    }

    #[test]
    fn test_seeded_world_determinism() {
        assert!(verify_world_determinism(
            || World::create(GameData::new(4, 77)).unwrap(),
            &[],
            50,
        ));
    }

    #[test]
    fn test_skirmish_determinism() {
        let result = verify_determinism(
            4,
            150,
            || skirmish(3, 12, 6),
            |world, _| {
                world.tick(&TickData::new());
            },
            World::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_parallel_worlds_match() {
        let script = vec![TickData::new().with(1, Command::Spawn(UnitType::Fast, Vec2Fixed::ZERO))];
        run_parallel_worlds(|| skirmish(2, 5, 4), &script, 4, 100).assert_deterministic();
    }

    #[test]
    fn test_no_divergence_in_duel() {
        let setup = || duel(UnitType::Ranged, UnitType::Fast, fixed(2)).0;
        assert_eq!(find_first_divergence(setup, &[], 60), None);
    }

    #[test]
    fn test_compute_hash_is_stable() {
        assert_eq!(compute_hash(&(1u32, "a")), compute_hash(&(1u32, "a")));
        assert_ne!(compute_hash(&1u32), compute_hash(&2u32));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_random_scripts_are_deterministic(
            script in strategies::arb_script(40, 30, 6),
            seed in 0u64..1000,
        ) {
            let setup = || skirmish(2, seed, 3);
            prop_assert!(verify_world_determinism(setup, &script, 40));
        }
    }
}
