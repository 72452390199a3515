//! Headless simulation runs.

use std::path::PathBuf;

use flategy_core::components::{GameData, TickData};
use flategy_core::data::BalanceTable;
use flategy_core::map_generation::generate_layout;
use flategy_core::replay::{Replay, ReplayRecorder};
use flategy_core::world::World;

use crate::error::Result;
use crate::render::{render_map, render_units, SimulationReport};
use crate::validate::load_balance;

/// Parameters of a headless run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulateOptions {
    /// Map seed.
    pub seed: u64,
    /// Player count.
    pub players: u32,
    /// Ticks to advance.
    pub ticks: u64,
    /// Balance file to use instead of the built-in defaults.
    pub balance: Option<PathBuf>,
}

/// Create a world and advance it with empty batches.
///
/// # Errors
///
/// Returns an error if the balance file cannot be loaded or the
/// configuration is rejected.
pub fn run(options: &SimulateOptions) -> Result<SimulationReport> {
    record(options).map(|(report, _)| report)
}

/// Same as [`run`], also returning the recording of the run.
///
/// # Errors
///
/// See [`run`].
pub fn record(options: &SimulateOptions) -> Result<(SimulationReport, Replay)> {
    let balance = match &options.balance {
        Some(path) => load_balance(path)?,
        None => BalanceTable::default(),
    };
    let config = GameData::new(options.players, options.seed);
    let layout = generate_layout(&config)?;
    let mut recorder = ReplayRecorder::new(World::create_with_balance(config, balance)?);

    let idle = TickData::new();
    let mut deaths = 0;
    for _ in 0..options.ticks {
        deaths += recorder.tick(&idle).deaths.len();
    }

    let (replay, world) = recorder.finish();
    let snapshot = world.view();
    tracing::info!(
        tick = snapshot.tick,
        units = snapshot.len(),
        deaths,
        "Simulation finished"
    );

    let report = SimulationReport {
        tick: snapshot.tick,
        state_hash: world.state_hash(),
        map: render_map(&layout),
        units: render_units(&snapshot),
    };
    Ok((report, replay))
}
