//! Recording and playing back games.
//!
//! A replay is the initial world plus every command batch in tick order.
//! Because ticks are deterministic this is enough to recreate the whole
//! game; the per-tick state hashes let a re-run prove that it did.

use serde::{Deserialize, Serialize};

use crate::components::{Snapshot, TickData};
use crate::error::{GameError, Result};
use crate::world::{TickEvents, World};

/// Replay format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Complete replay data structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// World as it was before the first recorded tick.
    pub initial_state: World,
    /// Command batches, one per tick.
    pub ticks: Vec<TickData>,
    /// State hash after each tick; `checkpoints[i]` follows `ticks[i]`.
    pub checkpoints: Vec<u64>,
}

impl Replay {
    /// Number of recorded ticks.
    #[must_use]
    pub fn duration(&self) -> u64 {
        self.ticks.len() as u64
    }

    /// Total number of command entries across all ticks.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.ticks.iter().map(TickData::len).sum()
    }

    /// Hash recorded after the last tick, if any.
    #[must_use]
    pub fn final_hash(&self) -> Option<u64> {
        self.checkpoints.last().copied()
    }

    /// Re-run the replay from its initial state, checking every checkpoint.
    ///
    /// Returns the final world on success.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DesyncDetected`] at the first tick whose hash
    /// differs from the recording.
    pub fn verify(&self) -> Result<World> {
        let mut world = self.initial_state.clone();
        for (batch, &expected) in self.ticks.iter().zip(&self.checkpoints) {
            world.tick(batch);
            let actual = world.state_hash();
            if actual != expected {
                tracing::warn!(
                    tick = world.get_tick(),
                    local_hash = actual,
                    remote_hash = expected,
                    "Replay diverged"
                );
                return Err(GameError::DesyncDetected {
                    tick: world.get_tick(),
                    local_hash: actual,
                    remote_hash: expected,
                });
            }
        }
        Ok(world)
    }

    /// Encode the replay as bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Serialization`] if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::Serialization(format!("Failed to serialize replay: {e}")))
    }

    /// Decode a replay, rejecting other format versions.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Serialization`] for malformed bytes or
    /// [`GameError::ReplayVersion`] for a replay from another version.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let replay: Self = bincode::deserialize(data)
            .map_err(|e| GameError::Serialization(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::ReplayVersion {
                expected: REPLAY_VERSION,
                found: replay.version,
            });
        }

        Ok(replay)
    }
}

/// Wraps a world and records everything fed into it.
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    world: World,
    replay: Replay,
}

impl ReplayRecorder {
    /// Start recording from the world's current state.
    #[must_use]
    pub fn new(world: World) -> Self {
        let replay = Replay {
            version: REPLAY_VERSION,
            initial_state: world.clone(),
            ticks: Vec::new(),
            checkpoints: Vec::new(),
        };
        Self { world, replay }
    }

    /// Advance the wrapped world and record the batch and resulting hash.
    pub fn tick(&mut self, commands: &TickData) -> TickEvents {
        let events = self.world.tick(commands);
        self.replay.ticks.push(commands.clone());
        self.replay.checkpoints.push(self.world.state_hash());
        events
    }

    /// The live world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Stop recording, returning the replay and the live world.
    #[must_use]
    pub fn finish(self) -> (Replay, World) {
        (self.replay, self.world)
    }
}

/// Steps through a replay one tick at a time.
#[derive(Debug, Clone)]
pub struct ReplayPlayer {
    replay: Replay,
    world: World,
    /// Index of the next batch to apply.
    cursor: usize,
}

impl ReplayPlayer {
    /// Create a new replay player positioned before the first tick.
    #[must_use]
    pub fn new(replay: Replay) -> Self {
        let world = replay.initial_state.clone();
        Self {
            replay,
            world,
            cursor: 0,
        }
    }

    /// Advance the replay by one tick.
    ///
    /// Returns true if there are more ticks to play.
    pub fn advance(&mut self) -> bool {
        if let Some(batch) = self.replay.ticks.get(self.cursor) {
            self.world.tick(batch);
            self.cursor += 1;
        }
        !self.is_finished()
    }

    /// Jump to a tick offset from the start of the recording, replaying
    /// from the beginning when moving backward.
    pub fn seek(&mut self, target: usize) {
        if target < self.cursor {
            self.world = self.replay.initial_state.clone();
            self.cursor = 0;
        }
        while self.cursor < target && !self.is_finished() {
            self.advance();
        }
    }

    /// Number of recorded ticks played so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor
    }

    /// The world at the current position.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Snapshot of the world at the current position.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.world.view()
    }

    /// The replay being played.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Check if the replay has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.replay.ticks.len()
    }
}
