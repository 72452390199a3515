//! # Flategy Core
//!
//! Deterministic simulation core for Flategy.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness (map layout uses a seeded generator)
//! - No floating-point math inside a tick (uses fixed-point)
//!
//! Callers hand the core plain in-memory command batches ([`TickData`]) and
//! receive plain in-memory [`Snapshot`]s. Translating those to any wire
//! format is the job of whatever binding layer sits on top.
//!
//! ## Crate Structure
//!
//! - [`components`] - Units, commands and the batch/snapshot types
//! - [`data`] - Balance tables (per-type numeric configuration)
//! - [`math`] - Fixed-point math utilities
//! - [`spatial`] - Reach and overlap checks shared by the subsystems
//! - [`resolver`] - Picks the governing command slot per unit
//! - [`movement`], [`combat`], [`spawn`] - Per-tick subsystems
//! - [`map_generation`] - Seeded initial layout
//! - [`world`] - The tick orchestrator
//! - [`replay`] - Recording and verifying command streams
//!
//! [`TickData`]: components::TickData
//! [`Snapshot`]: components::Snapshot

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod components;
pub mod data;
pub mod error;
pub mod map_generation;
pub mod math;
pub mod movement;
pub mod registry;
pub mod replay;
pub mod resolver;
pub mod spatial;
pub mod spawn;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::components::*;
    pub use crate::data::{AttackStats, BalanceTable, UnitStats};
    pub use crate::error::{GameError, Result};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::replay::{Replay, ReplayPlayer, ReplayRecorder};
    pub use crate::world::{TickEvents, UnitSpawnParams, World};
}
