//! Replay files on disk.

use std::path::Path;

use flategy_core::replay::Replay;
use serde::Serialize;

use crate::error::{Result, ToolError};

/// What a verified replay file contained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Number of recorded ticks.
    pub ticks: u64,
    /// Number of command entries across all ticks.
    pub commands: usize,
    /// Hash of the re-run's final state.
    pub final_hash: u64,
}

/// Write a replay file.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn save_replay(path: &Path, replay: &Replay) -> Result<()> {
    let bytes = replay.to_bytes()?;
    std::fs::write(path, bytes).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), ticks = replay.duration(), "Saved replay");
    Ok(())
}

/// Read a replay file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is malformed, or comes
/// from another replay format version.
pub fn load_replay(path: &Path) -> Result<Replay> {
    let bytes = std::fs::read(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Replay::from_bytes(&bytes)?)
}

/// Load a replay file and re-run it against its checkpoints.
///
/// # Errors
///
/// Same as [`load_replay`], plus
/// [`GameError::DesyncDetected`](flategy_core::error::GameError::DesyncDetected)
/// if the re-run diverges.
pub fn verify_replay_file(path: &Path) -> Result<ReplaySummary> {
    let replay = load_replay(path)?;
    let world = replay.verify()?;
    Ok(ReplaySummary {
        ticks: replay.duration(),
        commands: replay.command_count(),
        final_hash: world.state_hash(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::{record, SimulateOptions};
    use flategy_core::error::GameError;

    #[test]
    fn test_saved_replay_verifies() {
        let (report, replay) = record(&SimulateOptions {
            seed: 6,
            players: 2,
            ticks: 12,
            balance: None,
        })
        .unwrap();
        let path = std::env::temp_dir().join(format!("flategy_{}_ok.replay", std::process::id()));

        save_replay(&path, &replay).unwrap();
        let summary = verify_replay_file(&path).unwrap();
        assert_eq!(summary.ticks, 12);
        assert_eq!(summary.final_hash, report.state_hash);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_garbage_file_is_rejected() {
        let path = std::env::temp_dir().join(format!("flategy_{}_bad.replay", std::process::id()));
        std::fs::write(&path, b"not a replay").unwrap();
        let err = load_replay(&path).unwrap_err();
        assert!(matches!(
            err,
            ToolError::Game(GameError::Serialization(_) | GameError::ReplayVersion { .. })
        ));
        std::fs::remove_file(path).ok();
    }
}
