//! Balance file loading and validation.

use std::path::Path;

use flategy_core::data::BalanceTable;

use crate::error::{Result, ToolError};

/// Read a RON balance table from disk and validate it.
///
/// # Errors
///
/// Returns [`ToolError::Io`] if the file cannot be read, or a wrapped
/// [`GameError`](flategy_core::error::GameError) if it does not parse or
/// fails validation.
pub fn load_balance(path: &Path) -> Result<BalanceTable> {
    let source = std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = BalanceTable::from_ron_named(&source, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), "Loaded balance table");
    Ok(table)
}

/// Validate a balance file, logging what differs from the built-in
/// defaults.
///
/// # Errors
///
/// Same as [`load_balance`].
pub fn validate_balance_file(path: &Path) -> Result<BalanceTable> {
    let table = load_balance(path)?;
    let defaults = BalanceTable::default();

    for unit_type in flategy_core::components::UnitType::ALL {
        if table.stats(unit_type) != defaults.stats(unit_type) {
            tracing::info!(?unit_type, "Overrides default stats");
        }
    }
    if table.separation != defaults.separation {
        tracing::info!(separation = %table.separation, "Overrides default separation");
    }

    Ok(table)
}
