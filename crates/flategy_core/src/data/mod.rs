//! Data structures for balance configuration.
//!
//! This module contains pure data structures that define the numeric side
//! of each unit type. All structs are designed to be deserialized from RON
//! files.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses strings. File loading is handled by `flategy_tools`.

mod balance_data;
mod unit_data;

pub use balance_data::BalanceTable;
pub use unit_data::{AttackStats, UnitStats};
