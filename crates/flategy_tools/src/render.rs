//! Presentation views of layouts and snapshots.
//!
//! These types are kept apart from the core types so the conversion is
//! explicit. Fixed-point values become `f64` here and nowhere earlier.

use clap::ValueEnum;
use flategy_core::components::{Snapshot, UnitType, NEUTRAL_PLAYER};
use flategy_core::map_generation::MapLayout;
use serde::Serialize;

use crate::error::{Result, ToolError};

/// A wall cell `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Wall(pub u32, pub u32);

/// A player's spawn cell `(x, y, player)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Spawn(pub u32, pub u32, pub u16);

/// Grid-level view of a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapView {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Neutral wall cells.
    pub walls: Vec<Wall>,
    /// Spawn cells, one per player.
    pub spawns: Vec<Spawn>,
}

/// Column-oriented view of the live units.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnitsView {
    /// Unit ids.
    pub id: Vec<u64>,
    /// Unit type names.
    pub kind: Vec<&'static str>,
    /// X coordinates.
    pub x: Vec<f64>,
    /// Y coordinates.
    pub y: Vec<f64>,
    /// Owners; `None` for neutral units.
    pub owner: Vec<Option<u16>>,
    /// Health.
    pub health: Vec<f64>,
}

impl UnitsView {
    /// Number of units in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.id.len()
    }

    /// Check if the view has no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

/// Final state of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Tick reached.
    pub tick: u64,
    /// State hash at that tick.
    pub state_hash: u64,
    /// Starting layout.
    pub map: MapView,
    /// Units alive at the end.
    pub units: UnitsView,
}

/// Output encodings for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Pretty-printed RON.
    Ron,
}

impl OutputFormat {
    /// Encode a serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Output`] if the serializer fails.
    pub fn encode<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(value).map_err(|e| ToolError::Output {
                format: "json",
                message: e.to_string(),
            }),
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
                .map_err(|e| ToolError::Output {
                    format: "ron",
                    message: e.to_string(),
                }),
        }
    }
}

/// Display name of a unit type.
#[must_use]
pub const fn type_name(unit_type: UnitType) -> &'static str {
    match unit_type {
        UnitType::Block => "block",
        UnitType::Territory => "territory",
        UnitType::HQ => "hq",
        UnitType::Turret => "turret",
        UnitType::Melee => "melee",
        UnitType::Ranged => "ranged",
        UnitType::Fast => "fast",
    }
}

/// Grid view of a layout.
#[must_use]
pub fn render_map(layout: &MapLayout) -> MapView {
    let walls = layout
        .placements
        .iter()
        .filter(|p| p.unit_type == UnitType::Block)
        .map(|p| Wall(p.cell.0, p.cell.1))
        .collect();
    let spawns = layout
        .spawns
        .iter()
        .zip(0u16..)
        .map(|(&(x, y), player)| Spawn(x, y, player))
        .collect();

    MapView {
        width: layout.width,
        height: layout.height,
        walls,
        spawns,
    }
}

/// Write the units of a snapshot into `dest`, reusing its buffers.
pub fn render_units_to(snapshot: &Snapshot, dest: &mut UnitsView) {
    dest.id.clear();
    dest.kind.clear();
    dest.x.clear();
    dest.y.clear();
    dest.owner.clear();
    dest.health.clear();

    for unit in snapshot {
        let (x, y) = unit.position.to_f64();
        dest.id.push(unit.id);
        dest.kind.push(type_name(unit.unit_type));
        dest.x.push(x);
        dest.y.push(y);
        dest.owner
            .push((unit.owner != NEUTRAL_PLAYER).then_some(unit.owner));
        dest.health.push(unit.health.to_num());
    }
}

/// Column view of a snapshot's units.
#[must_use]
pub fn render_units(snapshot: &Snapshot) -> UnitsView {
    let mut view = UnitsView::default();
    render_units_to(snapshot, &mut view);
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use flategy_core::components::GameData;
    use flategy_core::map_generation::generate_layout;
    use flategy_core::world::World;
    use flategy_test_utils::fixtures::{empty_world, fixed_f, place, pos};
    use flategy_core::components::Command;

    #[test]
    fn test_render_map() {
        let layout = generate_layout(&GameData::new(3, 11)).unwrap();
        let view = render_map(&layout);
        assert_eq!(view.width, layout.width);
        assert_eq!(view.spawns.len(), 3);
        assert_eq!(view.spawns[2].2, 2);
        assert_eq!(view.walls.len(), layout.count_of(UnitType::Block));
    }

    #[test]
    fn test_render_units() {
        let mut world = empty_world();
        place(&mut world, UnitType::Melee, 0, pos(1, 2), Command::Stop);
        world.insert_unit(
            flategy_core::world::UnitSpawnParams::new(
                UnitType::Block,
                NEUTRAL_PLAYER,
                flategy_core::math::Vec2Fixed::new(fixed_f(0.5), fixed_f(-3.25)),
            ),
        );

        let units = render_units(&world.view());
        assert_eq!(units.len(), 2);
        assert_eq!(units.kind, vec!["melee", "block"]);
        assert_eq!(units.x, vec![1.0, 0.5]);
        assert_eq!(units.y, vec![2.0, -3.25]);
        assert_eq!(units.owner, vec![Some(0), None]);
        assert_eq!(units.health, vec![100.0, 500.0]);
    }

    #[test]
    fn test_render_units_to_reuses_buffers() {
        let world = World::create(GameData::new(2, 4)).unwrap();
        let mut view = render_units(&world.view());
        assert!(!view.is_empty());
        render_units_to(&empty_world().view(), &mut view);
        assert!(view.is_empty());
        assert!(view.x.is_empty() && view.kind.is_empty());
    }

    #[test]
    fn test_output_formats() {
        let layout = generate_layout(&GameData::new(2, 1)).unwrap();
        let map = render_map(&layout);

        let json = OutputFormat::Json.encode(&map).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["width"], layout.width);

        let ron_text = OutputFormat::Ron.encode(&map).unwrap();
        assert!(ron_text.contains("width"));
    }
}
