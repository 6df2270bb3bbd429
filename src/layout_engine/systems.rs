use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::action::{Action, ActionResponse};
use super::graph::Angle;
use crate::common::config::LayoutSettings;
use crate::geometry::{Rect, RectDelta};
use crate::model::{WindowId, WindowState};

/// A window as a layout sees it: an id, the geometry to fill in, the window's
/// weight on the current surface and the state the layout assigns.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: WindowId,
    pub geometry: Rect,
    pub weight: f64,
    pub state: WindowState,
}

impl Tile {
    pub fn new(id: WindowId, geometry: Rect) -> Self {
        Self {
            id,
            geometry,
            weight: 1.0,
            state: WindowState::Tiled,
        }
    }
}

#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::Display,
    strum::EnumIter
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayoutClass {
    Tile,
    Monocle,
    ThreeColumn,
    Spiral,
    Quarter,
    Cascade,
    Spread,
    Stair,
    TabbedMaster,
    Floating,
}

impl LayoutClass {
    /// Resolves a persisted or user-supplied class id. Anything unknown falls
    /// back to the floating layout.
    pub fn from_id(id: &str) -> LayoutClass {
        id.parse().unwrap_or_else(|_| {
            warn!(id, "unknown layout class, using floating");
            LayoutClass::Floating
        })
    }
}

/// Persisted per-layout parameters, stored as JSON under `layout/<key>/<class>`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    #[serde(rename = "classID")]
    pub class_id: String,
    #[serde(default)]
    pub rotation: Angle,
    #[serde(default)]
    pub part_rotation: Angle,
    #[serde(default = "default_master_count")]
    pub num_master_tiles: usize,
    #[serde(default = "default_master_ratio")]
    pub master_ratio: f64,
}

fn default_master_count() -> usize { 1 }

fn default_master_ratio() -> f64 { 0.5 }

impl LayoutState {
    pub fn new(class: LayoutClass) -> Self {
        Self {
            class_id: class.to_string(),
            rotation: Angle::zero(),
            part_rotation: Angle::zero(),
            num_master_tiles: default_master_count(),
            master_ratio: default_master_ratio(),
        }
    }
}

#[enum_dispatch]
pub trait WindowsLayout {
    fn class(&self) -> LayoutClass;

    /// Short human-readable label shown when the layout becomes current.
    fn description(&self) -> String;

    /// Fills in `geometry` and `state` for every tile, in order.
    fn apply(&mut self, area: Rect, tiles: &mut [Tile]);

    /// Feeds a user resize of `tiles[basis]` into the layout's parameters.
    fn adjust(&mut self, _area: Rect, _tiles: &mut [Tile], _basis: usize, _delta: RectDelta) {}

    fn execute_action(&mut self, _action: &Action) -> ActionResponse { ActionResponse::Unhandled }

    fn state(&self) -> LayoutState { LayoutState::new(self.class()) }

    fn restore(&mut self, _state: &LayoutState) {}

    fn draw_tree(&self) -> String;
}

mod cascade;
pub use cascade::{CascadeDirection, CascadeLayout};
mod floating;
pub use floating::FloatingLayout;
mod monocle;
pub use monocle::MonocleLayout;
mod quarter;
pub use quarter::QuarterLayout;
mod spiral;
pub use spiral::SpiralLayout;
mod spread;
pub use spread::SpreadLayout;
mod stair;
pub use stair::StairLayout;
mod tabbed_master;
pub use tabbed_master::TabbedMasterLayout;
mod three_column;
pub use three_column::ThreeColumnLayout;
mod tile;
pub use tile::TileLayout;

#[derive(Debug, Clone)]
#[enum_dispatch(WindowsLayout)]
pub enum Layout {
    Tile(TileLayout),
    Monocle(MonocleLayout),
    ThreeColumn(ThreeColumnLayout),
    Spiral(SpiralLayout),
    Quarter(QuarterLayout),
    Cascade(CascadeLayout),
    Spread(SpreadLayout),
    Stair(StairLayout),
    TabbedMaster(TabbedMasterLayout),
    Floating(FloatingLayout),
}

impl Layout {
    pub fn new(class: LayoutClass, settings: &LayoutSettings) -> Layout {
        match class {
            LayoutClass::Tile => TileLayout::new(settings).into(),
            LayoutClass::Monocle => MonocleLayout::new(settings).into(),
            LayoutClass::ThreeColumn => ThreeColumnLayout::new(settings).into(),
            LayoutClass::Spiral => SpiralLayout::new(settings).into(),
            LayoutClass::Quarter => QuarterLayout::new(settings).into(),
            LayoutClass::Cascade => CascadeLayout::new().into(),
            LayoutClass::Spread => SpreadLayout::new().into(),
            LayoutClass::Stair => StairLayout::new(settings).into(),
            LayoutClass::TabbedMaster => TabbedMasterLayout::new(settings).into(),
            LayoutClass::Floating => FloatingLayout.into(),
        }
    }

    pub fn is_floating(&self) -> bool { matches!(self, Layout::Floating(_)) }
}

/// Master ratio and master count limits shared by the master/stack layouts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MasterBounds {
    pub min_ratio: f64,
    pub max_ratio: f64,
    pub step: f64,
    pub max_count: usize,
}

impl MasterBounds {
    pub fn from_settings(settings: &LayoutSettings) -> Self {
        Self {
            min_ratio: settings.master_ratio_min,
            max_ratio: settings.master_ratio_max,
            step: settings.master_ratio_step,
            max_count: settings.max_master_count,
        }
    }

    pub fn clip_ratio(&self, ratio: f64) -> f64 {
        super::utils::clip(ratio, self.min_ratio, self.max_ratio)
    }

    pub fn slide_ratio(&self, ratio: f64, grow: bool) -> f64 {
        let step = if grow { self.step } else { -self.step };
        self.clip_ratio(super::utils::slide(ratio, step))
    }
}

pub(crate) fn assign(tiles: &mut [Tile], geometries: Vec<Rect>) {
    debug_assert_eq!(tiles.len(), geometries.len());
    for (tile, geometry) in tiles.iter_mut().zip(geometries) {
        tile.geometry = geometry;
        tile.state = WindowState::Tiled;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn tiles(n: usize) -> Vec<Tile> {
        (0..n).map(|i| Tile::new(WindowId::new(i as u64 + 1), Rect::default())).collect()
    }

    pub fn geometries(tiles: &[Tile]) -> Vec<Rect> { tiles.iter().map(|t| t.geometry).collect() }

    pub fn run(layout: &mut Layout, area: Rect, n: usize) -> Vec<Rect> {
        let mut ts = tiles(n);
        layout.apply(area, &mut ts);
        geometries(&ts)
    }

    #[test]
    fn unknown_class_resolves_to_floating() {
        assert_eq!(LayoutClass::from_id("three_column"), LayoutClass::ThreeColumn);
        assert_eq!(LayoutClass::from_id("BTreeLayout"), LayoutClass::Floating);
    }

    #[test]
    fn layout_state_reads_partial_json() {
        let state: LayoutState = serde_json::from_str(r#"{"classID":"tile","rotation":90}"#).unwrap();
        assert_eq!(state.class_id, "tile");
        assert_eq!(state.rotation.degrees(), 90);
        assert_eq!(state.num_master_tiles, 1);
        assert_eq!(state.master_ratio, 0.5);

        let json = serde_json::to_value(LayoutState::new(LayoutClass::Spiral)).unwrap();
        assert_eq!(json["classID"], "spiral");
        assert!(json.get("numMasterTiles").is_some());
        assert!(json.get("partRotation").is_some());
    }

    #[test]
    fn every_class_builds_a_matching_layout() {
        use strum::IntoEnumIterator;
        let settings = LayoutSettings::default();
        for class in LayoutClass::iter() {
            let layout = Layout::new(class, &settings);
            assert_eq!(layout.class(), class);
            assert_eq!(layout.state().class_id, class.to_string());
            assert!(!layout.draw_tree().is_empty());
        }
    }

    #[test]
    fn clones_are_independent() {
        let settings = LayoutSettings::default();
        let mut original = Layout::new(LayoutClass::Tile, &settings);
        original.execute_action(&Action::IncreaseMasterSize);
        let mut copy = original.clone();
        assert_eq!(copy.state(), original.state());
        copy.execute_action(&Action::IncreaseMasterCount);
        assert_eq!(original.state().num_master_tiles, 1);
        assert_eq!(copy.state().num_master_tiles, 2);
    }

    #[test]
    fn every_tiled_layout_marks_tiles_tiled() {
        use strum::IntoEnumIterator;
        let settings = LayoutSettings::default();
        let area = Rect::new(0, 0, 1200, 800);
        for class in LayoutClass::iter().filter(|c| *c != LayoutClass::Floating) {
            let mut layout = Layout::new(class, &settings);
            let mut ts = tiles(40);
            for t in &mut ts {
                t.state = WindowState::Undecided;
            }
            layout.apply(area, &mut ts);
            for t in &ts {
                assert_eq!(t.state, WindowState::Tiled, "{class}");
                assert!(area.includes(&t.geometry), "{class}: {:?}", t.geometry);
            }
        }
    }
}
