use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::collections::HashSet;
use crate::layout_engine::LayoutClass;

pub const DEFAULT_CONFIG: &str = include_str!("../../stratum.default.toml");

pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stratum").join("stratum.toml"))
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub rules: RuleSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Keep a separate layout per activity.
    #[serde(default = "yes")]
    pub layout_per_activity: bool,
    /// Keep a separate layout per surface group (desktop).
    #[serde(default = "yes")]
    pub layout_per_desktop: bool,
    /// Pull committed geometry back inside the working area.
    #[serde(default = "yes")]
    pub prevent_protrusion: bool,
    #[serde(default = "yes")]
    pub keep_float_above: bool,
    #[serde(default = "no")]
    pub new_window_as_master: bool,
    /// Feed interactive resizes into the layout's parameters.
    #[serde(default = "yes")]
    pub adjust_layout: bool,
    /// Also adjust while the resize is still in progress.
    #[serde(default = "yes")]
    pub adjust_layout_live: bool,
    /// Dragging a tile further than this from its slot floats it.
    #[serde(default = "default_float_on_drag_distance")]
    pub float_on_drag_distance: i32,
    /// Group position of each host screen, indexed by screen.
    #[serde(default)]
    pub screen_order: Vec<usize>,
    /// Upper bound for the generated group shortcuts.
    #[serde(default = "default_group_shortcuts")]
    pub group_shortcuts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layout_per_activity: true,
            layout_per_desktop: true,
            prevent_protrusion: true,
            keep_float_above: true,
            new_window_as_master: false,
            adjust_layout: true,
            adjust_layout_live: true,
            float_on_drag_distance: default_float_on_drag_distance(),
            screen_order: Vec::new(),
            group_shortcuts: default_group_shortcuts(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    /// Classes in cycling order. Classes left out are still reachable through
    /// toggle actions.
    #[serde(default = "default_layout_order")]
    pub order: Vec<LayoutClass>,
    #[serde(default)]
    pub gaps: GapSettings,
    #[serde(default = "default_master_ratio_min")]
    pub master_ratio_min: f64,
    #[serde(default = "default_master_ratio_max")]
    pub master_ratio_max: f64,
    #[serde(default = "default_master_ratio_step")]
    pub master_ratio_step: f64,
    #[serde(default = "default_max_master_count")]
    pub max_master_count: usize,
    #[serde(default = "default_stair_step")]
    pub stair_step: i32,
    /// Give a surface's only tile the whole working area, ignoring gaps.
    #[serde(default = "no")]
    pub maximize_sole_tile: bool,
    /// Monocle tiles cover the whole working area, ignoring gaps.
    #[serde(default = "yes")]
    pub monocle_maximize: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            order: default_layout_order(),
            gaps: GapSettings::default(),
            master_ratio_min: default_master_ratio_min(),
            master_ratio_max: default_master_ratio_max(),
            master_ratio_step: default_master_ratio_step(),
            max_master_count: default_max_master_count(),
            stair_step: default_stair_step(),
            maximize_sole_tile: false,
            monocle_maximize: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct GapSettings {
    #[serde(default)]
    pub outer: OuterGaps,
    /// Space between neighbouring tiles.
    #[serde(default)]
    pub tile: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct OuterGaps {
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub left: i32,
    #[serde(default)]
    pub bottom: i32,
    #[serde(default)]
    pub right: i32,
}

/// Raw policy rules. Compiled into `rules::WindowRules` by the engine.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct RuleSettings {
    #[serde(default = "default_ignore_class")]
    pub ignore_class: Vec<String>,
    #[serde(default)]
    pub float_class: Vec<String>,
    /// Regular expressions matched against the window title.
    #[serde(default)]
    pub ignore_title: Vec<String>,
    #[serde(default)]
    pub float_title: Vec<String>,
    #[serde(default = "default_ignore_role")]
    pub ignore_role: Vec<String>,
    #[serde(default)]
    pub ignore_screen: Vec<usize>,
    #[serde(default)]
    pub ignore_activity: Vec<String>,
    /// Float dialogs, utility and other special windows.
    #[serde(default = "yes")]
    pub float_utility: bool,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            ignore_class: default_ignore_class(),
            float_class: Vec::new(),
            ignore_title: Vec::new(),
            float_title: Vec::new(),
            ignore_role: default_ignore_role(),
            ignore_screen: Vec::new(),
            ignore_activity: Vec::new(),
            float_utility: true,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.float_on_drag_distance < 0 {
            issues.push("float_on_drag_distance must be non-negative".to_string());
        }

        let mut seen = HashSet::default();
        for index in &self.screen_order {
            if !seen.insert(index) {
                issues.push(format!("screen_order assigns position {index} more than once"));
            }
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.float_on_drag_distance < 0 {
            self.float_on_drag_distance = default_float_on_drag_distance();
            fixes += 1;
        }

        let mut seen = HashSet::default();
        let before = self.screen_order.len();
        self.screen_order.retain(|index| seen.insert(*index));
        if self.screen_order.len() != before {
            fixes += 1;
        }

        fixes
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.order.is_empty() {
            issues.push("layout order must name at least one layout".to_string());
        }
        let mut seen = HashSet::default();
        for class in &self.order {
            if !seen.insert(class) {
                issues.push(format!("layout order lists {class} more than once"));
            }
        }

        if !(self.master_ratio_min > 0.0
            && self.master_ratio_min < self.master_ratio_max
            && self.master_ratio_max < 1.0)
        {
            issues.push(format!(
                "master ratio bounds must satisfy 0 < min < max < 1 (got {} and {})",
                self.master_ratio_min, self.master_ratio_max
            ));
        }
        if !(self.master_ratio_step > 0.0 && self.master_ratio_step <= 0.5) {
            issues.push(format!(
                "master_ratio_step must be in (0, 0.5] (got {})",
                self.master_ratio_step
            ));
        }
        if self.max_master_count == 0 {
            issues.push("max_master_count must be at least 1".to_string());
        }
        if !(16..=160).contains(&self.stair_step) {
            issues.push(format!("stair_step must be in [16, 160] (got {})", self.stair_step));
        }

        issues.extend(self.gaps.validate());
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.order.is_empty() {
            self.order = default_layout_order();
            fixes += 1;
        }
        let mut seen = HashSet::default();
        let before = self.order.len();
        self.order.retain(|class| seen.insert(*class));
        if self.order.len() != before {
            fixes += 1;
        }

        if !(self.master_ratio_min > 0.0
            && self.master_ratio_min < self.master_ratio_max
            && self.master_ratio_max < 1.0)
        {
            self.master_ratio_min = default_master_ratio_min();
            self.master_ratio_max = default_master_ratio_max();
            fixes += 1;
        }
        if !(self.master_ratio_step > 0.0 && self.master_ratio_step <= 0.5) {
            self.master_ratio_step = default_master_ratio_step();
            fixes += 1;
        }
        if self.max_master_count == 0 {
            self.max_master_count = default_max_master_count();
            fixes += 1;
        }
        if !(16..=160).contains(&self.stair_step) {
            self.stair_step = self.stair_step.clamp(16, 160);
            fixes += 1;
        }

        fixes + self.gaps.auto_fix_values()
    }
}

impl GapSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.outer.validate();
        if self.tile < 0 {
            issues.push(format!("tile gap must be non-negative (got {})", self.tile));
        }
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = self.outer.auto_fix_values();
        if self.tile < 0 {
            self.tile = 0;
            fixes += 1;
        }
        fixes
    }
}

impl OuterGaps {
    fn sides_mut(&mut self) -> [(&'static str, &mut i32); 4] {
        [
            ("top", &mut self.top),
            ("left", &mut self.left),
            ("bottom", &mut self.bottom),
            ("right", &mut self.right),
        ]
    }

    pub fn validate(&self) -> Vec<String> {
        [("top", self.top), ("left", self.left), ("bottom", self.bottom), ("right", self.right)]
            .into_iter()
            .filter(|(_, value)| *value < 0)
            .map(|(side, value)| format!("outer {side} gap must be non-negative (got {value})"))
            .collect()
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;
        for (_, value) in self.sides_mut() {
            if *value < 0 {
                *value = 0;
                fixes += 1;
            }
        }
        fixes
    }
}

impl RuleSettings {
    pub fn validate(&self) -> Vec<String> {
        self.ignore_title
            .iter()
            .chain(&self.float_title)
            .filter_map(|pattern| {
                regex::Regex::new(pattern)
                    .err()
                    .map(|err| format!("invalid title pattern '{pattern}': {err}"))
            })
            .collect()
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let before = self.ignore_title.len() + self.float_title.len();
        self.ignore_title.retain(|pattern| regex::Regex::new(pattern).is_ok());
        self.float_title.retain(|pattern| regex::Regex::new(pattern).is_ok());
        before - self.ignore_title.len() - self.float_title.len()
    }
}

fn yes() -> bool { true }

fn no() -> bool { false }

fn default_float_on_drag_distance() -> i32 { 30 }

fn default_group_shortcuts() -> u32 { 10 }

fn default_layout_order() -> Vec<LayoutClass> {
    vec![
        LayoutClass::Tile,
        LayoutClass::Monocle,
        LayoutClass::ThreeColumn,
        LayoutClass::Spiral,
        LayoutClass::Quarter,
        LayoutClass::Stair,
        LayoutClass::Spread,
        LayoutClass::Floating,
    ]
}

fn default_master_ratio_min() -> f64 { 0.2 }

fn default_master_ratio_max() -> f64 { 0.8 }

fn default_master_ratio_step() -> f64 { 0.05 }

fn default_max_master_count() -> usize { 10 }

fn default_stair_step() -> i32 { 24 }

fn default_ignore_class() -> Vec<String> {
    ["krunner", "yakuake", "spectacle", "kded5", "plasmashell"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_ignore_role() -> Vec<String> { vec!["quake".to_string()] }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }

    /// Save the current config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.settings.validate());
        issues.extend(self.layout.validate());
        issues.extend(self.rules.validate());
        issues
    }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        self.settings.auto_fix_values() + self.layout.auto_fix_values() + self.rules.auto_fix_values()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_file_matches_builtin_defaults() {
        let parsed = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
        assert!(parsed.validate().is_empty());
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("[settings]\nanimate = true\n").is_err());
    }

    #[test]
    fn validation_and_auto_fix() {
        let mut config = Config::default();
        config.layout.master_ratio_min = 0.9;
        config.layout.gaps.outer.left = -4;
        config.rules.float_title.push("(".into());
        let issues = config.validate();
        assert_eq!(issues.len(), 3, "{issues:?}");

        assert_eq!(config.auto_fix_values(), 3);
        assert!(config.validate().is_empty());
        assert_eq!(config.layout.master_ratio_min, 0.2);
        assert_eq!(config.layout.gaps.outer.left, 0);
        assert!(config.rules.float_title.is_empty());
    }

    #[test]
    fn duplicate_layouts_are_dropped() {
        let mut config = Config::parse(
            r#"
            [layout]
            order = ["tile", "monocle", "tile"]
            "#,
        )
        .unwrap();
        assert_eq!(config.validate().len(), 1);
        assert_eq!(config.auto_fix_values(), 1);
        assert_eq!(config.layout.order, vec![LayoutClass::Tile, LayoutClass::Monocle]);
    }

    #[test]
    fn read_and_save_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stratum.toml");
        let mut config = Config::default();
        config.layout.gaps.tile = 8;
        config.settings.screen_order = vec![1, 0];
        config.save(&path).unwrap();
        assert_eq!(Config::read(&path).unwrap(), config);
    }
}
