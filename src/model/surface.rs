use std::fmt;

use crate::geometry::Rect;

/// One tiling context: a screen showing one desktop of one activity.
///
/// Surfaces are derived from host state whenever they are needed and never
/// stored on windows.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub screen: usize,
    pub desktop: u32,
    pub activity: String,
    pub group: u32,
    pub working_area: Rect,
    /// Excluded from tiling by rules; uses the floating layout.
    pub ignore: bool,
}

impl Surface {
    /// Registry key for this surface. Activity and group are folded in only
    /// when layouts are kept separately per activity or per desktop.
    pub fn key(&self, per_activity: bool, per_desktop: bool) -> SurfaceKey {
        SurfaceKey::new(
            self.screen,
            per_activity.then(|| self.activity.clone()),
            per_desktop.then_some(self.group),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceKey {
    pub screen: usize,
    pub activity: Option<String>,
    pub group: Option<u32>,
}

impl SurfaceKey {
    pub fn new(screen: usize, activity: Option<String>, group: Option<u32>) -> Self {
        Self { screen, activity, group }
    }
}

impl fmt::Display for SurfaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.screen)?;
        if let Some(activity) = &self.activity {
            write!(f, "@{activity}")?;
        }
        if let Some(group) = self.group {
            write!(f, "#{group}")?;
        }
        Ok(())
    }
}
