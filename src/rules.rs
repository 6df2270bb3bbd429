use regex::Regex;
use tracing::warn;

use crate::common::config::RuleSettings;
use crate::host::HostWindow;

/// Compiled ignore and float policy.
#[derive(Debug, Clone)]
pub struct WindowRules {
    ignore_class: Vec<String>,
    float_class: Vec<String>,
    ignore_title: Vec<Regex>,
    float_title: Vec<Regex>,
    ignore_role: Vec<String>,
    ignore_screen: Vec<usize>,
    ignore_activity: Vec<String>,
    float_utility: bool,
}

fn compile(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(pattern, %err, "skipping invalid title pattern");
                None
            }
        })
        .collect()
}

impl WindowRules {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            ignore_class: settings.ignore_class.clone(),
            float_class: settings.float_class.clone(),
            ignore_title: compile(&settings.ignore_title),
            float_title: compile(&settings.float_title),
            ignore_role: settings.ignore_role.clone(),
            ignore_screen: settings.ignore_screen.clone(),
            ignore_activity: settings.ignore_activity.clone(),
            float_utility: settings.float_utility,
        }
    }

    /// Windows matching these rules are never managed.
    pub fn should_ignore(&self, window: &dyn HostWindow) -> bool {
        let class = window.resource_class();
        let title = window.title();
        let role = window.role();
        self.ignore_class.iter().any(|c| *c == class)
            || self.ignore_title.iter().any(|r| r.is_match(&title))
            || (!role.is_empty() && self.ignore_role.iter().any(|r| role.starts_with(r.as_str())))
    }

    /// Windows matching these rules start out floating.
    pub fn should_float(&self, window: &dyn HostWindow) -> bool {
        let class = window.resource_class();
        let title = window.title();
        let min = window.min_size();
        let max = window.max_size();
        let fixed_size = min.width > 0 && min == max;
        !window.resizable()
            || fixed_size
            || (self.float_utility && window.special())
            || self.float_class.iter().any(|c| *c == class)
            || self.float_title.iter().any(|r| r.is_match(&title))
    }

    /// Surfaces on these screens or activities are not tiled.
    pub fn ignores_surface(&self, screen: usize, activity: &str) -> bool {
        self.ignore_screen.contains(&screen) || self.ignore_activity.iter().any(|a| a == activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Size};
    use crate::sim::SimWindow;

    fn rules() -> WindowRules {
        WindowRules::new(&RuleSettings {
            float_class: vec!["pavucontrol".into()],
            ignore_title: vec!["^Picture-in-Picture$".into(), "(".into()],
            float_title: vec!["Preferences".into()],
            ignore_screen: vec![2],
            ignore_activity: vec!["gaming".into()],
            ..RuleSettings::default()
        })
    }

    fn window() -> SimWindow { SimWindow::new(1, Rect::new(0, 0, 100, 100)) }

    #[test]
    fn ignore_by_class_title_and_role() {
        let rules = rules();
        assert!(!rules.should_ignore(&window().with_class("konsole")));
        assert!(rules.should_ignore(&window().with_class("krunner")));
        assert!(rules.should_ignore(&window().with_title("Picture-in-Picture")));
        assert!(rules.should_ignore(&window().with_role("quake-dropdown")));
    }

    #[test]
    fn float_by_policy() {
        let rules = rules();
        assert!(!rules.should_float(&window()));
        assert!(rules.should_float(&window().with_class("pavucontrol")));
        assert!(rules.should_float(&window().with_title("App Preferences")));
        assert!(rules.should_float(&window().as_special()));
        assert!(rules.should_float(&window().with_size_limits(Size::new(300, 200), Size::new(300, 200))));
    }

    #[test]
    fn ignored_surfaces() {
        let rules = rules();
        assert!(rules.ignores_surface(2, "default"));
        assert!(rules.ignores_surface(0, "gaming"));
        assert!(!rules.ignores_surface(0, "default"));
    }
}
