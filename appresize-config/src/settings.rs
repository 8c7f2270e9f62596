use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::modifier::{Modifier, ModifierSet, Move, Resize};

/// Persisted preferences. Missing fields fall back to their defaults so an
/// older or hand-edited file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub move_modifiers: ModifierSet<Move>,
    pub resize_modifiers: ModifierSet<Resize>,
    pub resize_from_nearest_corner: bool,
    pub require_drag_to_activate: bool,
    pub enable_window_tiling: bool,
    pub show_menu_icon: bool,
    pub launch_at_login: bool,
    /// Seconds since the Unix epoch of the first daemon start.
    pub first_launched: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            move_modifiers: [Modifier::Fn, Modifier::Control].into_iter().collect(),
            resize_modifiers: [Modifier::Fn, Modifier::Control, Modifier::Alt]
                .into_iter()
                .collect(),
            resize_from_nearest_corner: false,
            require_drag_to_activate: false,
            enable_window_tiling: true,
            show_menu_icon: true,
            launch_at_login: false,
            first_launched: None,
        }
    }
}

/// Boolean preferences addressable by name from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    ResizeFromNearestCorner,
    RequireDragToActivate,
    EnableWindowTiling,
    ShowMenuIcon,
    LaunchAtLogin,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::ResizeFromNearestCorner,
        SettingKey::RequireDragToActivate,
        SettingKey::EnableWindowTiling,
        SettingKey::ShowMenuIcon,
        SettingKey::LaunchAtLogin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::ResizeFromNearestCorner => "resize-from-nearest-corner",
            SettingKey::RequireDragToActivate => "require-drag-to-activate",
            SettingKey::EnableWindowTiling => "enable-window-tiling",
            SettingKey::ShowMenuIcon => "show-menu-icon",
            SettingKey::LaunchAtLogin => "launch-at-login",
        }
    }
}

impl FromStr for SettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace('_', "-");
        SettingKey::ALL
            .into_iter()
            .find(|key| key.name() == normalized)
            .ok_or_else(|| format!("Unknown setting: {}", s))
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configurations that load fine but will not behave the way they read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsWarning {
    /// Move and resize name the same keys; move is checked first, so resize
    /// can never activate.
    IdenticalModifiers,
    /// Neither gesture has any keys assigned.
    NoModifiers,
}

impl fmt::Display for SettingsWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsWarning::IdenticalModifiers => write!(
                f,
                "move and resize use the same modifiers; resizing is unreachable"
            ),
            SettingsWarning::NoModifiers => {
                write!(f, "no modifiers configured; moving and resizing are disabled")
            }
        }
    }
}

impl Settings {
    pub fn flag(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::ResizeFromNearestCorner => self.resize_from_nearest_corner,
            SettingKey::RequireDragToActivate => self.require_drag_to_activate,
            SettingKey::EnableWindowTiling => self.enable_window_tiling,
            SettingKey::ShowMenuIcon => self.show_menu_icon,
            SettingKey::LaunchAtLogin => self.launch_at_login,
        }
    }

    pub fn set_flag(&mut self, key: SettingKey, value: bool) {
        let slot = match key {
            SettingKey::ResizeFromNearestCorner => &mut self.resize_from_nearest_corner,
            SettingKey::RequireDragToActivate => &mut self.require_drag_to_activate,
            SettingKey::EnableWindowTiling => &mut self.enable_window_tiling,
            SettingKey::ShowMenuIcon => &mut self.show_menu_icon,
            SettingKey::LaunchAtLogin => &mut self.launch_at_login,
        };
        *slot = value;
    }

    pub fn validate(&self) -> Vec<SettingsWarning> {
        let mut warnings = Vec::new();
        if self.move_modifiers.is_empty() && self.resize_modifiers.is_empty() {
            warnings.push(SettingsWarning::NoModifiers);
        } else if self.move_modifiers.same_keys(self.resize_modifiers) {
            warnings.push(SettingsWarning::IdenticalModifiers);
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.move_modifiers.to_string(), "ctrl-fn");
        assert_eq!(settings.resize_modifiers.to_string(), "alt-ctrl-fn");
        assert!(!settings.resize_from_nearest_corner);
        assert!(!settings.require_drag_to_activate);
        assert!(settings.enable_window_tiling);
        assert!(settings.show_menu_icon);
        assert!(!settings.launch_at_login);
        assert_eq!(settings.first_launched, None);
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"move_modifiers":["cmd"],"enable_window_tiling":false}"#)
                .unwrap();
        assert_eq!(settings.move_modifiers.to_string(), "cmd");
        assert!(!settings.enable_window_tiling);
        assert_eq!(
            settings.resize_modifiers,
            Settings::default().resize_modifiers
        );
        assert!(settings.show_menu_icon);
    }

    #[test]
    fn test_set_flag() {
        let mut settings = Settings::default();
        for key in SettingKey::ALL {
            let before = settings.flag(key);
            settings.set_flag(key, !before);
            assert_eq!(settings.flag(key), !before, "flag {} did not change", key);
        }
    }

    #[test]
    fn test_setting_key_parsing() {
        assert_eq!(
            "enable-window-tiling".parse::<SettingKey>().unwrap(),
            SettingKey::EnableWindowTiling
        );
        assert_eq!(
            "require_drag_to_activate".parse::<SettingKey>().unwrap(),
            SettingKey::RequireDragToActivate
        );
        assert!("move-modifiers".parse::<SettingKey>().is_err());
    }

    #[test]
    fn test_validate_identical_modifiers() {
        let settings = Settings {
            move_modifiers: "ctrl-alt".parse().unwrap(),
            resize_modifiers: "alt-ctrl".parse().unwrap(),
            ..Settings::default()
        };
        assert_eq!(
            settings.validate(),
            vec![SettingsWarning::IdenticalModifiers]
        );
    }

    #[test]
    fn test_validate_no_modifiers() {
        let settings = Settings {
            move_modifiers: ModifierSet::empty(),
            resize_modifiers: ModifierSet::empty(),
            ..Settings::default()
        };
        assert_eq!(settings.validate(), vec![SettingsWarning::NoModifiers]);
    }

    #[test]
    fn test_single_empty_set_is_fine() {
        let settings = Settings {
            resize_modifiers: ModifierSet::empty(),
            ..Settings::default()
        };
        assert!(settings.validate().is_empty());
    }
}
