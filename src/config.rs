//! Configuration loading, validation and persistence.
//!
//! The configuration is a single JSON document with two top-level sections:
//! `char_settings` (symbolic name -> text payload) and `hotkeys` (key name ->
//! ordered list of click actions). It is loaded wholesale at startup, edited
//! in memory and written back wholesale on save; a malformed file fails the
//! load rather than being partially recovered.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HotclickError, Result};
use crate::keys::HotkeyKey;

/// Symbolic name -> text payload, referenced by [`ClickAction::char`].
///
/// An empty payload disables every action that references it, which is how a
/// binding is parked without deleting it.
pub type CharSettings = BTreeMap<String, String>;

/// Mouse button used by a click action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MouseButton {
    Left,
    Right,
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MouseButton::Left => f.write_str("LEFT"),
            MouseButton::Right => f.write_str("RIGHT"),
        }
    }
}

impl std::str::FromStr for MouseButton {
    type Err = HotclickError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            _ => Err(HotclickError::invalid_key(s, "expected 'left' or 'right'")),
        }
    }
}

/// One simulated mouse click at a screen coordinate.
///
/// Actions are immutable once loaded; edits replace the whole list for a
/// hotkey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickAction {
    /// Absolute screen x coordinate.
    pub x: i32,
    /// Absolute screen y coordinate.
    pub y: i32,
    /// Button to click.
    pub button: MouseButton,
    /// Number of clicks to issue, at least 1.
    pub repeat: u32,
    /// Reference key into `char_settings`.
    pub char: String,
}

/// The whole persisted configuration: char settings plus hotkey bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub char_settings: CharSettings,
    pub hotkeys: BTreeMap<HotkeyKey, Vec<ClickAction>>,
}

impl Default for Config {
    /// Starter configuration: five empty char slots and one sample `f1`
    /// binding. The sample stays inert until `char1` is given a value.
    fn default() -> Self {
        let mut char_settings = CharSettings::new();
        for slot in ["char1", "char2", "char3", "char4", "char5"] {
            char_settings.insert(slot.to_string(), String::new());
        }

        let mut hotkeys = BTreeMap::new();
        hotkeys.insert(
            HotkeyKey::F1,
            vec![ClickAction {
                x: 490,
                y: 711,
                button: MouseButton::Left,
                repeat: 1,
                char: "char1".to_string(),
            }],
        );

        Self {
            char_settings,
            hotkeys,
        }
    }
}

impl Config {
    /// Load and validate a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let raw = fs::read_to_string(path)
            .map_err(|e| HotclickError::config_load(&shown, e.to_string()))?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| HotclickError::config_load(&shown, e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Validate and write the configuration to a JSON file, wholesale.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        self.validate()?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| HotclickError::config_save(&shown, e.to_string()))?;
        fs::write(path, json).map_err(|e| HotclickError::config_save(&shown, e.to_string()))?;

        Ok(())
    }

    /// Check semantic constraints that the JSON shape alone does not enforce.
    pub fn validate(&self) -> Result<()> {
        for (key, actions) in &self.hotkeys {
            for (index, action) in actions.iter().enumerate() {
                if action.repeat == 0 {
                    return Err(HotclickError::config_validation(format!(
                        "hotkey '{key}' action {}: repeat must be at least 1",
                        index + 1
                    )));
                }
                if action.x < 0 || action.y < 0 {
                    return Err(HotclickError::config_validation(format!(
                        "hotkey '{key}' action {}: coordinates ({}, {}) must not be negative",
                        index + 1,
                        action.x,
                        action.y
                    )));
                }
                if action.char.is_empty() {
                    return Err(HotclickError::config_validation(format!(
                        "hotkey '{key}' action {}: char reference must not be empty",
                        index + 1
                    )));
                }
            }
        }
        Ok(())
    }

    /// Append `action` to the binding for `key`, or replace the binding.
    pub fn bind(&mut self, key: HotkeyKey, action: ClickAction, replace: bool) {
        let actions = self.hotkeys.entry(key).or_default();
        if replace {
            actions.clear();
        }
        actions.push(action);
    }

    /// Remove the binding for `key`. Returns whether a binding existed.
    pub fn unbind(&mut self, key: HotkeyKey) -> bool {
        self.hotkeys.remove(&key).is_some()
    }

    /// Set a char slot to the given text payload.
    pub fn set_char(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.char_settings.insert(name.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(x: i32, y: i32) -> ClickAction {
        ClickAction {
            x,
            y,
            button: MouseButton::Left,
            repeat: 1,
            char: "char1".to_string(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.char_settings.len(), 5);
        assert_eq!(config.hotkeys.len(), 1);
        assert_eq!(config.hotkeys[&HotkeyKey::F1].len(), 1);
    }

    #[test]
    fn test_bind_appends_and_replaces() {
        let mut config = Config::default();
        config.bind(HotkeyKey::F2, action(10, 20), false);
        config.bind(HotkeyKey::F2, action(30, 40), false);
        assert_eq!(config.hotkeys[&HotkeyKey::F2].len(), 2);

        config.bind(HotkeyKey::F2, action(50, 60), true);
        assert_eq!(config.hotkeys[&HotkeyKey::F2].len(), 1);
        assert_eq!(config.hotkeys[&HotkeyKey::F2][0].x, 50);
    }

    #[test]
    fn test_unbind() {
        let mut config = Config::default();
        assert!(config.unbind(HotkeyKey::F1));
        assert!(!config.unbind(HotkeyKey::F1));
        assert!(config.hotkeys.is_empty());
    }

    #[test]
    fn test_validate_rejects_zero_repeat() {
        let mut config = Config::default();
        let mut bad = action(1, 1);
        bad.repeat = 0;
        config.bind(HotkeyKey::F3, bad, false);

        let err = config.validate().unwrap_err();
        assert!(matches!(err, HotclickError::ConfigValidation(_)));
        assert!(err.to_string().contains("f3"));
    }

    #[test]
    fn test_validate_rejects_negative_coordinates() {
        let mut config = Config::default();
        config.bind(HotkeyKey::Digit4, action(-5, 10), false);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_char_reference() {
        let mut config = Config::default();
        let mut bad = action(1, 1);
        bad.char = String::new();
        config.bind(HotkeyKey::Backtick, bad, false);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mouse_button_parse_and_display() {
        assert_eq!("left".parse::<MouseButton>().unwrap(), MouseButton::Left);
        assert_eq!("RIGHT".parse::<MouseButton>().unwrap(), MouseButton::Right);
        assert!("middle".parse::<MouseButton>().is_err());
        assert_eq!(MouseButton::Left.to_string(), "LEFT");
        assert_eq!(MouseButton::Right.to_string(), "RIGHT");
    }
}
