//! The fixed set of bindable hotkeys.
//!
//! Bindings are limited to a closed set of keys (F1-F8, the digit row and
//! backtick) so that an invalid key name in a configuration file is rejected
//! during deserialization instead of silently never firing.

use std::fmt;
use std::str::FromStr;

use global_hotkey::hotkey::Code;
use serde::{Deserialize, Serialize};

use crate::error::HotclickError;

/// A key that click sequences can be bound to.
///
/// Serializes to the key's config-file name (`"f1"`, `"0"`, `` "`" ``), which
/// doubles as the map key in the `hotkeys` section of the configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum HotkeyKey {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    #[serde(rename = "0")]
    Digit0,
    #[serde(rename = "1")]
    Digit1,
    #[serde(rename = "2")]
    Digit2,
    #[serde(rename = "3")]
    Digit3,
    #[serde(rename = "4")]
    Digit4,
    #[serde(rename = "5")]
    Digit5,
    #[serde(rename = "6")]
    Digit6,
    #[serde(rename = "7")]
    Digit7,
    #[serde(rename = "8")]
    Digit8,
    #[serde(rename = "9")]
    Digit9,
    #[serde(rename = "`")]
    Backtick,
}

impl HotkeyKey {
    /// Every bindable key, in display order.
    pub const ALL: [HotkeyKey; 19] = [
        HotkeyKey::F1,
        HotkeyKey::F2,
        HotkeyKey::F3,
        HotkeyKey::F4,
        HotkeyKey::F5,
        HotkeyKey::F6,
        HotkeyKey::F7,
        HotkeyKey::F8,
        HotkeyKey::Digit0,
        HotkeyKey::Digit1,
        HotkeyKey::Digit2,
        HotkeyKey::Digit3,
        HotkeyKey::Digit4,
        HotkeyKey::Digit5,
        HotkeyKey::Digit6,
        HotkeyKey::Digit7,
        HotkeyKey::Digit8,
        HotkeyKey::Digit9,
        HotkeyKey::Backtick,
    ];

    /// The key's name as used in configuration files and CLI arguments.
    pub fn name(&self) -> &'static str {
        match self {
            HotkeyKey::F1 => "f1",
            HotkeyKey::F2 => "f2",
            HotkeyKey::F3 => "f3",
            HotkeyKey::F4 => "f4",
            HotkeyKey::F5 => "f5",
            HotkeyKey::F6 => "f6",
            HotkeyKey::F7 => "f7",
            HotkeyKey::F8 => "f8",
            HotkeyKey::Digit0 => "0",
            HotkeyKey::Digit1 => "1",
            HotkeyKey::Digit2 => "2",
            HotkeyKey::Digit3 => "3",
            HotkeyKey::Digit4 => "4",
            HotkeyKey::Digit5 => "5",
            HotkeyKey::Digit6 => "6",
            HotkeyKey::Digit7 => "7",
            HotkeyKey::Digit8 => "8",
            HotkeyKey::Digit9 => "9",
            HotkeyKey::Backtick => "`",
        }
    }

    /// The OS-level key code used when registering the global hotkey hook.
    pub fn code(&self) -> Code {
        match self {
            HotkeyKey::F1 => Code::F1,
            HotkeyKey::F2 => Code::F2,
            HotkeyKey::F3 => Code::F3,
            HotkeyKey::F4 => Code::F4,
            HotkeyKey::F5 => Code::F5,
            HotkeyKey::F6 => Code::F6,
            HotkeyKey::F7 => Code::F7,
            HotkeyKey::F8 => Code::F8,
            HotkeyKey::Digit0 => Code::Digit0,
            HotkeyKey::Digit1 => Code::Digit1,
            HotkeyKey::Digit2 => Code::Digit2,
            HotkeyKey::Digit3 => Code::Digit3,
            HotkeyKey::Digit4 => Code::Digit4,
            HotkeyKey::Digit5 => Code::Digit5,
            HotkeyKey::Digit6 => Code::Digit6,
            HotkeyKey::Digit7 => Code::Digit7,
            HotkeyKey::Digit8 => Code::Digit8,
            HotkeyKey::Digit9 => Code::Digit9,
            HotkeyKey::Backtick => Code::Backquote,
        }
    }
}

impl fmt::Display for HotkeyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HotkeyKey {
    type Err = HotclickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_lowercase().as_str() {
            "f1" => HotkeyKey::F1,
            "f2" => HotkeyKey::F2,
            "f3" => HotkeyKey::F3,
            "f4" => HotkeyKey::F4,
            "f5" => HotkeyKey::F5,
            "f6" => HotkeyKey::F6,
            "f7" => HotkeyKey::F7,
            "f8" => HotkeyKey::F8,
            "0" => HotkeyKey::Digit0,
            "1" => HotkeyKey::Digit1,
            "2" => HotkeyKey::Digit2,
            "3" => HotkeyKey::Digit3,
            "4" => HotkeyKey::Digit4,
            "5" => HotkeyKey::Digit5,
            "6" => HotkeyKey::Digit6,
            "7" => HotkeyKey::Digit7,
            "8" => HotkeyKey::Digit8,
            "9" => HotkeyKey::Digit9,
            // "backtick" spares shell users from quoting the literal character
            "`" | "backtick" => HotkeyKey::Backtick,
            _ => {
                return Err(HotclickError::invalid_key(
                    s,
                    "not in the supported key set (f1-f8, 0-9, `)",
                ))
            }
        };
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_key_set_is_complete_and_distinct() {
        assert_eq!(HotkeyKey::ALL.len(), 19);
        let names: BTreeSet<_> = HotkeyKey::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), 19);
        let codes: BTreeSet<_> = HotkeyKey::ALL.iter().map(|k| format!("{:?}", k.code())).collect();
        assert_eq!(codes.len(), 19);
    }

    #[test]
    fn test_name_round_trips() {
        for key in HotkeyKey::ALL {
            assert_eq!(key.name().parse::<HotkeyKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_from_str_aliases_and_case() {
        assert_eq!("F3".parse::<HotkeyKey>().unwrap(), HotkeyKey::F3);
        assert_eq!(" f8 ".parse::<HotkeyKey>().unwrap(), HotkeyKey::F8);
        assert_eq!("backtick".parse::<HotkeyKey>().unwrap(), HotkeyKey::Backtick);
        assert!("f9".parse::<HotkeyKey>().is_err());
        assert!("space".parse::<HotkeyKey>().is_err());
        assert!("".parse::<HotkeyKey>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&HotkeyKey::F1).unwrap(), r#""f1""#);
        assert_eq!(serde_json::to_string(&HotkeyKey::Digit0).unwrap(), r#""0""#);
        assert_eq!(serde_json::to_string(&HotkeyKey::Backtick).unwrap(), r#""`""#);

        let key: HotkeyKey = serde_json::from_str(r#""f5""#).unwrap();
        assert_eq!(key, HotkeyKey::F5);
        assert!(serde_json::from_str::<HotkeyKey>(r#""f12""#).is_err());
    }

    #[test]
    fn test_code_mapping() {
        assert_eq!(HotkeyKey::F1.code(), Code::F1);
        assert_eq!(HotkeyKey::Digit7.code(), Code::Digit7);
        assert_eq!(HotkeyKey::Backtick.code(), Code::Backquote);
    }
}
