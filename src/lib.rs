//! # Hotclick
//!
//! A cross-platform tool that binds global hotkeys to sequences of simulated
//! mouse clicks at configured screen coordinates.
//!
//! ## Features
//!
//! - Fixed bindable key set (F1-F8, digit row, backtick) with an ordered
//!   click sequence per key
//! - Per-action button, repeat count and char-slot text substitution
//! - Corner failsafe: slam the pointer into a screen corner to abort a
//!   running sequence
//! - Pause/resume and emergency-stop control hotkeys
//! - JSON configuration with named profiles
//!
//! ## Example
//!
//! ```no_run
//! use hotclick::{Config, HotkeyListener};
//!
//! fn main() -> hotclick::Result<()> {
//!     let config = Config::from_file("config.json")?;
//!
//!     let mut listener = HotkeyListener::new(config);
//!     listener.start()?;
//!
//!     // ... wait for a shutdown signal ...
//!
//!     listener.stop();
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```json
//! {
//!   "char_settings": {
//!     "char1": "alpha",
//!     "char2": ""
//!   },
//!   "hotkeys": {
//!     "f1": [
//!       {"x": 490, "y": 711, "button": "LEFT", "repeat": 1, "char": "char1"}
//!     ]
//!   }
//! }
//! ```

pub mod clicker;
pub mod config;
pub mod error;
pub mod global_hotkey;
pub mod keys;
pub mod profiles;

pub use clicker::{ActionExecutor, ClickExecutor};
pub use config::{CharSettings, ClickAction, Config, MouseButton};
pub use error::{HotclickError, Result};
pub use global_hotkey::HotkeyListener;
pub use keys::HotkeyKey;
pub use profiles::ProfileManager;
