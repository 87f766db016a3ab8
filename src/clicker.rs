//! Mouse click execution.
//!
//! [`ClickExecutor`] turns a [`ClickAction`] into OS-level pointer input:
//! move to the action's coordinates, click the requested number of times,
//! then type the action's resolved char payload. Parking the pointer in a
//! screen corner aborts execution (failsafe), giving the operator a way to
//! wrestle the cursor back from a runaway sequence.

use std::thread;
use std::time::Duration;

use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use tracing::debug;

use crate::config::{ClickAction, MouseButton};
use crate::error::{HotclickError, Result};

/// Delay between repeated clicks of a single action.
pub const CLICK_INTERVAL: Duration = Duration::from_millis(50);

/// Delay between consecutive actions of a binding.
pub const ACTION_PAUSE: Duration = Duration::from_millis(100);

/// Pointer positions within this many pixels of a screen corner trigger the
/// failsafe.
const FAILSAFE_MARGIN: i32 = 5;

/// Executes one click action. The trait is the seam between binding dispatch
/// and OS input, so dispatch order and abort policy are testable without a
/// display.
pub trait ActionExecutor {
    /// Perform `action`, typing `text` (the resolved char payload) after the
    /// clicks.
    fn execute(&mut self, action: &ClickAction, text: &str) -> Result<()>;
}

/// [`ActionExecutor`] backed by OS-level input simulation.
pub struct ClickExecutor {
    enigo: Enigo,
    // Sampled once at construction; displays do not change under us.
    screen: (i32, i32),
}

impl ClickExecutor {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| HotclickError::input(e.to_string()))?;
        let screen = enigo
            .main_display()
            .map_err(|e| HotclickError::input(e.to_string()))?;
        debug!(width = screen.0, height = screen.1, "input backend ready");
        Ok(Self { enigo, screen })
    }

    /// Abort if the pointer currently sits in a screen corner.
    fn failsafe_check(&self) -> Result<()> {
        let (x, y) = self
            .enigo
            .location()
            .map_err(|e| HotclickError::input(e.to_string()))?;
        let (width, height) = self.screen;

        let near = |value: i32, edge: i32| (value - edge).abs() <= FAILSAFE_MARGIN;
        let in_corner = (near(x, 0) || near(x, width - 1)) && (near(y, 0) || near(y, height - 1));
        if in_corner {
            return Err(HotclickError::FailsafeTriggered { x, y });
        }
        Ok(())
    }
}

impl ActionExecutor for ClickExecutor {
    fn execute(&mut self, action: &ClickAction, text: &str) -> Result<()> {
        self.failsafe_check()?;

        self.enigo
            .move_mouse(action.x, action.y, Coordinate::Abs)
            .map_err(|e| HotclickError::click_failed(action.x, action.y, e.to_string()))?;

        let button = match action.button {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
        };

        for i in 0..action.repeat {
            if i > 0 {
                thread::sleep(CLICK_INTERVAL);
            }
            self.failsafe_check()?;
            self.enigo
                .button(button, Direction::Click)
                .map_err(|e| HotclickError::click_failed(action.x, action.y, e.to_string()))?;
        }

        if !text.is_empty() {
            self.enigo
                .text(text)
                .map_err(|e| HotclickError::click_failed(action.x, action.y, e.to_string()))?;
        }

        debug!(
            x = action.x,
            y = action.y,
            button = %action.button,
            repeat = action.repeat,
            "executed click action"
        );
        Ok(())
    }
}
