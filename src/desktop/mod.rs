// Desktop control module
// Screen capture and input injection behind one trait. A platform backend
// (X11, Wayland, Windows, VNC...) implements `DesktopControl`; the crate ships
// `ScreenshotDesktop`, which serves captured frames and records the input.

pub mod screenshot;

pub use screenshot::ScreenshotDesktop;

use crate::error::GuiResult;
use crate::location::Location;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Ctrl,
    Alt,
    Shift,
    Meta,
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Char(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::F(n) => write!(f, "F{n}"),
            Key::Char(c) => write!(f, "{c}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Input performed on a desktop, as recorded by `ScreenshotDesktop`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InputEvent {
    Move(Location),
    Click {
        at: Location,
        button: MouseButton,
        modifiers: Vec<Key>,
        count: u32,
    },
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    KeysToggle { keys: Vec<Key>, down: bool },
    KeyPress(Vec<Key>),
    Type { text: String, modifiers: Vec<Key> },
}

// Trait defining the screen and input capabilities searches and actions need.
// Implementations are shared behind `Arc` and called one action at a time.
pub trait DesktopControl: Send + Sync {
    fn screen_width(&self) -> u32;
    fn screen_height(&self) -> u32;

    /// Grab the whole screen as it is right now
    fn capture(&self) -> GuiResult<RgbImage>;

    fn cursor_position(&self) -> GuiResult<Location>;
    fn move_to(&self, location: Location) -> GuiResult<()>;

    /// Move to `location` and click `count` times with `modifiers` held
    fn click(
        &self,
        location: Location,
        button: MouseButton,
        modifiers: &[Key],
        count: u32,
    ) -> GuiResult<()>;

    fn mouse_down(&self, button: MouseButton) -> GuiResult<()>;
    fn mouse_up(&self, button: MouseButton) -> GuiResult<()>;

    /// Hold (`down = true`) or release keys, e.g. modifiers during a drag
    fn toggle_keys(&self, keys: &[Key], down: bool) -> GuiResult<()>;

    /// Press all keys together and release them
    fn key_press(&self, keys: &[Key]) -> GuiResult<()>;

    fn type_text(&self, text: &str, modifiers: &[Key]) -> GuiResult<()>;

    fn screen_dimensions(&self) -> (u32, u32) {
        (self.screen_width(), self.screen_height())
    }
}
