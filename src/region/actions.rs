//! Mouse and keyboard actions anchored on locations or found images
//!
//! Every action accepts a `Target`: a plain location, an image (located
//! first with the action timeout) or an image name. Actions return the
//! region again so calls can be chained; a failure anywhere in the chain
//! aborts the rest of it.

use super::Region;
use crate::desktop::{Key, MouseButton};
use crate::error::GuiResult;
use crate::location::Location;
use crate::matches::Match;
use crate::pattern::Image;
use std::sync::Arc;

/// Where an action takes place
#[derive(Debug, Clone)]
pub enum Target {
    Location(Location),
    Image(Image),
}

impl From<Location> for Target {
    fn from(location: Location) -> Self {
        Target::Location(location)
    }
}

impl From<Image> for Target {
    fn from(image: Image) -> Self {
        Target::Image(image)
    }
}

impl From<&Image> for Target {
    fn from(image: &Image) -> Self {
        Target::Image(image.clone())
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Image(Image::new(name))
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target::Image(Image::new(name))
    }
}

impl From<&Match> for Target {
    fn from(found: &Match) -> Self {
        Target::Location(found.target())
    }
}

impl From<&Arc<Match>> for Target {
    fn from(found: &Arc<Match>) -> Self {
        Target::Location(found.target())
    }
}

impl Region {
    /// Screen point for `target`, searching for it when it is an image
    fn resolve(&self, target: Target) -> GuiResult<Location> {
        match target {
            Target::Location(location) => Ok(location),
            Target::Image(image) => {
                let timeout = self.ctx.timing.action_timeout;
                Ok(self.find_image(&image, timeout)?.target())
            }
        }
    }

    pub fn hover(&self, target: impl Into<Target>) -> GuiResult<&Self> {
        let at = self.resolve(target.into())?;
        log::debug!("Hovering over {}", at);
        self.ctx.desktop.move_to(at)?;
        Ok(self)
    }

    pub fn click(&self, target: impl Into<Target>, modifiers: &[Key]) -> GuiResult<&Self> {
        self.click_times(target.into(), MouseButton::Left, modifiers, 1)
    }

    pub fn right_click(&self, target: impl Into<Target>, modifiers: &[Key]) -> GuiResult<&Self> {
        self.click_times(target.into(), MouseButton::Right, modifiers, 1)
    }

    pub fn double_click(&self, target: impl Into<Target>, modifiers: &[Key]) -> GuiResult<&Self> {
        self.click_times(target.into(), MouseButton::Left, modifiers, 2)
    }

    fn click_times(
        &self,
        target: Target,
        button: MouseButton,
        modifiers: &[Key],
        count: u32,
    ) -> GuiResult<&Self> {
        let at = self.resolve(target)?;
        log::debug!("Clicking {:?} x{} at {} with {:?}", button, count, at, modifiers);
        self.ctx.desktop.click(at, button, modifiers, count)?;
        Ok(self)
    }

    /// Move to `target` and press `button` without releasing it
    pub fn mouse_down(&self, target: impl Into<Target>, button: MouseButton) -> GuiResult<&Self> {
        let at = self.resolve(target.into())?;
        self.ctx.desktop.move_to(at)?;
        self.ctx.desktop.mouse_down(button)?;
        Ok(self)
    }

    /// Move to `target` and release `button`
    pub fn mouse_up(&self, target: impl Into<Target>, button: MouseButton) -> GuiResult<&Self> {
        let at = self.resolve(target.into())?;
        self.ctx.desktop.move_to(at)?;
        self.ctx.desktop.mouse_up(button)?;
        Ok(self)
    }

    /// Grab at `target`, holding `modifiers` until the matching `drop_at`
    pub fn drag_from(&self, target: impl Into<Target>, modifiers: &[Key]) -> GuiResult<&Self> {
        let at = self.resolve(target.into())?;
        log::debug!("Dragging from {}", at);
        self.ctx.desktop.move_to(at)?;
        if !modifiers.is_empty() {
            self.ctx.desktop.toggle_keys(modifiers, true)?;
        }
        self.ctx.desktop.mouse_down(MouseButton::Left)?;
        std::thread::sleep(self.ctx.timing.delay_after_drag);
        Ok(self)
    }

    /// Release the dragged item at `target` and let go of `modifiers`
    pub fn drop_at(&self, target: impl Into<Target>, modifiers: &[Key]) -> GuiResult<&Self> {
        let at = self.resolve(target.into())?;
        log::debug!("Dropping at {}", at);
        self.ctx.desktop.move_to(at)?;
        std::thread::sleep(self.ctx.timing.delay_before_drop);
        self.ctx.desktop.mouse_up(MouseButton::Left)?;
        if !modifiers.is_empty() {
            self.ctx.desktop.toggle_keys(modifiers, false)?;
        }
        Ok(self)
    }

    pub fn drag_drop(
        &self,
        source: impl Into<Target>,
        destination: impl Into<Target>,
        modifiers: &[Key],
    ) -> GuiResult<&Self> {
        self.drag_from(source, modifiers)?;
        if let Err(e) = self.drop_at(destination, modifiers) {
            // Never leave the button or the modifiers held down
            self.release_drag(modifiers);
            return Err(e);
        }
        Ok(self)
    }

    fn release_drag(&self, modifiers: &[Key]) {
        log::warn!("Drop failed, releasing the dragged item where it is");
        if let Err(e) = self.ctx.desktop.mouse_up(MouseButton::Left) {
            log::warn!("Failed to release mouse button: {}", e);
        }
        if !modifiers.is_empty() {
            if let Err(e) = self.ctx.desktop.toggle_keys(modifiers, false) {
                log::warn!("Failed to release modifiers {:?}: {}", modifiers, e);
            }
        }
    }

    /// Press a key combination at the current pointer position
    pub fn press_keys(&self, keys: &[Key]) -> GuiResult<&Self> {
        log::debug!("Pressing {:?}", keys);
        self.ctx.desktop.key_press(keys)?;
        Ok(self)
    }

    /// Click `target` to focus it, then press the key combination
    pub fn press_at(&self, target: impl Into<Target>, keys: &[Key]) -> GuiResult<&Self> {
        self.click(target, &[])?;
        std::thread::sleep(self.ctx.timing.delay_before_keys);
        self.press_keys(keys)
    }

    pub fn type_text(&self, text: &str, modifiers: &[Key]) -> GuiResult<&Self> {
        log::debug!("Typing {:?} with {:?}", text, modifiers);
        self.ctx.desktop.type_text(text, modifiers)?;
        Ok(self)
    }

    /// Click `target` to focus it, then type `text`
    pub fn type_at(
        &self,
        target: impl Into<Target>,
        text: &str,
        modifiers: &[Key],
    ) -> GuiResult<&Self> {
        self.click(target, &[])?;
        std::thread::sleep(self.ctx.timing.delay_before_keys);
        self.type_text(text, modifiers)
    }
}
