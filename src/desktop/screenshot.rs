//! Desktop backed by captured frames instead of a live screen
//!
//! Every `capture()` consumes the next queued frame; the last one stays on
//! screen. Input is not injected anywhere but recorded as `InputEvent`s.

use super::{DesktopControl, InputEvent, Key, MouseButton};
use crate::error::{GuiError, GuiResult};
use crate::location::Location;
use image::RgbImage;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct ScreenshotDesktop {
    width: u32,
    height: u32,
    frames: Mutex<VecDeque<RgbImage>>,
    cursor: Mutex<Location>,
    events: Mutex<Vec<InputEvent>>,
    captures: AtomicUsize,
}

impl ScreenshotDesktop {
    /// Desktop showing `frame` forever; its size is the screen size
    pub fn new(frame: RgbImage) -> Self {
        Self {
            width: frame.width(),
            height: frame.height(),
            frames: Mutex::new(VecDeque::from([frame])),
            cursor: Mutex::new(Location::default()),
            events: Mutex::new(Vec::new()),
            captures: AtomicUsize::new(0),
        }
    }

    /// Plain white screen of the given size
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255])))
    }

    pub fn from_file(path: &Path) -> GuiResult<Self> {
        let frame = image::open(path)
            .map_err(|source| GuiError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        log::info!(
            "Using screenshot {:?} as desktop ({}x{})",
            path,
            frame.width(),
            frame.height()
        );
        Ok(Self::new(frame))
    }

    /// Queue a frame shown after the current ones. Frames of another size
    /// than the screen are rejected.
    pub fn push_frame(&self, frame: RgbImage) -> GuiResult<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(GuiError::desktop(
                "push_frame",
                format!(
                    "frame is {}x{}, screen is {}x{}",
                    frame.width(),
                    frame.height(),
                    self.width,
                    self.height
                ),
            ));
        }
        self.lock_frames().push_back(frame);
        Ok(())
    }

    /// Number of captures taken so far
    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    /// Input recorded so far
    pub fn events(&self) -> Vec<InputEvent> {
        self.lock_events().clone()
    }

    pub fn take_events(&self) -> Vec<InputEvent> {
        std::mem::take(&mut *self.lock_events())
    }

    fn lock_frames(&self) -> std::sync::MutexGuard<'_, VecDeque<RgbImage>> {
        self.frames.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_events(&self) -> std::sync::MutexGuard<'_, Vec<InputEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, event: InputEvent) {
        log::debug!("Desktop input: {:?}", event);
        self.lock_events().push(event);
    }

    fn set_cursor(&self, location: Location) {
        let clamped = Location::new(
            location.x.clamp(0, self.width.saturating_sub(1) as i32),
            location.y.clamp(0, self.height.saturating_sub(1) as i32),
        );
        *self.cursor.lock().unwrap_or_else(|e| e.into_inner()) = clamped;
    }
}

impl DesktopControl for ScreenshotDesktop {
    fn screen_width(&self) -> u32 {
        self.width
    }

    fn screen_height(&self) -> u32 {
        self.height
    }

    fn capture(&self) -> GuiResult<RgbImage> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        let mut frames = self.lock_frames();
        let frame = if frames.len() > 1 {
            frames.pop_front()
        } else {
            frames.front().cloned()
        };
        frame.ok_or_else(|| GuiError::desktop("capture", "no frame available"))
    }

    fn cursor_position(&self) -> GuiResult<Location> {
        Ok(*self.cursor.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn move_to(&self, location: Location) -> GuiResult<()> {
        self.set_cursor(location);
        self.record(InputEvent::Move(location));
        Ok(())
    }

    fn click(
        &self,
        location: Location,
        button: MouseButton,
        modifiers: &[Key],
        count: u32,
    ) -> GuiResult<()> {
        self.set_cursor(location);
        self.record(InputEvent::Click {
            at: location,
            button,
            modifiers: modifiers.to_vec(),
            count,
        });
        Ok(())
    }

    fn mouse_down(&self, button: MouseButton) -> GuiResult<()> {
        self.record(InputEvent::MouseDown(button));
        Ok(())
    }

    fn mouse_up(&self, button: MouseButton) -> GuiResult<()> {
        self.record(InputEvent::MouseUp(button));
        Ok(())
    }

    fn toggle_keys(&self, keys: &[Key], down: bool) -> GuiResult<()> {
        self.record(InputEvent::KeysToggle {
            keys: keys.to_vec(),
            down,
        });
        Ok(())
    }

    fn key_press(&self, keys: &[Key]) -> GuiResult<()> {
        self.record(InputEvent::KeyPress(keys.to_vec()));
        Ok(())
    }

    fn type_text(&self, text: &str, modifiers: &[Key]) -> GuiResult<()> {
        self.record(InputEvent::Type {
            text: text.to_string(),
            modifiers: modifiers.to_vec(),
        });
        Ok(())
    }
}
