//! Screen regions and the search operations performed inside them
//!
//! Every search captures the screen again for each attempt, crops it to the
//! region and hands it to the matcher; the polling engine decides when to
//! give up. A successful search replaces the region's last match, a failed
//! one leaves it untouched.

pub mod actions;


pub use actions::Target;

use crate::desktop::DesktopControl;
use crate::error::{GuiError, GuiResult};
use crate::location::{BoundingBox, Location};
use crate::matcher::{Candidate, Matcher, best_similarity, rank_candidates};
use crate::matches::Match;
use crate::pattern::Image;
use crate::polling::PollingEngine;
use crate::settings::Timing;
use image::RgbImage;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Collaborators shared by all regions and matches of one desktop session
#[derive(Clone)]
pub struct Context {
    desktop: Arc<dyn DesktopControl>,
    matcher: Arc<dyn Matcher>,
    timing: Timing,
}

impl Context {
    pub fn new(desktop: Arc<dyn DesktopControl>, matcher: Arc<dyn Matcher>) -> Self {
        Self {
            desktop,
            matcher,
            timing: Timing::default(),
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn desktop(&self) -> &Arc<dyn DesktopControl> {
        &self.desktop
    }

    pub fn matcher(&self) -> &Arc<dyn Matcher> {
        &self.matcher
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    fn polling(&self) -> PollingEngine {
        PollingEngine::new(self.timing.rescan_interval)
    }

    fn screen_bounds(&self) -> BoundingBox {
        let (width, height) = self.desktop.screen_dimensions();
        BoundingBox::new(0, 0, width, height)
    }
}

/// A rectangle on screen that can be searched and acted upon
pub struct Region {
    ctx: Context,
    bbox: BoundingBox,
    last_match: RwLock<Option<Arc<Match>>>,
}

impl Region {
    /// Region at the given position, clipped to the screen
    pub fn new(ctx: &Context, x: u32, y: u32, width: u32, height: u32) -> Self {
        let screen = ctx.screen_bounds();
        let x = x.min(screen.width);
        let y = y.min(screen.height);
        let bbox = BoundingBox::new(
            x,
            y,
            width.min(screen.width - x),
            height.min(screen.height - y),
        );
        Self::from_bbox(ctx.clone(), bbox)
    }

    /// Region covering the whole screen
    pub fn full_screen(ctx: &Context) -> Self {
        Self::from_bbox(ctx.clone(), ctx.screen_bounds())
    }

    pub(crate) fn from_bbox(ctx: Context, bbox: BoundingBox) -> Self {
        Self {
            ctx,
            bbox,
            last_match: RwLock::new(None),
        }
    }

    pub fn x(&self) -> u32 {
        self.bbox.x
    }

    pub fn y(&self) -> u32 {
        self.bbox.y
    }

    pub fn width(&self) -> u32 {
        self.bbox.width
    }

    pub fn height(&self) -> u32 {
        self.bbox.height
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn center(&self) -> Location {
        self.bbox.center()
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Result of the most recent successful search in this region
    pub fn last_match(&self) -> Option<Arc<Match>> {
        self.last_match
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn remember(&self, found: &Arc<Match>) {
        *self.last_match.write().unwrap_or_else(|e| e.into_inner()) = Some(found.clone());
    }

    /// Current mouse pointer position
    pub fn mouse_location(&self) -> GuiResult<Location> {
        self.ctx.desktop.cursor_position()
    }

    /// Locate `image`, retrying until `timeout` (default: find timeout).
    /// The most similar match is returned and becomes the last match.
    pub fn find(
        &self,
        image: impl Into<Image>,
        timeout: impl Into<Option<Duration>>,
    ) -> GuiResult<Arc<Match>> {
        let timeout = timeout.into().unwrap_or(self.ctx.timing.find_timeout);
        self.find_image(&image.into(), timeout)
    }

    /// All non-overlapping matches of `image`, most similar first.
    ///
    /// Retries until at least one match shows up. With `allow_zero` an empty
    /// result after the timeout is returned instead of a `Find` error.
    pub fn find_all(
        &self,
        image: impl Into<Image>,
        timeout: impl Into<Option<Duration>>,
        allow_zero: bool,
    ) -> GuiResult<Vec<Arc<Match>>> {
        let image = image.into();
        let timeout = timeout.into().unwrap_or(self.ctx.timing.find_timeout);
        self.ensure_backend(&image)?;

        let found = self
            .ctx
            .polling()
            .run(timeout, || {
                let candidates = self.search(&image)?;
                Ok((!candidates.is_empty()).then_some(candidates))
            })?
            .unwrap_or_default();

        if found.is_empty() {
            if allow_zero {
                log::debug!("No matches of '{}', zero allowed", image);
                return Ok(Vec::new());
            }
            return Err(GuiError::Find {
                image: image.name().to_string(),
                timeout,
            });
        }

        let matches: Vec<Arc<Match>> = found.iter().map(|c| self.to_match(c, &image)).collect();
        self.remember(&matches[0]);
        log::info!("Found {} matches of '{}' in {:?}", matches.len(), image, self);
        Ok(matches)
    }

    /// Like `find` (default: exists timeout) but `None` instead of a `Find`
    /// error when nothing shows up
    pub fn exists(
        &self,
        image: impl Into<Image>,
        timeout: impl Into<Option<Duration>>,
    ) -> GuiResult<Option<Arc<Match>>> {
        let timeout = timeout.into().unwrap_or(self.ctx.timing.exists_timeout);
        match self.find_image(&image.into(), timeout) {
            Ok(found) => Ok(Some(found)),
            Err(GuiError::Find { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `find` with the longer wait timeout as default, for applications that
    /// still have to start up
    pub fn wait(
        &self,
        image: impl Into<Image>,
        timeout: impl Into<Option<Duration>>,
    ) -> GuiResult<Arc<Match>> {
        let timeout = timeout.into().unwrap_or(self.ctx.timing.wait_timeout);
        self.find_image(&image.into(), timeout)
    }

    /// Wait until `image` is no longer visible (default: wait timeout)
    pub fn wait_vanish(
        &self,
        image: impl Into<Image>,
        timeout: impl Into<Option<Duration>>,
    ) -> GuiResult<bool> {
        let image = image.into();
        let timeout = timeout.into().unwrap_or(self.ctx.timing.wait_timeout);
        self.ensure_backend(&image)?;

        let vanished = self.ctx.polling().run(timeout, || {
            Ok(self.search(&image)?.is_empty().then_some(()))
        })?;

        match vanished {
            Some(()) => {
                log::info!("'{}' vanished from {:?}", image, self);
                Ok(true)
            }
            None => Err(GuiError::NotFind {
                image: image.name().to_string(),
                timeout,
            }),
        }
    }

    /// Similarity of the best placement of `image` on the current screen,
    /// without threshold or retries
    pub fn sample(&self, image: impl Into<Image>) -> GuiResult<f64> {
        let image = image.into();
        self.ensure_backend(&image)?;

        let mut settings = image.settings().clone();
        settings.set_similarity(0.0)?;
        let haystack = self.capture()?;
        let bounds = BoundingBox::new(0, 0, haystack.width(), haystack.height());
        let candidates: Vec<Candidate> = self
            .ctx
            .matcher
            .find_all(&haystack, &image, &settings)?
            .into_iter()
            .filter(|c| bounds.contains(&c.bbox))
            .collect();

        let similarity = best_similarity(&candidates);
        log::debug!("Sampled '{}': similarity {:.3}", image, similarity);
        Ok(similarity)
    }

    /// New region grown by `margin` pixels on every side, clipped to the screen
    pub fn nearby(&self, margin: u32) -> Region {
        let screen = self.ctx.screen_bounds();
        let x = self.bbox.x.saturating_sub(margin);
        let y = self.bbox.y.saturating_sub(margin);
        let right = self.bbox.right().saturating_add(margin).min(screen.right());
        let bottom = self.bbox.bottom().saturating_add(margin).min(screen.bottom());
        Region::from_bbox(
            self.ctx.clone(),
            BoundingBox::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y)),
        )
    }

    /// Block for `duration`, then continue the chain
    pub fn idle(&self, duration: Duration) -> &Self {
        log::debug!("Idling for {:?}", duration);
        std::thread::sleep(duration);
        self
    }

    pub(crate) fn find_image(&self, image: &Image, timeout: Duration) -> GuiResult<Arc<Match>> {
        self.ensure_backend(image)?;
        log::debug!("Looking for '{}' in {:?} within {:?}", image, self, timeout);

        let best = self
            .ctx
            .polling()
            .run(timeout, || Ok(self.search(image)?.into_iter().next()))?;

        match best {
            Some(candidate) => {
                let found = self.to_match(&candidate, image);
                self.remember(&found);
                log::info!(
                    "Found '{}' at {:?} (similarity {:.3})",
                    image,
                    candidate.bbox,
                    candidate.similarity
                );
                Ok(found)
            }
            None => Err(GuiError::Find {
                image: image.name().to_string(),
                timeout,
            }),
        }
    }

    fn ensure_backend(&self, image: &Image) -> GuiResult<()> {
        let backend = image.settings().backend();
        if self.ctx.matcher.supports(backend) {
            Ok(())
        } else {
            Err(GuiError::UnsupportedBackend {
                backend: backend.name().to_string(),
            })
        }
    }

    /// Current screen contents inside this region
    fn capture(&self) -> GuiResult<RgbImage> {
        let screen = self.ctx.desktop.capture()?;
        Ok(image::imageops::crop_imm(
            &screen,
            self.bbox.x,
            self.bbox.y,
            self.bbox.width,
            self.bbox.height,
        )
        .to_image())
    }

    /// One matching attempt: accepted candidates in screen coordinates
    fn search(&self, image: &Image) -> GuiResult<Vec<Candidate>> {
        let haystack = self.capture()?;
        let bounds = BoundingBox::new(0, 0, haystack.width(), haystack.height());
        let candidates = self
            .ctx
            .matcher
            .find_all(&haystack, image, image.settings())?;

        Ok(
            rank_candidates(candidates, image.settings().similarity(), &bounds)
                .into_iter()
                .map(|c| Candidate::new(c.bbox.translate(self.bbox.x, self.bbox.y), c.similarity))
                .collect(),
        )
    }

    fn to_match(&self, candidate: &Candidate, image: &Image) -> Arc<Match> {
        let offset = image.target_offset();
        let target = candidate.bbox.center().offset(offset.x, offset.y);
        Arc::new(Match::new(
            self.ctx.clone(),
            candidate.bbox,
            candidate.similarity,
            target,
        ))
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Region[{},{},{},{}]",
            self.bbox.x, self.bbox.y, self.bbox.width, self.bbox.height
        )
    }
}
