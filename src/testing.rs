// Test doubles shared by the unit tests
use crate::desktop::ScreenshotDesktop;
use crate::error::GuiResult;
use crate::location::BoundingBox;
use crate::matcher::{Candidate, Matcher};
use crate::pattern::Image;
use crate::region::Context;
use crate::settings::{Backend, MatchSettings, Timing};
use image::RgbImage;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn cand(x: u32, y: u32, width: u32, height: u32, similarity: f64) -> Candidate {
    Candidate::new(BoundingBox::new(x, y, width, height), similarity)
}

/// Matcher replaying scripted answers, one per call, then a fallback answer
pub struct ScriptedMatcher {
    script: Mutex<VecDeque<Vec<Candidate>>>,
    fallback: Vec<Candidate>,
    unsupported: Vec<Backend>,
    calls: AtomicUsize,
    haystacks: Mutex<Vec<(u32, u32)>>,
    seen_settings: Mutex<Vec<MatchSettings>>,
}

impl ScriptedMatcher {
    pub fn always(fallback: Vec<Candidate>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            unsupported: Vec::new(),
            calls: AtomicUsize::new(0),
            haystacks: Mutex::new(Vec::new()),
            seen_settings: Mutex::new(Vec::new()),
        }
    }

    pub fn nothing() -> Self {
        Self::always(Vec::new())
    }

    /// Answer the next calls with `answers` in order before the fallback
    pub fn then(self, answers: Vec<Vec<Candidate>>) -> Self {
        self.script.lock().unwrap().extend(answers);
        self
    }

    pub fn without(mut self, backend: Backend) -> Self {
        self.unsupported.push(backend);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn haystack_sizes(&self) -> Vec<(u32, u32)> {
        self.haystacks.lock().unwrap().clone()
    }

    pub fn seen_settings(&self) -> Vec<MatchSettings> {
        self.seen_settings.lock().unwrap().clone()
    }
}

impl Matcher for ScriptedMatcher {
    fn find_all(
        &self,
        haystack: &RgbImage,
        _needle: &Image,
        settings: &MatchSettings,
    ) -> GuiResult<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.haystacks.lock().unwrap().push(haystack.dimensions());
        self.seen_settings.lock().unwrap().push(settings.clone());
        let scripted = self.script.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| self.fallback.clone()))
    }

    fn supports(&self, backend: Backend) -> bool {
        !self.unsupported.contains(&backend)
    }
}

/// Fast timing for tests: short rescans and action lookups, no action delays
pub fn fast_timing() -> Timing {
    Timing {
        rescan_interval: Duration::from_millis(5),
        action_timeout: Duration::from_millis(30),
        ..Timing::immediate()
    }
}

pub fn context(desktop: &Arc<ScreenshotDesktop>, matcher: &Arc<ScriptedMatcher>) -> Context {
    Context::new(desktop.clone(), matcher.clone()).with_timing(fast_timing())
}
