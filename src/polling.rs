//! Timeout bounded retry loop shared by every search operation
//!
//! An attempt either yields a value (done) or nothing (try again). Between
//! attempts the calling thread sleeps for a fixed interval; once the elapsed
//! time reaches the timeout the loop gives up. A zero timeout means exactly
//! one attempt and no sleep.

use crate::error::GuiResult;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingEngine {
    interval: Duration,
}

impl PollingEngine {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `attempt` until it yields a value or `timeout` elapses.
    ///
    /// Errors from an attempt abort the loop immediately; `Ok(None)` means
    /// the timeout elapsed without success.
    pub fn run<T, F>(&self, timeout: Duration, mut attempt: F) -> GuiResult<Option<T>>
    where
        F: FnMut() -> GuiResult<Option<T>>,
    {
        let start = Instant::now();
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            if let Some(value) = attempt()? {
                log::debug!(
                    "Poll succeeded after {} attempt(s) in {}ms",
                    attempts,
                    start.elapsed().as_millis()
                );
                return Ok(Some(value));
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                log::debug!(
                    "Poll gave up after {} attempt(s) in {}ms",
                    attempts,
                    elapsed.as_millis()
                );
                return Ok(None);
            }
            // Never sleep past the deadline; one last attempt runs after it
            std::thread::sleep(self.interval.min(timeout - elapsed));
        }
    }
}

impl Default for PollingEngine {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}
