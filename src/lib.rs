//! Visual GUI automation: locate images on screen and act on them.
//!
//! A [`Region`] searches the current screen contents for an [`Image`],
//! retrying until a timeout, and hands back [`Match`]es that can be clicked,
//! typed into or searched again. The [`proxy`] module exposes the same API
//! across a process boundary.

pub mod desktop;
pub mod error;
pub mod location;
pub mod matcher;
pub mod matches;
pub mod pattern;
pub mod polling;
pub mod proxy;
pub mod region;
pub mod settings;
pub mod template_matching;

#[cfg(test)]
mod testing;

pub use desktop::{DesktopControl, Key, MouseButton};
pub use error::{ErrorKind, GuiError, GuiResult};
pub use location::{BoundingBox, Location};
pub use matcher::{Candidate, Matcher};
pub use matches::Match;
pub use pattern::{Image, ImageLibrary};
pub use region::{Context, Region, Target};
pub use settings::{Backend, MatchSettings, Timing};
pub use template_matching::TemplateMatcher;
