//! Successful search results

use crate::location::{BoundingBox, Location};
use crate::region::{Context, Region};
use std::fmt;
use std::ops::Deref;

/// Where an image was found. A match is itself a region (searches and
/// actions can be chained on it) with a similarity score and the point at
/// which actions on it are performed.
pub struct Match {
    region: Region,
    similarity: f64,
    target: Location,
}

impl Match {
    pub(crate) fn new(ctx: Context, bbox: BoundingBox, similarity: f64, target: Location) -> Self {
        Self {
            region: Region::from_bbox(ctx, bbox),
            similarity,
            target,
        }
    }

    /// Backend score in [0, 1]
    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    /// Center of the match shifted by the image's target offset
    pub fn target(&self) -> Location {
        self.target
    }

    pub fn region(&self) -> &Region {
        &self.region
    }
}

impl Deref for Match {
    type Target = Region;

    fn deref(&self) -> &Region {
        &self.region
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Match[{},{},{},{}] similarity={:.3} target={}",
            self.x(),
            self.y(),
            self.width(),
            self.height(),
            self.similarity,
            self.target
        )
    }
}
