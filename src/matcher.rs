//! Matching backend interface and the ranking policy applied to its output

use crate::error::GuiResult;
use crate::location::BoundingBox;
use crate::pattern::Image;
use crate::settings::{Backend, MatchSettings};
use image::RgbImage;
use std::cmp::Ordering;

/// One detection reported by a matcher, in haystack coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub bbox: BoundingBox,
    /// Backend score in [0, 1]
    pub similarity: f64,
}

impl Candidate {
    pub fn new(bbox: BoundingBox, similarity: f64) -> Self {
        Self { bbox, similarity }
    }
}

/// Pixel matching strategy. Implementations apply color sensitivity and any
/// backend tunables from `settings`; thresholding, ordering and duplicate
/// removal are left to `rank_candidates`.
pub trait Matcher: Send + Sync {
    fn find_all(
        &self,
        haystack: &RgbImage,
        needle: &Image,
        settings: &MatchSettings,
    ) -> GuiResult<Vec<Candidate>>;

    /// Whether this matcher can serve `backend`
    fn supports(&self, backend: Backend) -> bool;
}

/// Most similar first; equal scores ordered top to bottom, then left to right
pub fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.similarity
        .partial_cmp(&a.similarity)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.bbox.y.cmp(&b.bbox.y))
        .then_with(|| a.bbox.x.cmp(&b.bbox.x))
}

/// Keep candidates at or above `threshold` that lie inside `bounds`, order
/// them and drop every candidate overlapping a better ranked one.
pub fn rank_candidates(
    candidates: Vec<Candidate>,
    threshold: f64,
    bounds: &BoundingBox,
) -> Vec<Candidate> {
    let mut accepted: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.similarity >= threshold)
        .filter(|c| {
            let inside = bounds.contains(&c.bbox);
            if !inside {
                log::warn!("Dropping candidate {:?} outside of {:?}", c.bbox, bounds);
            }
            inside
        })
        .collect();
    accepted.sort_by(compare_candidates);

    let mut kept: Vec<Candidate> = Vec::with_capacity(accepted.len().min(16));
    for candidate in accepted {
        if kept.iter().all(|k| !k.bbox.intersects(&candidate.bbox)) {
            kept.push(candidate);
        }
    }
    kept
}

/// Best score regardless of any threshold, 0.0 if nothing was reported
pub fn best_similarity(candidates: &[Candidate]) -> f64 {
    candidates
        .iter()
        .map(|c| c.similarity)
        .fold(0.0, f64::max)
}
