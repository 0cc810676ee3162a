/// Template matching data types
use crate::location::BoundingBox;
use crate::matcher::Candidate;

/// Similarity score for every placement of a needle inside a haystack.
/// Entry `(x, y)` scores the needle with its top-left corner at `(x, y)`.
#[derive(Clone, Debug)]
pub struct ScoreMap {
    pub width: u32,
    pub height: u32,
    pub scores: Vec<f32>,
}

impl ScoreMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scores: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.scores[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, score: f32) {
        let idx = (y * self.width + x) as usize;
        // NaN shows up for flat black patches under normalized correlation
        self.scores[idx] = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Highest score and its position
    pub fn best(&self) -> Option<(u32, u32, f32)> {
        let (idx, score) = self
            .scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
        Some((idx as u32 % self.width, idx as u32 / self.width, *score))
    }

    /// Placements scoring at least `floor` as needle-sized boxes, best first.
    /// A placement overlapping a better one is dropped before the
    /// `max_candidates` cap applies, so the cap counts distinct hits.
    pub fn candidates(
        &self,
        needle_width: u32,
        needle_height: u32,
        floor: f32,
        max_candidates: usize,
    ) -> Vec<Candidate> {
        let mut ranked: Vec<(usize, f32)> = self
            .scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, score)| *score >= floor)
            .collect();
        // Row-major index breaks ties top to bottom, then left to right
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let reach_x = needle_width.saturating_sub(1);
        let reach_y = needle_height.saturating_sub(1);
        let mut suppressed = vec![false; self.scores.len()];
        let mut found = Vec::new();

        for (idx, score) in ranked {
            if found.len() >= max_candidates {
                break;
            }
            if suppressed[idx] {
                continue;
            }
            let x = idx as u32 % self.width;
            let y = idx as u32 / self.width;
            found.push(Candidate::new(
                BoundingBox::new(x, y, needle_width, needle_height),
                score as f64,
            ));

            // Every placement closer than one needle size overlaps this one
            let x_end = x.saturating_add(reach_x).min(self.width - 1);
            let y_end = y.saturating_add(reach_y).min(self.height - 1);
            for sy in y.saturating_sub(reach_y)..=y_end {
                let row = (sy * self.width) as usize;
                for sx in x.saturating_sub(reach_x)..=x_end {
                    suppressed[row + sx as usize] = true;
                }
            }
        }
        found
    }
}
