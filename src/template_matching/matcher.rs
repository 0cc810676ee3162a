/// Template matching implementation
///
/// Serves the `template` and `native` backends on top of the score maps in
/// `correlation`, loading named needles through an `ImageLibrary`.
use super::correlation::{ssd_scores, template_scores};
use crate::error::{GuiError, GuiResult};
use crate::matcher::{Candidate, Matcher};
use crate::pattern::{Image, ImageLibrary};
use crate::settings::{Backend, MatchSettings, Param};
use image::RgbImage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Upper bound on candidates reported per search unless overridden by the
/// `("template", "max_candidates")` parameter
pub const DEFAULT_MAX_CANDIDATES: usize = 1000;

/// Template matcher for finding needles in captured screens
pub struct TemplateMatcher {
    library: ImageLibrary,
    cache: Mutex<HashMap<String, Arc<RgbImage>>>,
}

impl TemplateMatcher {
    /// Create a matcher that only knows images carrying their own pixels
    pub fn new() -> Self {
        Self::with_library(ImageLibrary::new())
    }

    /// Create a matcher resolving image names through `library`
    pub fn with_library(library: ImageLibrary) -> Self {
        Self {
            library,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn library(&self) -> &ImageLibrary {
        &self.library
    }

    /// Pixels of the needle, loaded once per name
    fn needle_pixels(&self, needle: &Image) -> GuiResult<Arc<RgbImage>> {
        if let Some(pixels) = needle.pixels() {
            return Ok(pixels.clone());
        }
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pixels) = cache.get(needle.name()) {
            return Ok(pixels.clone());
        }
        let pixels = Arc::new(self.library.load(needle.name())?);
        cache.insert(needle.name().to_string(), pixels.clone());
        Ok(pixels)
    }

    /// Clear cached needles, e.g. after image files changed on disk
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher for TemplateMatcher {
    fn find_all(
        &self,
        haystack: &RgbImage,
        needle: &Image,
        settings: &MatchSettings,
    ) -> GuiResult<Vec<Candidate>> {
        let start_time = std::time::Instant::now();
        let pixels = self.needle_pixels(needle)?;
        let floor = settings.similarity() as f32;
        let color = settings.color_sensitive();

        let scores = match settings.backend() {
            Backend::Template => template_scores(haystack, &pixels, color),
            Backend::Native => ssd_scores(haystack, &pixels, color, floor),
            other => {
                return Err(GuiError::UnsupportedBackend {
                    backend: other.name().to_string(),
                });
            }
        };

        let Some(scores) = scores else {
            log::debug!(
                "Skipping '{}' - too large for region: {}x{} > {}x{}",
                needle.name(),
                pixels.width(),
                pixels.height(),
                haystack.width(),
                haystack.height()
            );
            return Ok(Vec::new());
        };

        let max_candidates = settings
            .param("template", "max_candidates")
            .and_then(Param::as_usize)
            .unwrap_or(DEFAULT_MAX_CANDIDATES);
        let candidates = scores.candidates(pixels.width(), pixels.height(), floor, max_candidates);

        log::debug!(
            "{} backend: {} candidates >= {:.3} for '{}' in {}x{} ({}ms)",
            settings.backend(),
            candidates.len(),
            floor,
            needle.name(),
            haystack.width(),
            haystack.height(),
            start_time.elapsed().as_millis()
        );
        Ok(candidates)
    }

    fn supports(&self, backend: Backend) -> bool {
        matches!(backend, Backend::Template | Backend::Native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn scene() -> (RgbImage, RgbImage) {
        let needle = RgbImage::from_fn(8, 8, |x, y| {
            if x < 4 && y < 4 || x >= 4 && y >= 4 {
                Rgb([20, 40, 200])
            } else {
                Rgb([250, 250, 10])
            }
        });
        let mut haystack = RgbImage::from_pixel(60, 40, Rgb([255, 255, 255]));
        image::imageops::replace(&mut haystack, &needle, 30, 12);
        (haystack, needle)
    }

    #[test]
    fn test_native_backend_finds_needle() {
        let (haystack, needle) = scene();
        let image = Image::from_pixels("quadrants", needle)
            .with_backend(Backend::Native)
            .unwrap()
            .with_similarity(0.99)
            .unwrap();

        let matcher = TemplateMatcher::new();
        let candidates = matcher
            .find_all(&haystack, &image, image.settings())
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].bbox.x, 30);
        assert_eq!(candidates[0].bbox.y, 12);
        assert_eq!(candidates[0].bbox.width, 8);
    }

    #[test]
    fn test_template_backend_best_candidate() {
        let (haystack, needle) = scene();
        let image = Image::from_pixels("quadrants", needle)
            .with_color_sensitive(false)
            .with_similarity(0.0)
            .unwrap();

        let matcher = TemplateMatcher::new();
        let candidates = matcher
            .find_all(&haystack, &image, image.settings())
            .unwrap();

        assert_eq!((candidates[0].bbox.x, candidates[0].bbox.y), (30, 12));
        // Overlapping placements were merged into their best one
        assert!(candidates.len() < DEFAULT_MAX_CANDIDATES);
        for (i, a) in candidates.iter().enumerate() {
            for b in &candidates[i + 1..] {
                assert!(!a.bbox.intersects(&b.bbox), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_max_candidates_param() {
        let (haystack, needle) = scene();
        let mut image = Image::from_pixels("quadrants", needle)
            .with_backend(Backend::Native)
            .unwrap()
            .with_similarity(0.0)
            .unwrap();
        image
            .settings_mut()
            .set_param("template", "max_candidates", 3i64);

        let matcher = TemplateMatcher::new();
        let candidates = matcher
            .find_all(&haystack, &image, image.settings())
            .unwrap();
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn test_unknown_name_is_image_error() {
        let matcher = TemplateMatcher::new();
        let image = Image::new("does_not_exist");
        let err = matcher
            .find_all(&RgbImage::new(10, 10), &image, image.settings())
            .unwrap_err();
        assert!(matches!(err, GuiError::ImageNotFound { .. }));
    }

    #[test]
    fn test_supported_backends() {
        let matcher = TemplateMatcher::new();
        assert!(matcher.supports(Backend::Template));
        assert!(matcher.supports(Backend::Native));
        assert!(!matcher.supports(Backend::Feature));
        assert!(!matcher.supports(Backend::Hybrid));
    }
}
