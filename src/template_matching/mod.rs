/// Built-in matcher for the `template` and `native` backends
///
/// This module provides:
/// - Normalized cross-correlation via imageproc (`template`)
/// - Sum of squared differences scan with early exit (`native`)
/// - Color or grayscale scoring depending on the image settings
/// - Needle loading through an `ImageLibrary` with an in-memory cache
pub mod correlation;
pub mod matcher;
pub mod types;

pub use matcher::TemplateMatcher;
pub use types::ScoreMap;
