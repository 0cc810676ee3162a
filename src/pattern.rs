//! Reference images (needles) and where to load them from

use crate::error::{GuiError, GuiResult};
use crate::location::Location;
use crate::settings::{self, Backend, MatchSettings};
use image::RgbImage;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A pattern to search for, together with its own matching settings and the
/// offset applied to the anchor point of every match.
#[derive(Clone)]
pub struct Image {
    name: String,
    path: Option<PathBuf>,
    pixels: Option<Arc<RgbImage>>,
    settings: MatchSettings,
    target_offset: Location,
}

impl Image {
    /// Pattern resolved by name later (through an `ImageLibrary`), using a
    /// copy of the current default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_settings(name, &settings::default_settings())
    }

    /// Pattern with a private copy of `settings`
    pub fn with_settings(name: impl Into<String>, settings: &MatchSettings) -> Self {
        Self {
            name: name.into(),
            path: None,
            pixels: None,
            settings: settings.clone(),
            target_offset: Location::default(),
        }
    }

    /// Pattern with pixels already in memory
    pub fn from_pixels(name: impl Into<String>, pixels: RgbImage) -> Self {
        let mut image = Self::new(name);
        image.pixels = Some(Arc::new(pixels));
        image
    }

    /// Load a pattern from a file right away
    pub fn load(path: impl AsRef<Path>) -> GuiResult<Self> {
        let path = path.as_ref();
        let pixels = load_rgb(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        let mut image = Self::from_pixels(name, pixels);
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn pixels(&self) -> Option<&Arc<RgbImage>> {
        self.pixels.as_ref()
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Mutable access to this image's own copy of the settings
    pub fn settings_mut(&mut self) -> &mut MatchSettings {
        &mut self.settings
    }

    pub fn target_offset(&self) -> Location {
        self.target_offset
    }

    /// Move the action anchor relative to the center of each match
    pub fn with_target_offset(mut self, dx: i32, dy: i32) -> Self {
        self.target_offset = Location::new(dx, dy);
        self
    }

    pub fn with_similarity(mut self, value: f64) -> GuiResult<Self> {
        self.settings.set_similarity(value)?;
        Ok(self)
    }

    pub fn with_color_sensitive(mut self, value: bool) -> Self {
        self.settings.set_color_sensitive(value);
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> GuiResult<Self> {
        self.settings.set_backend(backend)?;
        Ok(self)
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("name", &self.name)
            .field("path", &self.path)
            .field(
                "size",
                &self.pixels.as_ref().map(|p| (p.width(), p.height())),
            )
            .field("settings", &self.settings)
            .field("target_offset", &self.target_offset)
            .finish()
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Image {
    fn from(name: &str) -> Self {
        Image::new(name)
    }
}

impl From<String> for Image {
    fn from(name: String) -> Self {
        Image::new(name)
    }
}

impl From<&Image> for Image {
    fn from(image: &Image) -> Self {
        image.clone()
    }
}

fn load_rgb(path: &Path) -> GuiResult<RgbImage> {
    let image = image::open(path).map_err(|source| GuiError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgb8())
}

/// Ordered list of directories searched for named images
#[derive(Debug, Clone, Default)]
pub struct ImageLibrary {
    paths: Vec<PathBuf>,
}

impl ImageLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Locate `name` as given or with a `.png` extension; earlier paths win
    pub fn search(&self, name: &str) -> Option<PathBuf> {
        let direct = Path::new(name);
        if direct.is_absolute() && direct.is_file() {
            return Some(direct.to_path_buf());
        }
        let with_ext = format!("{name}.png");
        for dir in &self.paths {
            for candidate in [dir.join(name), dir.join(&with_ext)] {
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    pub fn load(&self, name: &str) -> GuiResult<RgbImage> {
        let path = self
            .search(name)
            .ok_or_else(|| GuiError::ImageNotFound {
                name: name.to_string(),
                paths: self.paths.clone(),
            })?;
        log::debug!("Loading image '{}' from {:?}", name, path);
        load_rgb(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_offset_builder() {
        let image = Image::new("circle").with_target_offset(200, 100);
        assert_eq!(image.target_offset(), Location::new(200, 100));
        assert_eq!(image.name(), "circle");
        assert!(image.pixels().is_none());
    }

    #[test]
    fn test_settings_copied_per_image() {
        let shared = MatchSettings::default();
        let mut first = Image::with_settings("first", &shared);
        let second = Image::with_settings("second", &shared);

        first.settings_mut().set_similarity(0.3).unwrap();
        first.settings_mut().set_color_sensitive(false);

        assert_eq!(second.settings().similarity(), 0.8);
        assert!(second.settings().color_sensitive());
        assert_eq!(shared.similarity(), 0.8);
    }

    #[test]
    fn test_cloned_image_settings_independent() {
        let original = Image::new("button").with_similarity(0.9).unwrap();
        let copy = original.clone().with_similarity(0.4).unwrap();
        assert_eq!(original.settings().similarity(), 0.9);
        assert_eq!(copy.settings().similarity(), 0.4);
    }

    #[test]
    fn test_invalid_similarity_rejected() {
        assert!(Image::new("button").with_similarity(1.01).is_err());
    }

    #[test]
    fn test_library_search_adds_extension() {
        let dir = std::env::temp_dir().join(format!("guibender-lib-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("shape_red_box.png");
        RgbImage::from_pixel(4, 4, image::Rgb([255, 0, 0]))
            .save(&file)
            .unwrap();

        let mut library = ImageLibrary::new();
        library.add_path(dir.join("missing"));
        library.add_path(&dir);

        assert_eq!(library.search("shape_red_box"), Some(file.clone()));
        assert_eq!(library.search("shape_red_box.png"), Some(file));
        let loaded = library.load("shape_red_box").unwrap();
        assert_eq!(loaded.dimensions(), (4, 4));

        let err = library.load("nothing_here").unwrap_err();
        assert!(matches!(err, GuiError::ImageNotFound { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
