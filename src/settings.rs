//! Configuration for image matching operations
//!
//! `MatchSettings` is copied into every `Image` at construction, so changing
//! one image's settings never leaks into another image or into the
//! process-wide defaults.

use crate::error::{GuiError, GuiResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};
use std::time::Duration;

/// Matching strategy selected per image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Normalized cross-correlation over the whole needle
    Template,
    /// Keypoint/descriptor matching
    Feature,
    /// Feature matching verified by template correlation
    Hybrid,
    /// Direct pixel difference scan
    Native,
}

impl Backend {
    pub const ALL: [Backend; 4] = [
        Backend::Template,
        Backend::Feature,
        Backend::Hybrid,
        Backend::Native,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Template => "template",
            Backend::Feature => "feature",
            Backend::Hybrid => "hybrid",
            Backend::Native => "native",
        }
    }

    /// Whether some matcher in this process can serve the backend
    pub fn is_available(&self) -> bool {
        available_backends()
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(self)
    }

    /// Fail with `UnsupportedBackend` unless the backend is available
    pub fn ensure_available(&self) -> GuiResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(GuiError::UnsupportedBackend {
                backend: self.name().to_string(),
            })
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = GuiError;

    /// Parse a backend name and check that it can be used right now
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let backend = Backend::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GuiError::UnsupportedBackend {
                backend: s.to_string(),
            })?;
        backend.ensure_available()?;
        Ok(backend)
    }
}

fn available_backends() -> &'static RwLock<HashSet<Backend>> {
    static AVAILABLE: OnceLock<RwLock<HashSet<Backend>>> = OnceLock::new();
    // The built-in template matcher serves these two
    AVAILABLE.get_or_init(|| RwLock::new(HashSet::from([Backend::Template, Backend::Native])))
}

/// Mark a backend as available, for matchers implemented outside this crate
pub fn register_backend(backend: Backend) {
    log::debug!("Registering matching backend '{}'", backend);
    available_backends()
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .insert(backend);
}

/// Backend specific tunable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Param {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Param::Int(v) => Some(*v as f64),
            Param::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Param::Int(v) if *v >= 0 => Some(*v as usize),
            _ => None,
        }
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

/// Parameters governing how one image is searched for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    similarity: f64,
    color_sensitive: bool,
    backend: Backend,
    extra: BTreeMap<String, BTreeMap<String, Param>>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            similarity: 0.8,
            color_sensitive: true,
            backend: Backend::Template,
            extra: BTreeMap::new(),
        }
    }
}

impl MatchSettings {
    /// Preset for pixel exact widgets (icons, fixed size buttons)
    pub fn precise() -> Self {
        Self {
            similarity: 0.95,
            backend: Backend::Native,
            ..Self::default()
        }
    }

    /// Preset for shape-only matching that ignores color
    pub fn loose() -> Self {
        Self {
            similarity: 0.5,
            color_sensitive: false,
            ..Self::default()
        }
    }

    /// Acceptance threshold in [0, 1]
    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    pub fn set_similarity(&mut self, value: f64) -> GuiResult<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(GuiError::InvalidSimilarity { value });
        }
        self.similarity = value;
        Ok(())
    }

    pub fn color_sensitive(&self) -> bool {
        self.color_sensitive
    }

    pub fn set_color_sensitive(&mut self, value: bool) {
        self.color_sensitive = value;
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Select a backend, failing right away if it cannot be served
    pub fn set_backend(&mut self, backend: Backend) -> GuiResult<()> {
        backend.ensure_available()?;
        self.backend = backend;
        Ok(())
    }

    pub fn param(&self, category: &str, key: &str) -> Option<&Param> {
        self.extra.get(category).and_then(|params| params.get(key))
    }

    pub fn set_param(&mut self, category: &str, key: &str, value: impl Into<Param>) {
        self.extra
            .entry(category.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Check values that may have bypassed the setters (deserialization)
    pub fn validate(&self) -> GuiResult<()> {
        if !(0.0..=1.0).contains(&self.similarity) {
            return Err(GuiError::InvalidSimilarity {
                value: self.similarity,
            });
        }
        self.backend.ensure_available()
    }
}

fn global_defaults() -> &'static RwLock<MatchSettings> {
    static DEFAULTS: OnceLock<RwLock<MatchSettings>> = OnceLock::new();
    DEFAULTS.get_or_init(|| RwLock::new(MatchSettings::default()))
}

/// A private copy of the process-wide default settings
pub fn default_settings() -> MatchSettings {
    global_defaults()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Replace the process-wide defaults. Images created earlier keep their copy.
pub fn set_default_settings(settings: MatchSettings) -> GuiResult<()> {
    settings.validate()?;
    *global_defaults().write().unwrap_or_else(|e| e.into_inner()) = settings;
    Ok(())
}

mod seconds {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

/// Default timeouts and delays used by regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    #[serde(with = "seconds")]
    pub find_timeout: Duration,
    #[serde(with = "seconds")]
    pub wait_timeout: Duration,
    #[serde(with = "seconds")]
    pub exists_timeout: Duration,
    /// Timeout used when an action has to locate its image target first
    #[serde(with = "seconds")]
    pub action_timeout: Duration,
    /// Pause between two search attempts
    #[serde(with = "seconds")]
    pub rescan_interval: Duration,
    #[serde(with = "seconds")]
    pub delay_after_drag: Duration,
    #[serde(with = "seconds")]
    pub delay_before_drop: Duration,
    #[serde(with = "seconds")]
    pub delay_before_keys: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            find_timeout: Duration::from_secs(10),
            wait_timeout: Duration::from_secs(30),
            exists_timeout: Duration::ZERO,
            action_timeout: Duration::from_secs(10),
            rescan_interval: Duration::from_millis(200),
            delay_after_drag: Duration::from_millis(500),
            delay_before_drop: Duration::from_millis(500),
            delay_before_keys: Duration::from_millis(200),
        }
    }
}

impl Timing {
    /// No delays between actions, for offline runs against screenshots
    pub fn immediate() -> Self {
        Self {
            rescan_interval: Duration::from_millis(10),
            delay_after_drag: Duration::ZERO,
            delay_before_drop: Duration::ZERO,
            delay_before_keys: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub matching: MatchSettings,
    pub timing: Timing,
    pub image_paths: Vec<PathBuf>,
}

impl Config {
    /// Load and validate a JSON configuration file
    pub fn load(path: &Path) -> GuiResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GuiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> GuiResult<Self> {
        let config: Config = serde_json::from_str(text).map_err(|source| GuiError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.matching.validate()?;
        Ok(config)
    }
}
