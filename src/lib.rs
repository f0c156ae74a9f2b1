//! Starposter
//!
//! Renders a deterministic, stylized poster from a title, a subtitle and a
//! theme index, then exports it as a lossless PNG.
//!
//! # Pipeline
//!
//! - **Seeding**: `title + "|" + subtitle` seeds a [`SeededRandom`]; the same
//!   pair always yields the same star field and ray jitter
//! - **Composition**: [`rendering::layout`] turns the theme and generator into
//!   ordered paint layers on a fixed 1600×2560 logical canvas
//! - **Surface**: [`rendering::surface::SurfaceManager`] allocates the physical
//!   buffer at the clamped display density
//! - **Text**: title and subtitle wait on the [`FontGate`] before painting
//! - **Export**: [`export::export_png`] encodes the surface under a fixed name
//!
//! # Example
//!
//! ```no_run
//! use starposter::{PosterConfig, PosterStudio, RenderRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PosterConfig {
//!     device_pixel_ratio: 2.0,
//!     ..Default::default()
//! };
//!
//! let studio = PosterStudio::new(config);
//! studio.render_blocking(&RenderRequest::new("نجوم", "سماء الليل", 1))?;
//! let png = studio.export_png()?;
//! png.write_into(std::path::Path::new("out"))?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod error;
pub use error::{Error, Result};

pub mod export;
pub mod random;
pub mod rendering;
pub mod studio;
pub mod theme;

pub use export::{export_png, PngExport, EXPORT_FILE_NAME};
pub use random::{make_generator, SeededRandom};
pub use rendering::text::FontGate;
pub use rendering::{Surface, LOGICAL_HEIGHT, LOGICAL_WIDTH};
pub use studio::{render_poster, PosterStudio, RenderStatus};
pub use theme::{next_theme, theme_at, Theme, CATALOG_SIZE};

/// Where font faces are loaded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSources {
    /// Load the faces installed on the system
    pub system: bool,
    /// Individual font files (e.g. bundled Amiri / Cairo faces)
    pub files: Vec<PathBuf>,
    /// Directories scanned for font files
    pub dirs: Vec<PathBuf>,
}

impl Default for FontSources {
    fn default() -> Self {
        Self {
            system: true,
            files: Vec::new(),
            dirs: Vec::new(),
        }
    }
}

impl FontSources {
    /// No faces at all; text layers draw nothing.
    pub fn none() -> Self {
        Self {
            system: false,
            files: Vec::new(),
            dirs: Vec::new(),
        }
    }
}

/// Configuration for the renderer
///
/// # Examples
///
/// ```
/// let cfg = starposter::PosterConfig::default();
/// assert_eq!(cfg.device_pixel_ratio, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosterConfig {
    /// Reported display density; clamped to `[1, 2]` when the surface is allocated
    pub device_pixel_ratio: f32,
    /// Upper bound on the wait for fonts before text falls back, in milliseconds
    pub font_timeout_ms: u64,
    /// Font sources
    pub fonts: FontSources,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            font_timeout_ms: 3000,
            fonts: FontSources::default(),
        }
    }
}

impl PosterConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::ConfigError(e.to_string()))
    }
}

/// What the UI hands over for one render
///
/// Text is accepted as-is: empty strings are valid and any length renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub title: String,
    pub subtitle: String,
    #[serde(default = "default_theme_index")]
    pub theme_index: usize,
}

fn default_theme_index() -> usize {
    theme::DEFAULT_THEME_INDEX
}

impl RenderRequest {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>, theme_index: usize) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            theme_index,
        }
    }

    /// The theme this request selects (wrapping around the catalog)
    pub fn theme(&self) -> &'static Theme {
        theme_at(self.theme_index)
    }

    /// The string the layout generator is seeded with
    pub fn seed_string(&self) -> String {
        random::seed_string(&self.title, &self.subtitle)
    }
}
