//! Text shaping and glyph coverage, plus the font readiness gate.
//!
//! Glyphs are shaped with cosmic-text (bidi + advanced shaping, so the
//! right-to-left titles come out in visual order) and collected into an
//! alpha [`Coverage`] buffer for the effects in [`super::effects`].

use crate::rendering::effects::{Clip, Coverage};
use crate::rendering::paint::{FontSpec, GenericFamily};
use crate::{Error, FontSources, Result};
use cosmic_text::{
    fontdb, Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache, Weight,
};
use log::{debug, warn};
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex, OnceLock};
use std::time::Duration;

const LOCALE: &str = "ar";
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// DejaVu Sans Bold, compiled in. Covers Arabic and Latin.
///
/// Stands in for the configured faces when they are not ready in time.
pub const FALLBACK_FACE: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Load a font database from the configured sources.
pub fn load_font_system(sources: &FontSources) -> FontSystem {
    let mut db = fontdb::Database::new();
    if sources.system {
        db.load_system_fonts();
    }
    for dir in &sources.dirs {
        if dir.is_dir() {
            db.load_fonts_dir(dir);
        } else {
            warn!("{}", Error::FontUnavailable(format!("{} is not a directory", dir.display())));
        }
    }
    for file in &sources.files {
        if let Err(e) = load_font_file(&mut db, file) {
            warn!("{}", e);
        }
    }
    debug!("font database holds {} faces", db.len());
    FontSystem::new_with_locale_and_db(LOCALE.to_string(), db)
}

/// Add one font file to `db`.
pub fn load_font_file(db: &mut fontdb::Database, path: &Path) -> Result<()> {
    let before = db.len();
    db.load_font_file(path)
        .map_err(|e| Error::FontUnavailable(format!("{}: {}", path.display(), e)))?;
    if db.len() == before {
        return Err(Error::FontUnavailable(format!(
            "{}: no usable faces",
            path.display()
        )));
    }
    Ok(())
}

/// A font system holding only [`FALLBACK_FACE`].
pub fn fallback_font_system() -> FontSystem {
    let mut db = fontdb::Database::new();
    db.load_font_data(FALLBACK_FACE.to_vec());
    FontSystem::new_with_locale_and_db(LOCALE.to_string(), db)
}

/// Point the serif and sans-serif generics at loaded faces when the
/// database defaults name families that are not installed.
fn settle_generic_families(db: &mut fontdb::Database) {
    let families: Vec<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
        .collect();
    let Some(first) = families.first().cloned() else {
        return;
    };
    let installed = |name: &str| families.iter().any(|f| f.eq_ignore_ascii_case(name));
    let pick = |matches: &dyn Fn(&str) -> bool| {
        families
            .iter()
            .find(|f| matches(f.as_str()))
            .cloned()
            .unwrap_or_else(|| first.clone())
    };

    if !installed(db.family_name(&Family::Serif)) {
        let name = pick(&|f| f.contains("Serif") && !f.contains("Sans"));
        debug!("generic serif resolves to {}", name);
        db.set_serif_family(name);
    }
    if !installed(db.family_name(&Family::SansSerif)) {
        let name = pick(&|f| f.contains("Sans"));
        debug!("generic sans-serif resolves to {}", name);
        db.set_sans_serif_family(name);
    }
}

/// Shapes text runs and produces glyph coverage
pub struct Typesetter {
    font_system: FontSystem,
    cache: SwashCache,
}

impl Typesetter {
    pub fn new(mut font_system: FontSystem) -> Self {
        settle_generic_families(font_system.db_mut());
        Self {
            font_system,
            cache: SwashCache::new(),
        }
    }

    /// A typesetter with no faces at all; every run shapes to nothing.
    pub fn empty() -> Self {
        Self::new(FontSystem::new_with_locale_and_db(
            LOCALE.to_string(),
            fontdb::Database::new(),
        ))
    }

    /// A typesetter over the bundled face only.
    pub fn fallback() -> Self {
        Self::new(fallback_font_system())
    }

    pub fn has_faces(&self) -> bool {
        self.font_system.db().faces().next().is_some()
    }

    pub fn has_family(&self, name: &str) -> bool {
        self.font_system
            .db()
            .faces()
            .any(|face| face.families.iter().any(|(f, _)| f.eq_ignore_ascii_case(name)))
    }

    /// First preferred family present in the database, else the generic one.
    pub fn resolve_family(&self, font: &FontSpec) -> Family<'static> {
        match font.families.iter().copied().find(|name| self.has_family(name)) {
            Some(name) => Family::Name(name),
            None => {
                debug!(
                    "none of {:?} installed; using generic {:?}",
                    font.families, font.generic
                );
                match font.generic {
                    GenericFamily::Serif => Family::Serif,
                    GenericFamily::SansSerif => Family::SansSerif,
                }
            }
        }
    }

    /// Coverage of `text` centred on `anchor`, both in physical pixels.
    ///
    /// `scale` multiplies the font size (the surface density). Glyphs and
    /// samples outside `clip` are dropped, so arbitrarily long runs stay
    /// bounded by the window.
    pub fn coverage(
        &mut self,
        text: &str,
        font: &FontSpec,
        anchor: (f32, f32),
        scale: f32,
        clip: Clip,
    ) -> Coverage {
        if text.is_empty() || !self.has_faces() {
            return Coverage::empty();
        }
        let size = font.size * scale;
        let family = self.resolve_family(font);
        let attrs = Attrs::new().family(family).weight(Weight(font.weight));

        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics::new(size, size * LINE_HEIGHT_FACTOR),
        );
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let mut left = f32::INFINITY;
        let mut right = f32::NEG_INFINITY;
        let mut top = f32::INFINITY;
        let mut bottom = f32::NEG_INFINITY;
        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                left = left.min(glyph.x);
                right = right.max(glyph.x + glyph.w);
            }
            top = top.min(run.line_top);
            bottom = bottom.max(run.line_top + run.line_height);
        }
        if !left.is_finite() || !top.is_finite() {
            return Coverage::empty();
        }
        let dx = anchor.0 - (left + right) / 2.0;
        let dy = anchor.1 - (top + bottom) / 2.0;

        // ink may overhang the advance box; one em of slack covers it
        let slack = size.ceil() as i32;
        let white = Color::rgb(0xff, 0xff, 0xff);
        let mut pixels = Vec::new();
        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((dx, dy + run.line_y), 1.0);
                if !clip.overlaps_columns(physical.x - slack, glyph.w.ceil() as i32 + 2 * slack) {
                    continue;
                }
                self.cache.with_pixels(
                    &mut self.font_system,
                    physical.cache_key,
                    white,
                    |x, y, color| {
                        let (px, py) = (physical.x + x, physical.y + y);
                        if color.a() > 0 && clip.contains(px, py) {
                            pixels.push((px, py, color.a()));
                        }
                    },
                );
            }
        }
        Coverage::from_pixels(&pixels)
    }
}

/// Shared handle to a loaded typesetter
pub type SharedTypesetter = Arc<Mutex<Typesetter>>;

/// What the font gate hands to the text layers
#[derive(Clone)]
pub struct ReadyFonts {
    pub typesetter: SharedTypesetter,
    /// The configured fonts were not ready; text uses the bundled face
    pub fallback: bool,
}

type Loader = Arc<dyn Fn() -> Typesetter + Send + Sync>;

/// Gate the text layers wait on until fonts are loaded.
///
/// Waits are bounded: when loading outlives the timeout the caller gets a
/// typesetter over [`FALLBACK_FACE`] and the load keeps running, filling the
/// gate for later renders.
pub struct FontGate {
    loaded: Arc<OnceLock<SharedTypesetter>>,
    fallback: OnceLock<SharedTypesetter>,
    loader: Loader,
    timeout: Duration,
}

impl FontGate {
    pub fn new(sources: FontSources, timeout: Duration) -> Self {
        Self::with_loader(move || Typesetter::new(load_font_system(&sources)), timeout)
    }

    pub fn with_loader<F>(loader: F, timeout: Duration) -> Self
    where
        F: Fn() -> Typesetter + Send + Sync + 'static,
    {
        Self {
            loaded: Arc::new(OnceLock::new()),
            fallback: OnceLock::new(),
            loader: Arc::new(loader),
            timeout,
        }
    }

    /// A gate that is already open.
    pub fn preloaded(typesetter: Typesetter) -> Self {
        let gate = Self::with_loader(Typesetter::empty, Duration::ZERO);
        let _ = gate.loaded.set(Arc::new(Mutex::new(typesetter)));
        gate
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.get().is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn load_job(&self) -> impl FnOnce() -> SharedTypesetter + Send + 'static {
        let loaded = Arc::clone(&self.loaded);
        let loader = Arc::clone(&self.loader);
        move || {
            loaded
                .get_or_init(|| Arc::new(Mutex::new(loader())))
                .clone()
        }
    }

    fn loaded(typesetter: SharedTypesetter) -> ReadyFonts {
        ReadyFonts {
            typesetter,
            fallback: false,
        }
    }

    fn fallback(&self) -> ReadyFonts {
        let typesetter = self
            .fallback
            .get_or_init(|| Arc::new(Mutex::new(Typesetter::fallback())))
            .clone();
        ReadyFonts {
            typesetter,
            fallback: true,
        }
    }

    /// Wait (asynchronously, bounded) for fonts.
    pub async fn ready(&self) -> ReadyFonts {
        if let Some(ts) = self.loaded.get() {
            return Self::loaded(ts.clone());
        }
        let job = tokio::task::spawn_blocking(self.load_job());
        match tokio::time::timeout(self.timeout, job).await {
            Ok(Ok(ts)) => Self::loaded(ts),
            Ok(Err(e)) => {
                warn!("Font loading failed: {}; using the bundled face", e);
                self.fallback()
            }
            Err(_) => {
                warn!(
                    "Fonts not ready after {:?}; using the bundled face",
                    self.timeout
                );
                self.fallback()
            }
        }
    }

    /// Wait (blocking the calling thread, bounded) for fonts.
    pub fn ready_blocking(&self) -> ReadyFonts {
        if let Some(ts) = self.loaded.get() {
            return Self::loaded(ts.clone());
        }
        let (tx, rx) = mpsc::channel();
        let job = self.load_job();
        std::thread::spawn(move || {
            let _ = tx.send(job());
        });
        match rx.recv_timeout(self.timeout) {
            Ok(ts) => Self::loaded(ts),
            Err(e) => {
                warn!("Fonts not ready ({}); using the bundled face", e);
                self.fallback()
            }
        }
    }
}
