//! Render orchestration for UI callers: font wait, stale-render guard, export.

use crate::export::{self, PngExport};
use crate::rendering::layout::{compose_poster, PosterLayout};
use crate::rendering::raster::{paint_layer, rasterize};
use crate::rendering::surface::SurfaceManager;
use crate::rendering::text::{FontGate, ReadyFonts, SharedTypesetter, Typesetter};
use crate::rendering::Surface;
use crate::theme::{self, theme_at};
use crate::{PosterConfig, RenderRequest, Result};
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Outcome of one render request
#[derive(Debug, Clone)]
pub enum RenderStatus {
    /// The render completed and is now the current surface
    Rendered {
        surface: Arc<Surface>,
        /// Text was drawn with the bundled face because fonts were not ready
        text_fallback: bool,
    },
    /// A newer render started while this one waited on fonts; nothing was kept
    Superseded { generation: u64 },
}

impl RenderStatus {
    pub fn surface(&self) -> Option<&Arc<Surface>> {
        match self {
            RenderStatus::Rendered { surface, .. } => Some(surface),
            RenderStatus::Superseded { .. } => None,
        }
    }

    /// Whether text fell back to the bundled face
    pub fn text_fallback(&self) -> bool {
        matches!(
            self,
            RenderStatus::Rendered {
                text_fallback: true,
                ..
            }
        )
    }
}

/// Render a poster in one pass with fonts the caller already holds.
///
/// No generation tracking and no font wait; every call allocates a fresh surface.
pub fn render_poster(request: &RenderRequest, density: f32, fonts: &mut Typesetter) -> Result<Surface> {
    let mut surface = SurfaceManager::new(density).allocate()?;
    let layout = compose_poster(request.theme(), &request.title, &request.subtitle);
    rasterize(&mut surface, &layout, Some(fonts));
    Ok(surface)
}

/// One in-flight render: a fresh surface plus the layers still to paint
struct Frame {
    generation: u64,
    surface: Surface,
    layout: PosterLayout,
    next: usize,
}

impl Frame {
    fn begin(request: &RenderRequest, density: f32, generation: u64) -> Result<Self> {
        let surface = SurfaceManager::new(density).allocate()?;
        let layout = compose_poster(
            theme_at(request.theme_index),
            &request.title,
            &request.subtitle,
        );
        debug!(
            "render #{}: theme {} at {}x{}",
            generation,
            theme_at(request.theme_index).name,
            surface.width(),
            surface.height()
        );
        Ok(Self {
            generation,
            surface,
            layout,
            next: 0,
        })
    }

    /// Paint every layer up to the first that needs fonts.
    fn paint_until_text(&mut self) {
        while let Some(layer) = self.layout.layers.get(self.next) {
            if layer.kind.needs_fonts() {
                break;
            }
            paint_layer(&mut self.surface, layer, None);
            self.next += 1;
        }
    }

    fn finish(&mut self, fonts: &SharedTypesetter) {
        let mut typesetter = fonts.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for layer in &self.layout.layers[self.next..] {
            paint_layer(&mut self.surface, layer, Some(&mut *typesetter));
        }
        self.next = self.layout.layers.len();
    }
}

/// Stateful renderer behind a UI: tracks the current surface and drops stale renders.
///
/// Renders are expected to be issued one after another; when they do overlap,
/// a render that resumes from its font wait after a newer one began is
/// discarded rather than painted over the newer result.
pub struct PosterStudio {
    config: PosterConfig,
    fonts: FontGate,
    generation: AtomicU64,
    current: Mutex<Option<Arc<Surface>>>,
}

impl PosterStudio {
    pub fn new(config: PosterConfig) -> Self {
        let fonts = FontGate::new(
            config.fonts.clone(),
            Duration::from_millis(config.font_timeout_ms),
        );
        Self::with_fonts(config, fonts)
    }

    pub fn with_fonts(config: PosterConfig, fonts: FontGate) -> Self {
        Self {
            config,
            fonts,
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PosterConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontGate {
        &self.fonts
    }

    /// Render, awaiting the font gate before the text layers.
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderStatus> {
        let mut frame = self.begin(request)?;
        frame.paint_until_text();
        let fonts = self.fonts.ready().await;
        Ok(self.complete(frame, &fonts))
    }

    /// Render on the calling thread, blocking (bounded) on the font gate.
    pub fn render_blocking(&self, request: &RenderRequest) -> Result<RenderStatus> {
        let mut frame = self.begin(request)?;
        frame.paint_until_text();
        let fonts = self.fonts.ready_blocking();
        Ok(self.complete(frame, &fonts))
    }

    fn begin(&self, request: &RenderRequest) -> Result<Frame> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Frame::begin(request, self.config.device_pixel_ratio, generation)
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn complete(&self, mut frame: Frame, fonts: &ReadyFonts) -> RenderStatus {
        if self.is_stale(frame.generation) {
            warn!("render #{} superseded before text layers", frame.generation);
            return RenderStatus::Superseded {
                generation: frame.generation,
            };
        }
        frame.finish(&fonts.typesetter);
        let mut current = self.lock_current();
        if self.is_stale(frame.generation) {
            warn!("render #{} superseded while painting text", frame.generation);
            return RenderStatus::Superseded {
                generation: frame.generation,
            };
        }
        let surface = Arc::new(frame.surface);
        *current = Some(Arc::clone(&surface));
        RenderStatus::Rendered {
            surface,
            text_fallback: fonts.fallback,
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<Arc<Surface>>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The most recently completed surface
    pub fn current_surface(&self) -> Option<Arc<Surface>> {
        self.lock_current().clone()
    }

    /// Number of renders started so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Encode the current surface as PNG.
    pub fn export_png(&self) -> Result<PngExport> {
        let current = self.current_surface();
        export::export_latest(current.as_deref())
    }

    /// Theme index after `current`.
    pub fn next_theme(&self, current: usize) -> usize {
        theme::next_theme(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn studio() -> PosterStudio {
        PosterStudio::with_fonts(
            PosterConfig::default(),
            FontGate::preloaded(Typesetter::empty()),
        )
    }

    #[test]
    fn export_before_render_fails() {
        let s = studio();
        assert!(matches!(s.export_png(), Err(Error::ExportWithoutRender)));
        assert!(s.current_surface().is_none());
    }

    #[test]
    fn blocking_render_replaces_current_surface() {
        let s = studio();
        let first = s.render_blocking(&RenderRequest::new("A", "B", 0)).unwrap();
        let first = first.surface().unwrap().clone();
        let second = s.render_blocking(&RenderRequest::new("A", "B", 1)).unwrap();
        let second = second.surface().unwrap().clone();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&s.current_surface().unwrap(), &second));
        assert_eq!(s.generation(), 2);
    }

    #[test]
    fn slow_fonts_are_reported_as_fallback() {
        let gate = FontGate::with_loader(
            || {
                std::thread::sleep(Duration::from_millis(300));
                Typesetter::empty()
            },
            Duration::from_millis(10),
        );
        let s = PosterStudio::with_fonts(PosterConfig::default(), gate);
        let status = s.render_blocking(&RenderRequest::new("A", "B", 0)).unwrap();
        assert!(status.text_fallback());
        assert!(status.surface().is_some());

        let ready = studio().render_blocking(&RenderRequest::new("A", "B", 0)).unwrap();
        assert!(!ready.text_fallback());
    }

    #[test]
    fn frame_stops_before_text_layers() {
        let mut frame = Frame::begin(&RenderRequest::new("", "", 0), 1.0, 1).unwrap();
        frame.paint_until_text();
        assert!(frame.layout.layers[frame.next].kind.needs_fonts());
        assert_eq!(frame.next, 4);
    }
}
