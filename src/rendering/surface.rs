//! Density-independent surface allocation

use crate::rendering::{LogicalSize, Surface};
use crate::{Error, Result};
use log::debug;
use tiny_skia::{Pixmap, Transform};

pub const MIN_DENSITY: f32 = 1.0;
pub const MAX_DENSITY: f32 = 2.0;

/// Clamp a reported display density into `[MIN_DENSITY, MAX_DENSITY]`.
///
/// Zero, negative and non-finite reports fall back to 1.
pub fn clamp_density(reported: f32) -> f32 {
    if !reported.is_finite() || reported <= 0.0 {
        return MIN_DENSITY;
    }
    reported.clamp(MIN_DENSITY, MAX_DENSITY)
}

/// Sizes the physical buffer from the logical canvas and display density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceManager {
    logical: LogicalSize,
    density: f32,
}

impl SurfaceManager {
    pub fn new(reported_density: f32) -> Self {
        Self::with_logical_size(LogicalSize::POSTER, reported_density)
    }

    pub fn with_logical_size(logical: LogicalSize, reported_density: f32) -> Self {
        Self {
            logical,
            density: clamp_density(reported_density),
        }
    }

    /// Effective (clamped) density
    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn logical_size(&self) -> LogicalSize {
        self.logical
    }

    /// Backing buffer dimensions: logical size times density
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = |v: u32| (v as f32 * self.density).round() as u32;
        (scale(self.logical.width), scale(self.logical.height))
    }

    /// Allocate a fresh, transparent surface with the density scale applied.
    pub fn allocate(&self) -> Result<Surface> {
        let (width, height) = self.physical_size();
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            Error::SurfaceUnavailable(format!("cannot allocate a {}x{} pixel buffer", width, height))
        })?;
        debug!(
            "allocated {}x{} surface (logical {}x{}, density {})",
            width, height, self.logical.width, self.logical.height, self.density
        );
        let mut surface = Surface {
            pixmap,
            logical: self.logical,
            density: self.density,
            transform: Transform::identity(),
        };
        self.configure(&mut surface);
        Ok(surface)
    }

    /// Reset the surface transform, then scale by density so drawing uses logical units.
    ///
    /// Safe to call repeatedly: scales never compound.
    pub fn configure(&self, surface: &mut Surface) {
        surface.reset_transform();
        surface.scale(self.density);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_is_clamped() {
        assert_eq!(clamp_density(0.0), 1.0);
        assert_eq!(clamp_density(-3.0), 1.0);
        assert_eq!(clamp_density(5.0), 2.0);
        assert_eq!(clamp_density(f32::NAN), 1.0);
        assert_eq!(clamp_density(f32::INFINITY), 1.0);
        assert_eq!(clamp_density(1.5), 1.5);
    }

    #[test]
    fn physical_size_scales_logical_size() {
        for (reported, expected) in [(0.0, 1.0), (1.0, 1.0), (1.5, 1.5), (2.0, 2.0), (5.0, 2.0), (-1.0, 1.0)] {
            let m = SurfaceManager::new(reported);
            assert_eq!(m.density(), expected);
            let (w, h) = m.physical_size();
            assert_eq!(w, (1600.0 * expected) as u32);
            assert_eq!(h, (2560.0 * expected) as u32);
        }
    }

    #[test]
    fn configure_does_not_compound() {
        let m = SurfaceManager::with_logical_size(LogicalSize { width: 8, height: 4 }, 2.0);
        let mut s = m.allocate().unwrap();
        assert_eq!((s.width(), s.height()), (16, 8));
        m.configure(&mut s);
        m.configure(&mut s);
        assert_eq!(s.transform(), Transform::from_scale(2.0, 2.0));
        assert_eq!(s.presented_size(), LogicalSize { width: 8, height: 4 });
    }

    #[test]
    fn zero_sized_canvas_is_unavailable() {
        let m = SurfaceManager::with_logical_size(LogicalSize { width: 0, height: 10 }, 1.0);
        assert!(matches!(m.allocate(), Err(Error::SurfaceUnavailable(_))));
    }
}
