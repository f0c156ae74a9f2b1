//! Rendering pipeline: surface allocation, composition, rasterization, text.

pub mod effects;
pub mod layout;
pub mod paint;
pub mod raster;
pub mod surface;
pub mod text;

use crate::{Error, Result};
use sha2::{Digest, Sha256};
use tiny_skia::{Pixmap, Transform};

/// Logical canvas width; all layout math is expressed in these units
pub const LOGICAL_WIDTH: u32 = 1600;
/// Logical canvas height (tall poster aspect)
pub const LOGICAL_HEIGHT: u32 = 2560;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalSize {
    pub width: u32,
    pub height: u32,
}

impl LogicalSize {
    pub const POSTER: LogicalSize = LogicalSize {
        width: LOGICAL_WIDTH,
        height: LOGICAL_HEIGHT,
    };
}

impl Default for LogicalSize {
    fn default() -> Self {
        Self::POSTER
    }
}

/// A physical pixel buffer plus the transform that maps logical coordinates onto it.
///
/// Allocated fresh for every render by [`surface::SurfaceManager`].
#[derive(Debug, Clone)]
pub struct Surface {
    pixmap: Pixmap,
    logical: LogicalSize,
    density: f32,
    transform: Transform,
}

impl Surface {
    /// Physical width in pixels
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Physical height in pixels
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// The unscaled size the surface is presented at
    pub fn presented_size(&self) -> LogicalSize {
        self.logical
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Logical-to-physical transform currently applied to drawing
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    pub(crate) fn reset_transform(&mut self) {
        self.transform = Transform::identity();
    }

    pub(crate) fn scale(&mut self, factor: f32) {
        self.transform = self.transform.pre_scale(factor, factor);
    }

    /// Lossless PNG encoding of the physical pixels
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| Error::EncodeError(e.to_string()))
    }

    /// SHA-256 of the premultiplied RGBA pixel data, hex encoded
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.pixmap.data()))
    }
}
