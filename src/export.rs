//! Lossless PNG export under a fixed file name

use crate::rendering::Surface;
use crate::{Error, Result};
use base64::Engine as Base64Engine;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Every export is saved under this name.
pub const EXPORT_FILE_NAME: &str = "لوحة-النجوم-الذهبية.png";

/// An encoded poster, ready to hand to a save dialog or write to disk
#[derive(Debug, Clone)]
pub struct PngExport {
    pub file_name: &'static str,
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl PngExport {
    /// `data:image/png;base64,...` form, suitable for a download link
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png_data)
        )
    }

    /// SHA-256 of the encoded bytes, hex encoded
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }

    /// Write into `dir` under the fixed file name; returns the full path.
    pub fn write_into(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name);
        fs::write(&path, &self.png_data)?;
        Ok(path)
    }
}

/// Encode a rendered surface as PNG.
pub fn export_png(surface: &Surface) -> Result<PngExport> {
    Ok(PngExport {
        file_name: EXPORT_FILE_NAME,
        width: surface.width(),
        height: surface.height(),
        png_data: surface.encode_png()?,
    })
}

/// Encode the latest surface, if any render has completed.
pub fn export_latest(surface: Option<&Surface>) -> Result<PngExport> {
    match surface {
        Some(s) => export_png(s),
        None => Err(Error::ExportWithoutRender),
    }
}
