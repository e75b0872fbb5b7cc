//! PNG writing and atomic file replacement.

use crate::error::{FrameBakeError, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// PNG encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngOptions {
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self::standard()
    }
}

impl PngOptions {
    /// Default compression and adaptive filtering (standard assets).
    pub fn standard() -> Self {
        Self {
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }

    /// Stored deflate blocks and no filtering (UV assets).
    pub fn uncompressed() -> Self {
        Self {
            compression: CompressionType::Uncompressed,
            filter: FilterType::NoFilter,
        }
    }
}

/// Encode `img` as PNG into `w`.
pub fn write_png<W: Write>(img: &DynamicImage, w: W, opts: PngOptions) -> Result<()> {
    let encoder = PngEncoder::new_with_quality(w, opts.compression, opts.filter);
    img.write_with_encoder(encoder)?;
    Ok(())
}

/// Write `img` to `path` through a sibling temp file renamed over the target.
/// The target is either fully replaced or left untouched.
pub fn save_atomic(
    img: &DynamicImage,
    path: &Path,
    format: ImageFormat,
    opts: PngOptions,
) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".framebake-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        if format == ImageFormat::Png {
            write_png(img, &mut writer, opts)?;
        } else {
            img.write_to(&mut writer, format)?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| FrameBakeError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// True for scratch files created by [`save_atomic`] and other hidden entries.
pub(crate) fn is_scratch_name(name: &str) -> bool {
    name.starts_with('.')
}
