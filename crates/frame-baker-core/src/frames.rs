//! Frame sequences on disk: enumeration, decoding and bit-depth handling.

use crate::encode::is_scratch_name;
use crate::error::{FrameBakeError, Result};
use image::{ColorType, DynamicImage, ImageBuffer, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Alpha channel sample that can be normalized to `[0, 1]`.
pub trait AlphaSample: image::Primitive {
    fn normalized(self) -> f64;
}

impl AlphaSample for u8 {
    fn normalized(self) -> f64 {
        self as f64 / u8::MAX as f64
    }
}

impl AlphaSample for u16 {
    fn normalized(self) -> f64 {
        self as f64 / u16::MAX as f64
    }
}

/// Per-channel bit depth of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

/// RGBA pixels at the depth they were decoded with.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameBuffer {
    Rgba8(RgbaImage),
    Rgba16(Rgba16Image),
}

impl FrameBuffer {
    /// Fully transparent buffer of the given depth.
    pub fn blank(depth: BitDepth, width: u32, height: u32) -> Self {
        match depth {
            BitDepth::Eight => FrameBuffer::Rgba8(RgbaImage::new(width, height)),
            BitDepth::Sixteen => FrameBuffer::Rgba16(Rgba16Image::new(width, height)),
        }
    }

    /// Normalize any decoded image to RGBA, keeping 16-bit sources at 16 bits.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageRgba8(b) => FrameBuffer::Rgba8(b),
            DynamicImage::ImageRgba16(b) => FrameBuffer::Rgba16(b),
            other => {
                let wide = matches!(
                    other.color(),
                    ColorType::L16
                        | ColorType::La16
                        | ColorType::Rgb16
                        | ColorType::Rgb32F
                        | ColorType::Rgba32F
                );
                if wide {
                    FrameBuffer::Rgba16(other.to_rgba16())
                } else {
                    FrameBuffer::Rgba8(other.to_rgba8())
                }
            }
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            FrameBuffer::Rgba8(b) => b.dimensions(),
            FrameBuffer::Rgba16(b) => b.dimensions(),
        }
    }

    pub fn depth(&self) -> BitDepth {
        match self {
            FrameBuffer::Rgba8(_) => BitDepth::Eight,
            FrameBuffer::Rgba16(_) => BitDepth::Sixteen,
        }
    }

    /// Convert to `depth`, returning `self` unchanged when it already matches.
    pub fn into_depth(self, depth: BitDepth) -> Self {
        match (self, depth) {
            (FrameBuffer::Rgba8(b), BitDepth::Sixteen) => {
                FrameBuffer::Rgba16(DynamicImage::ImageRgba8(b).to_rgba16())
            }
            (FrameBuffer::Rgba16(b), BitDepth::Eight) => {
                FrameBuffer::Rgba8(DynamicImage::ImageRgba16(b).to_rgba8())
            }
            (same, _) => same,
        }
    }

    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            FrameBuffer::Rgba8(b) => DynamicImage::ImageRgba8(b),
            FrameBuffer::Rgba16(b) => DynamicImage::ImageRgba16(b),
        }
    }
}

impl From<RgbaImage> for FrameBuffer {
    fn from(b: RgbaImage) -> Self {
        FrameBuffer::Rgba8(b)
    }
}

impl From<Rgba16Image> for FrameBuffer {
    fn from(b: Rgba16Image) -> Self {
        FrameBuffer::Rgba16(b)
    }
}

/// A decoded frame and the file it came from.
#[derive(Debug, Clone)]
pub struct Frame {
    pub path: PathBuf,
    pub format: ImageFormat,
    pub buffer: FrameBuffer,
}

impl Frame {
    /// File name used as the frame key in metadata.
    pub fn key(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }
}

/// Regular files directly inside `dir`, sorted by file name.
/// Hidden entries (including interrupted atomic writes) are ignored.
pub fn list_frame_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut list = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if is_scratch_name(&name) {
            continue;
        }
        list.push(entry.into_path());
    }
    Ok(list)
}

/// Decode a single frame. Unreadable or unsupported files are `Decode` errors.
pub fn load_frame(path: &Path) -> Result<Frame> {
    let decode = |source: image::ImageError| FrameBakeError::Decode {
        path: path.to_path_buf(),
        source,
    };
    let reader = ImageReader::open(path)
        .map_err(|e| decode(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode(image::ImageError::IoError(e)))?;
    let format = reader
        .format()
        .or_else(|| ImageFormat::from_path(path).ok())
        .unwrap_or(ImageFormat::Png);
    let img = reader.decode().map_err(decode)?;
    debug!(path = %path.display(), w = img.width(), h = img.height(), color = ?img.color(), "decoded frame");
    Ok(Frame {
        path: path.to_path_buf(),
        format,
        buffer: FrameBuffer::from_dynamic(img),
    })
}

/// Decode every frame of `dir` in playback order. An empty directory is an error.
pub fn load_sequence(dir: &Path) -> Result<Vec<Frame>> {
    let paths = list_frame_paths(dir)?;
    if paths.is_empty() {
        return Err(FrameBakeError::EmptySequence(dir.to_path_buf()));
    }
    paths.iter().map(|p| load_frame(p)).collect()
}
