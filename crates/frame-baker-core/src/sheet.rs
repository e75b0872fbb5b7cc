//! Spritesheet packing: fixed-grid tiling of equally sized frames.

use crate::compositing::{flatten_uv, paste};
use crate::config::SheetConfig;
use crate::encode::{PngOptions, save_atomic};
use crate::error::{FrameBakeError, Result};
use crate::frames::{BitDepth, Frame, FrameBuffer, load_sequence};
use crate::model::{AssetClass, SheetCell, SheetLayout, SheetMeta};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Packed sheet pixels and their description.
#[derive(Debug, Clone)]
pub struct PackedSheet {
    pub image: FrameBuffer,
    pub meta: SheetMeta,
}

impl PackedSheet {
    /// Encoder settings implied by the asset class.
    pub fn png_options(&self) -> PngOptions {
        match self.meta.asset_class {
            AssetClass::Standard => PngOptions::standard(),
            AssetClass::Uv => PngOptions::uncompressed(),
        }
    }
}

/// Sheet size in pixels for `count` frames of `frame_w` x `frame_h`.
/// Sizes that overflow `u32` are rejected.
pub fn sheet_size(
    layout: SheetLayout,
    count: u32,
    frame_w: u32,
    frame_h: u32,
) -> Result<(u32, u32)> {
    if count == 1 {
        return Ok((frame_w, frame_h));
    }
    let (cols, rows) = layout.grid(count);
    match (frame_w.checked_mul(cols), frame_h.checked_mul(rows)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(too_large(count, frame_w, frame_h)),
    }
}

fn too_large(count: u32, frame_w: u32, frame_h: u32) -> FrameBakeError {
    FrameBakeError::InvalidConfig(format!(
        "{count} frames of {frame_w}x{frame_h} exceed the maximum sheet size"
    ))
}

/// Check that every frame matches the first frame's size; returns that size.
pub fn uniform_size(frames: &[Frame]) -> Result<(u32, u32)> {
    let first = frames
        .first()
        .ok_or_else(|| FrameBakeError::EmptySequence(PathBuf::new()))?;
    let expected = first.dimensions();
    for f in &frames[1..] {
        let actual = f.dimensions();
        if actual != expected {
            return Err(FrameBakeError::DimensionMismatch {
                path: f.path.clone(),
                expected,
                actual,
            });
        }
    }
    Ok(expected)
}

/// Tile `frames` (in playback order) into one image.
///
/// Notes:
/// - A single frame is returned unchanged.
/// - Mixed bit depths are promoted to the widest depth present.
/// - Empty cells (odd frame counts in stacked layout) stay fully transparent.
/// - UV sheets are flattened over the blue key color and carry no transparency.
pub fn pack_frames(frames: Vec<Frame>, cfg: &SheetConfig) -> Result<PackedSheet> {
    let (fw, fh) = uniform_size(&frames)?;
    let count = u32::try_from(frames.len()).map_err(|_| {
        FrameBakeError::InvalidConfig(format!("too many frames: {}", frames.len()))
    })?;
    let (width, height) = sheet_size(cfg.layout, count, fw, fh)?;

    let mut cells = Vec::with_capacity(frames.len());
    let image = if frames.len() == 1 {
        cells.push(SheetCell {
            key: frames[0].key(),
            index: 0,
            x: 0,
            y: 0,
            w: fw,
            h: fh,
        });
        frames.into_iter().next().map(|f| f.buffer).ok_or_else(|| {
            FrameBakeError::EmptySequence(PathBuf::new())
        })?
    } else {
        let depth = frames
            .iter()
            .map(|f| f.buffer.depth())
            .max()
            .unwrap_or(BitDepth::Eight);
        let mut canvas = FrameBuffer::blank(depth, width, height);
        for (index, f) in (0u32..).zip(frames.iter()) {
            let (x, y) = cfg
                .layout
                .cell_origin(index, fw, fh)
                .ok_or_else(|| too_large(count, fw, fh))?;
            paste(&mut canvas, &f.buffer, x, y);
            cells.push(SheetCell {
                key: f.key(),
                index,
                x,
                y,
                w: fw,
                h: fh,
            });
        }
        canvas
    };

    let image = match cfg.asset_class {
        AssetClass::Uv => flatten_uv(&image),
        AssetClass::Standard => image,
    };

    Ok(PackedSheet {
        image,
        meta: SheetMeta {
            app: "frame-baker".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            layout: cfg.layout,
            asset_class: cfg.asset_class,
            frame_width: fw,
            frame_height: fh,
            frame_count: count,
            width,
            height,
            cells,
        },
    })
}

/// Write a packed sheet as PNG using the settings of its asset class.
pub fn save_sheet(sheet: &PackedSheet, path: &Path) -> Result<()> {
    let img = sheet.image.clone().into_dynamic();
    save_atomic(&img, path, ImageFormat::Png, sheet.png_options())
}

#[instrument(skip_all, fields(dir = %dir.display(), out = %output.display()))]
/// Pack every frame in `dir` into a single sheet written to `output`.
/// Nothing is written when decoding or size validation fails.
pub fn pack_sequence(dir: &Path, cfg: &SheetConfig, output: &Path) -> Result<SheetMeta> {
    let frames = load_sequence(dir)?;
    debug!(frames = frames.len(), "loaded frames");
    let sheet = pack_frames(frames, cfg)?;
    save_sheet(&sheet, output)?;
    info!(
        frames = sheet.meta.frame_count,
        width = sheet.meta.width,
        height = sheet.meta.height,
        layout = ?sheet.meta.layout,
        asset = ?sheet.meta.asset_class,
        "spritesheet written"
    );
    Ok(sheet.meta)
}
