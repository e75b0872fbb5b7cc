//! Opaque bounding boxes and uniform, anchored crops of frame sequences.

use crate::compositing::crop_padded;
use crate::config::CropConfig;
use crate::encode::{PngOptions, save_atomic};
use crate::error::{FrameBakeError, Result};
use crate::frames::{AlphaSample, Frame, FrameBuffer, load_sequence};
use crate::model::{AnchorPolicy, BoundingBox, CropPlan, CropRect};
use image::{ImageBuffer, Pixel, Rgba};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Renderers leave faint alpha noise around content; anything at or below this
/// normalized alpha counts as empty.
pub const DEFAULT_ALPHA_THRESHOLD: f64 = 0.002;

/// True when `alpha` is strictly above `threshold` once normalized to `[0, 1]`.
#[inline]
pub fn is_visible<S: AlphaSample>(alpha: S, threshold: f64) -> bool {
    alpha.normalized() > threshold
}

/// Bounding box of visible pixels, or `None` when every pixel is transparent.
pub fn bounding_box_of<S>(img: &ImageBuffer<Rgba<S>, Vec<S>>, threshold: f64) -> Option<BoundingBox>
where
    S: AlphaSample,
    Rgba<S>: Pixel<Subpixel = S>,
{
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;
    for (x, y, px) in img.enumerate_pixels() {
        if !is_visible(px.0[3], threshold) {
            continue;
        }
        any = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    if !any {
        return None;
    }
    Some(BoundingBox::new(
        min_x,
        min_y,
        max_x - min_x + 1,
        max_y - min_y + 1,
    ))
}

pub fn frame_bounding_box(buf: &FrameBuffer, threshold: f64) -> Option<BoundingBox> {
    match buf {
        FrameBuffer::Rgba8(b) => bounding_box_of(b, threshold),
        FrameBuffer::Rgba16(b) => bounding_box_of(b, threshold),
    }
}

/// Crop `buf` to `rect`, padding out-of-bounds areas with transparent pixels.
pub fn crop_frame(buf: &FrameBuffer, rect: &CropRect) -> FrameBuffer {
    match buf {
        FrameBuffer::Rgba8(b) => FrameBuffer::Rgba8(crop_padded(b, rect)),
        FrameBuffer::Rgba16(b) => FrameBuffer::Rgba16(crop_padded(b, rect)),
    }
}

/// Placement decided for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCrop {
    pub path: PathBuf,
    pub bbox: BoundingBox,
    pub rect: CropRect,
}

/// Crop decisions for a whole sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCrop {
    pub plan: CropPlan,
    pub frames: Vec<FrameCrop>,
}

/// Compute every frame's bounding box, the shared target size and each
/// frame's crop rectangle. Does not touch the filesystem.
pub fn plan_crop(frames: &[Frame], cfg: &CropConfig) -> Result<SequenceCrop> {
    let mut boxes = Vec::with_capacity(frames.len());
    for f in frames {
        let bbox = frame_bounding_box(&f.buffer, cfg.alpha_threshold).ok_or_else(|| {
            FrameBakeError::DegenerateFrame {
                path: f.path.clone(),
            }
        })?;
        debug!(key = %f.key(), ?bbox, "bounding box");
        boxes.push(bbox);
    }

    let plan = CropPlan::from_boxes(&boxes, cfg.fixed_width, cfg.fixed_height);
    let policy: AnchorPolicy = cfg.anchor_policy();
    let frames = frames
        .iter()
        .zip(boxes)
        .map(|(f, bbox)| FrameCrop {
            path: f.path.clone(),
            bbox,
            rect: policy.crop_rect(&bbox, &plan),
        })
        .collect();
    Ok(SequenceCrop { plan, frames })
}

#[instrument(skip_all, fields(dir = %dir.display()))]
/// Crop every frame in `dir` to one shared size and overwrite the files.
///
/// Notes:
/// - All frames are decoded and measured before the first file is written, so
///   decode and degenerate-frame errors leave the directory untouched.
/// - Each file is replaced atomically; a failure part way through can still
///   leave earlier frames cropped.
/// - Returns the target `(width, height)`.
pub fn crop_sequence(dir: &Path, cfg: &CropConfig) -> Result<(u32, u32)> {
    cfg.validate()?;
    let frames = load_sequence(dir)?;
    let seq = plan_crop(&frames, cfg)?;

    for (frame, fc) in frames.iter().zip(&seq.frames) {
        let cropped = crop_frame(&frame.buffer, &fc.rect).into_dynamic();
        save_atomic(&cropped, &frame.path, frame.format, PngOptions::standard())?;
        debug!(key = %frame.key(), rect = ?fc.rect, "cropped frame");
    }

    let size = seq.plan.size();
    info!(
        frames = frames.len(),
        width = size.0,
        height = size.1,
        "sequence cropped"
    );
    Ok(size)
}
